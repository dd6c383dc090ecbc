//! # Slicer Core Library
//!
//! This library implements the numerical core of a fused-filament slicer:
//! the three tightly coupled subsystems that turn a set of triangulated
//! meshes into a layered toolpath plan.
//!
//! ## Architecture
//!
//! The crate is organized into the stages of the pipeline plus the ambient
//! concerns around it:
//!
//! - **arrange**: 2D bin-packing of model footprints onto the printer plate
//! - **slice**: facet/plane intersection producing unordered segment bags
//! - **reconstruct**: stitching segment bags into ordered polylines
//! - **infill**: zig-zag scanline fill of reconstructed contours
//! - **pipeline**: the driver sequencing the four stages above
//! - **io**: mesh loading (STL) and the optional G-code text writer
//! - **config**: thin wrapper over `config_types::Configuration`
//!
//! ## Slicing Workflow
//!
//! 1. Load one or more triangle meshes (`io::stl`)
//! 2. Load a validated `Configuration` (`config`)
//! 3. Arrange the meshes on the plate (`arrange::run`)
//! 4. Slice every layer (`slice::run`)
//! 5. Reconstruct ordered contours per layer (`reconstruct::run`)
//! 6. Fill each contour with scanline infill (`infill::run`)
//! 7. Hand the resulting `Plan` to an external G-code writer (`gcode`, optional)
//!
//! `pipeline::run` drives steps 3-6 as a single pure function of
//! `(&Configuration, Vec<Mesh>) -> Result<Plan, SlicerError>`.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use slicer::pipeline;
//! use config_types::Configuration;
//! use plan_types::Mesh;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Configuration::default();
//! let meshes: Vec<Mesh> = vec![];
//! let plan = pipeline::run(&config, meshes, None)?;
//! println!("sliced {} layers", plan.layer_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Tolerance
//!
//! All geometric comparisons in this crate go through
//! [`plan_types::tolerance`], re-exported here as [`tolerance`], rather than
//! ad hoc float comparison.

pub mod arrange;
pub mod config;
pub mod error;
pub mod gcode;
pub mod infill;
pub mod io;
pub mod pipeline;
pub mod reconstruct;
pub mod slice;
pub mod utils;

pub use error::SlicerError;
pub use plan_types::tolerance;

// Re-exports of the shapes this crate's public functions trade in, so a
// caller pulling in only `slicer` doesn't also need a direct dependency on
// `plan-types` for the common path.
pub use plan_types::{Facet, GridSegment, LayerPlan, Mesh, Plan, Point2D, Polyline, Region, Segment2D, Vertex};

/// Current slicer library version.
pub const SLICER_VERSION: &str = env!("CARGO_PKG_VERSION");
