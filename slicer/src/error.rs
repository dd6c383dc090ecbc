//! Error types raised by the slicing core.
//!
//! This mirrors the teacher's split between a typed library error
//! (`SlicerError`, used by every stage of the pipeline) and the opaque
//! `anyhow::Error` the CLI binary deals in at its own boundary.

/// Error kinds the core can raise. Most geometric degeneracy is absorbed
/// silently (see `slice` and `reconstruct` module docs); these variants are
/// reserved for the conditions that invalidate a whole run or a whole
/// region.
#[derive(Debug, thiserror::Error)]
pub enum SlicerError {
    /// A mesh does not fit on the plate at arrangement time. Terminal for
    /// the run.
    #[error("mesh '{mesh}' does not fit on the plate")]
    PlateOverflow { mesh: String },

    /// The intercept-count invariant of the infill scanline pass was
    /// violated for a scan line. Terminal for that region.
    #[error("degenerate layer: scan line y={y} in contour {contour} has an odd intercept count")]
    DegenerateLayer { y: f64, contour: usize },

    /// A facet carries a non-finite coordinate. `slice::slice_mesh` logs
    /// this variant's `Display` text as a warning and skips the facet; it
    /// is never returned as an `Err`, but stays a typed variant so callers
    /// that want to treat it as fatal can still match on it.
    #[error("facet {index} in mesh '{mesh}' has a non-finite coordinate")]
    BadFacet { mesh: String, index: usize },

    /// A mesh has zero z-extent after arrangement. `pipeline::run` logs
    /// this variant's `Display` text as a warning and drops the mesh
    /// before slicing; never returned as an `Err`.
    #[error("mesh '{mesh}' has zero z-extent and contributes no layers")]
    EmptyModel { mesh: String },

    #[error("I/O error reading '{0}': {1}")]
    Io(String, String),

    #[error(transparent)]
    Config(#[from] config_types::ConfigError),
}
