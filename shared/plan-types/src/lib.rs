//! # Slicer Plan Type Definitions
//!
//! This library provides the core geometry and plan type definitions shared
//! between the slicing core and anything that consumes its output (a G-code
//! writer, a preview tool, a test harness). The type system mirrors the
//! slicer's dataflow directly:
//!
//! - **Mesh input**: `Vertex`, `Facet`, `Mesh`
//! - **Slicing**: `Point2D`, `Segment2D`
//! - **Reconstruction**: `Polyline`
//! - **Infill**: `GridSegment`
//! - **Output**: `Region`, `LayerPlan`, `Plan`
//!
//! ## Tolerance
//!
//! All geometric equality in this crate (and in the `slicer` crate built on
//! top of it) goes through [`tolerance::approx_eq`] and friends rather than
//! ad hoc float comparison. `tolerance::EPSILON` is the single absolute
//! tolerance (1e-6 mm) named throughout the slicer specification.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod tolerance {
    //! Named predicates for ε-tolerant float comparison.
    //!
    //! Every geometric equality test in this workspace is expressed in terms
    //! of these functions so the tolerance policy lives in one place.

    /// Absolute tolerance used by all geometric comparisons, in mm.
    pub const EPSILON: f64 = 1e-6;

    /// True if `a` and `b` are within [`EPSILON`] of each other.
    pub fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    /// True if `a` is within [`EPSILON`] of zero.
    pub fn approx_zero(a: f64) -> bool {
        a.abs() < EPSILON
    }

    /// True if `z` lies on the plane `target` within [`EPSILON`].
    pub fn on_plane(z: f64, target: f64) -> bool {
        approx_eq(z, target)
    }

    /// Rounds a coordinate to 8 decimal digits, canonicalizing crossing
    /// points so that two facets sharing an edge produce coincident
    /// endpoints (§4.2 of the slicer specification).
    pub fn canonicalize(v: f64) -> f64 {
        (v * 1e8).round() / 1e8
    }
}

use tolerance::approx_eq;

// ---------------------------------------------------------------------
// Mesh input types
// ---------------------------------------------------------------------

/// A point in model space, millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// True if all three components are finite (not NaN or infinite).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Componentwise ε-tolerant equality.
    pub fn approx_eq(&self, other: &Vertex) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y) && approx_eq(self.z, other.z)
    }

    fn translated(&self, t: [f64; 3]) -> Vertex {
        Vertex::new(self.x + t[0], self.y + t[1], self.z + t[2])
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}

/// One triangle of a surface mesh: an ordered triple of vertices.
///
/// Facet normal direction is not required by the slicing core (§3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub vertices: [Vertex; 3],
}

impl Facet {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(Vertex::is_finite)
    }

    /// Minimum and maximum Z across the three vertices.
    pub fn z_span(&self) -> (f64, f64) {
        let zs = [
            self.vertices[0].z,
            self.vertices[1].z,
            self.vertices[2].z,
        ];
        (
            zs.iter().cloned().fold(f64::INFINITY, f64::min),
            zs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        )
    }

    fn translated(&self, t: [f64; 3]) -> Facet {
        Facet::new(
            self.vertices[0].translated(t),
            self.vertices[1].translated(t),
            self.vertices[2].translated(t),
        )
    }
}

/// A named triangle mesh with a lazily-applied translation.
///
/// The spec's invariant is "bbox is the componentwise min/max over all facet
/// vertices, recomputed after every translation" — per the design notes
/// (§9), this is implemented by caching the untranslated bbox once at
/// construction and applying the (cheap) translation offset at read time,
/// rather than rescanning every facet on each `translate` call.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    facets: Vec<Facet>,
    translation: [f64; 3],
    raw_bbox_min: [f64; 3],
    raw_bbox_max: [f64; 3],
}

impl Mesh {
    /// Builds a mesh from facets already in model space (no translation).
    pub fn new(name: impl Into<String>, facets: Vec<Facet>) -> Self {
        let (min, max) = Self::compute_bbox(&facets);
        Self {
            name: name.into(),
            facets,
            translation: [0.0, 0.0, 0.0],
            raw_bbox_min: min,
            raw_bbox_max: max,
        }
    }

    /// Skips facets with a non-finite vertex (§7 `BadFacet`: logged and
    /// skipped by `slice::slice_mesh`, never a run-invalidating error) so a
    /// single NaN/∞ coordinate can't poison the bbox that `arrange` and
    /// `pipeline::run`'s `z_max` computation both read.
    fn compute_bbox(facets: &[Facet]) -> ([f64; 3], [f64; 3]) {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        let mut any = false;

        for facet in facets {
            if !facet.is_finite() {
                continue;
            }
            any = true;
            for v in &facet.vertices {
                let p = [v.x, v.y, v.z];
                for i in 0..3 {
                    min[i] = min[i].min(p[i]);
                    max[i] = max[i].max(p[i]);
                }
            }
        }

        if !any {
            min = [0.0; 3];
            max = [0.0; 3];
        }

        (min, max)
    }

    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    /// Returns facet `i` with the current translation applied.
    pub fn facet(&self, i: usize) -> Facet {
        self.facets[i].translated(self.translation)
    }

    /// Iterates over all facets with the current translation applied.
    pub fn facets(&self) -> impl Iterator<Item = Facet> + '_ {
        self.facets.iter().map(move |f| f.translated(self.translation))
    }

    /// Accumulates a translation; does not rescan facets.
    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.translation[0] += dx;
        self.translation[1] += dy;
        self.translation[2] += dz;
    }

    pub fn bbox_min(&self) -> [f64; 3] {
        [
            self.raw_bbox_min[0] + self.translation[0],
            self.raw_bbox_min[1] + self.translation[1],
            self.raw_bbox_min[2] + self.translation[2],
        ]
    }

    pub fn bbox_max(&self) -> [f64; 3] {
        [
            self.raw_bbox_max[0] + self.translation[0],
            self.raw_bbox_max[1] + self.translation[1],
            self.raw_bbox_max[2] + self.translation[2],
        ]
    }

    /// Footprint width/depth on the XY plane.
    pub fn footprint(&self) -> (f64, f64) {
        let min = self.bbox_min();
        let max = self.bbox_max();
        (max[0] - min[0], max[1] - min[1])
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

// ---------------------------------------------------------------------
// Slicing output types
// ---------------------------------------------------------------------

/// A point in the XY plane of one slicing plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn approx_eq(&self, other: &Point2D) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y)
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An ordered pair of 2D points produced by slicing one facet against one
/// plane. Degenerate segments (`p0 ≈ p1`) are dropped by the slicer before
/// they ever reach downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment2D {
    pub p0: Point2D,
    pub p1: Point2D,
}

impl Segment2D {
    pub fn new(p0: Point2D, p1: Point2D) -> Self {
        Self { p0, p1 }
    }

    /// True if the two endpoints coincide within ε.
    pub fn is_degenerate(&self) -> bool {
        self.p0.approx_eq(&self.p1)
    }
}

/// An ordered sequence of 2D points with at least two entries.
///
/// Closed if `first ≈ last`. Invariant: no three consecutive points are
/// collinear within ε (enforced by the reconstructor, not by this type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point2D>,
}

impl Polyline {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn is_closed(&self) -> bool {
        if self.points.len() < 2 {
            return false;
        }
        self.points[0].approx_eq(self.points.last().unwrap())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounding box of this polyline's points.
    pub fn bbox(&self) -> Option<(Point2D, Point2D)> {
        let mut iter = self.points.iter();
        let first = *iter.next()?;
        let mut min = first;
        let mut max = first;

        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Some((min, max))
    }
}

/// An axis-aligned infill segment to be traversed at infill feed rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSegment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl GridSegment {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn length(&self) -> f64 {
        let dx = self.x1 - self.x0;
        let dy = self.y1 - self.y0;
        (dx * dx + dy * dy).sqrt()
    }
}

// ---------------------------------------------------------------------
// Plan output types
// ---------------------------------------------------------------------

/// One model's contribution to one layer: its perimeters and infill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Region {
    pub perimeters: Vec<Polyline>,
    pub infill: Vec<GridSegment>,
}

/// One horizontal slice of the plan: every model-region at this Z height.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerPlan {
    /// 0-based layer index, used downstream to alternate infill axis/step.
    pub index: usize,
    /// Z height of this layer, mm.
    pub z: f64,
    pub regions: Vec<Region>,
}

/// The complete output of the slicing pipeline: a sequence of layers in
/// monotonic Z order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    pub layers: Vec<LayerPlan>,
}

impl Plan {
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

// ---------------------------------------------------------------------
// G-code command types (for the optional text writer)
// ---------------------------------------------------------------------

/// A single G-code instruction, as emitted by the optional writer built on
/// top of a [`Plan`]. This is a thin, separately-testable convenience layer
/// — the core pipeline's contract ends at `Plan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// G0: non-extruding travel move.
    Travel { x: f64, y: f64, z: Option<f64>, feed: f64 },
    /// G1: extruding move, `e` is the *cumulative* extrusion length so far.
    Print { x: f64, y: f64, e: f64, feed: f64 },
    /// G92 E0: reset the extrusion accumulator.
    ResetExtrusion,
    /// A `;`-prefixed comment, ignored by the firmware.
    Comment(String),
}

impl Command {
    pub fn to_gcode_text(&self) -> String {
        match self {
            Command::Travel { x, y, z, feed } => match z {
                Some(z) => format!("G0 F{:.0} X{:.5} Y{:.5} Z{:.5}", feed, x, y, z),
                None => format!("G0 F{:.0} X{:.5} Y{:.5}", feed, x, y),
            },
            Command::Print { x, y, e, feed } => {
                format!("G1 F{:.0} X{:.5} Y{:.5} E{:.5}", feed, x, y, e)
            }
            Command::ResetExtrusion => "G92 E0".to_string(),
            Command::Comment(text) => format!("; {}", text),
        }
    }
}

/// Builder for common command patterns, matching the style of the
/// slicer's own `CommandBuilder`.
pub struct CommandBuilder;

impl CommandBuilder {
    pub fn travel(x: f64, y: f64, feed: f64) -> Command {
        Command::Travel { x, y, z: None, feed }
    }

    pub fn travel_z(x: f64, y: f64, z: f64, feed: f64) -> Command {
        Command::Travel { x, y, z: Some(z), feed }
    }

    pub fn print(x: f64, y: f64, e: f64, feed: f64) -> Command {
        Command::Print { x, y, e, feed }
    }

    pub fn comment(text: impl Into<String>) -> Command {
        Command::Comment(text.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_bbox_updates_lazily_after_translate() {
        let facets = vec![Facet::new(
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(10.0, 0.0, 0.0),
            Vertex::new(0.0, 10.0, 5.0),
        )];
        let mut mesh = Mesh::new("cube", facets);
        assert_eq!(mesh.bbox_min(), [0.0, 0.0, 0.0]);
        assert_eq!(mesh.bbox_max(), [10.0, 10.0, 5.0]);

        mesh.translate(5.0, 2.0, -1.0);
        assert_eq!(mesh.bbox_min(), [5.0, 2.0, -1.0]);
        assert_eq!(mesh.bbox_max(), [15.0, 12.0, 4.0]);
    }

    #[test]
    fn bbox_ignores_non_finite_facets() {
        let facets = vec![
            Facet::new(
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(10.0, 0.0, 0.0),
                Vertex::new(0.0, 10.0, 5.0),
            ),
            Facet::new(
                Vertex::new(f64::NAN, 0.0, 0.0),
                Vertex::new(f64::INFINITY, 0.0, 0.0),
                Vertex::new(0.0, 0.0, 0.0),
            ),
        ];
        let mesh = Mesh::new("mixed", facets);
        assert_eq!(mesh.bbox_min(), [0.0, 0.0, 0.0]);
        assert_eq!(mesh.bbox_max(), [10.0, 10.0, 5.0]);
    }

    #[test]
    fn bbox_falls_back_to_origin_when_every_facet_is_non_finite() {
        let facets = vec![Facet::new(
            Vertex::new(f64::NAN, 0.0, 0.0),
            Vertex::new(0.0, f64::INFINITY, 0.0),
            Vertex::new(0.0, 0.0, f64::NEG_INFINITY),
        )];
        let mesh = Mesh::new("garbage", facets);
        assert_eq!(mesh.bbox_min(), [0.0, 0.0, 0.0]);
        assert_eq!(mesh.bbox_max(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn polyline_is_closed_detects_loop() {
        let pl = Polyline::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 0.0),
        ]);
        assert!(pl.is_closed());
    }

    #[test]
    fn segment_degenerate_within_epsilon() {
        let s = Segment2D::new(Point2D::new(1.0, 1.0), Point2D::new(1.0000001, 1.0));
        assert!(s.is_degenerate());
    }

    #[test]
    fn canonicalize_rounds_to_eight_digits() {
        let v = 1.0 / 3.0;
        assert_eq!(tolerance::canonicalize(v), 0.33333333);
    }
}
