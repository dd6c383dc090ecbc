//! # Layer Slicer
//!
//! The numerical core of the pipeline: for every horizontal plane
//! z = k·Δ, intersects each facet of each mesh with that plane and emits
//! an unordered bag of 2D line segments per mesh per layer.
//!
//! Facets are tracked in two working sets per mesh, `intersect` (facets
//! whose z-extent currently straddles the slicing plane) and `above`
//! (facets entirely above it), migrated forward as z advances rather than
//! rescanned from scratch each layer. Per the design notes, migration uses
//! index-and-tombstone (`retain`/`partition`) rather than removing
//! elements from a `Vec` while iterating it.

use plan_types::{tolerance::canonicalize, tolerance::on_plane, Facet, Mesh, Point2D, Segment2D, Vertex};
use tracing::warn;

use crate::error::SlicerError;

const EPS: f64 = plan_types::tolerance::EPSILON;

/// One slicing plane's output: the ordered-by-mesh bags of segments
/// produced by intersecting every mesh with `z`.
#[derive(Debug, Clone)]
pub struct LayerSegments {
    pub index: usize,
    pub z: f64,
    pub per_mesh: Vec<Vec<Segment2D>>,
}

/// Slices every mesh at every z in {0, Δ, 2Δ, …} up to the largest multiple
/// of `quality` not exceeding `z_max`.
pub fn run(meshes: &[Mesh], quality: f64, z_max: f64) -> Vec<LayerSegments> {
    let planes = z_values(quality, z_max);
    let mut per_mesh_layers: Vec<Vec<Vec<Segment2D>>> = meshes
        .iter()
        .map(|mesh| slice_mesh(mesh, &planes))
        .collect();

    planes
        .iter()
        .enumerate()
        .map(|(index, &z)| LayerSegments {
            index,
            z,
            per_mesh: per_mesh_layers.iter_mut().map(|layers| std::mem::take(&mut layers[index])).collect(),
        })
        .collect()
}

fn z_values(quality: f64, z_max: f64) -> Vec<f64> {
    if quality <= 0.0 || z_max < 0.0 {
        return vec![0.0];
    }
    let steps = (z_max / quality).floor() as i64;
    (0..=steps).map(|k| k as f64 * quality).collect()
}

/// Slices one mesh at every plane in `planes`, returning one segment bag
/// per plane.
fn slice_mesh(mesh: &Mesh, planes: &[f64]) -> Vec<Vec<Segment2D>> {
    let facets: Vec<Facet> = mesh.facets().collect();
    let spans: Vec<(f64, f64)> = facets.iter().map(Facet::z_span).collect();

    let mut valid: Vec<usize> = Vec::with_capacity(facets.len());
    for (i, f) in facets.iter().enumerate() {
        if f.is_finite() {
            valid.push(i);
        } else {
            let err = SlicerError::BadFacet { mesh: mesh.name.clone(), index: i };
            warn!("{err}");
        }
    }

    let mut intersect: Vec<usize> = Vec::new();
    let mut above: Vec<usize> = Vec::new();
    let mut logged_below = false;

    let mut layers = Vec::with_capacity(planes.len());

    for (layer_idx, &z) in planes.iter().enumerate() {
        if layer_idx == 0 {
            for &idx in &valid {
                let (zmin, zmax) = spans[idx];
                if zmax < z - EPS {
                    if !logged_below {
                        warn!(mesh = %mesh.name, "mesh has facets entirely below z=0, ignoring");
                        logged_below = true;
                    }
                    continue;
                }
                if zmin <= z + EPS {
                    intersect.push(idx);
                } else {
                    above.push(idx);
                }
            }
        } else {
            intersect.retain(|&idx| spans[idx].1 >= z - EPS);

            let mut still_above = Vec::with_capacity(above.len());
            for idx in above.drain(..) {
                if spans[idx].0 <= z + EPS {
                    intersect.push(idx);
                } else {
                    still_above.push(idx);
                }
            }
            above = still_above;
        }

        let mut segments = Vec::new();
        for &idx in &intersect {
            if let Some(seg) = classify_facet(&facets[idx], z) {
                if !seg.is_degenerate() {
                    segments.push(seg);
                }
            }
        }
        layers.push(segments);
    }

    layers
}

/// Classifies one facet against plane `z`, per the §4.2 intersection table.
fn classify_facet(facet: &Facet, z: f64) -> Option<Segment2D> {
    let v = &facet.vertices;
    let on = [on_plane(v[0].z, z), on_plane(v[1].z, z), on_plane(v[2].z, z)];
    let on_count = on.iter().filter(|&&b| b).count();

    match on_count {
        3 => None,
        2 => {
            let idxs: Vec<usize> = (0..3).filter(|&i| on[i]).collect();
            Some(Segment2D::new(to_point(v[idxs[0]]), to_point(v[idxs[1]])))
        }
        1 => {
            let on_i = (0..3).find(|&i| on[i]).unwrap();
            let others: Vec<usize> = (0..3).filter(|&i| i != on_i).collect();
            let (a, b) = (v[others[0]], v[others[1]]);
            let same_side = (a.z - z).signum() == (b.z - z).signum();
            if same_side {
                None
            } else {
                Some(Segment2D::new(to_point(v[on_i]), edge_crossing(a, b, z)))
            }
        }
        0 => {
            let signs: [f64; 3] = [(v[0].z - z).signum(), (v[1].z - z).signum(), (v[2].z - z).signum()];
            if signs[0] == signs[1] && signs[1] == signs[2] {
                None
            } else {
                let lone = if signs[0] != signs[1] && signs[0] != signs[2] {
                    0
                } else if signs[1] != signs[0] && signs[1] != signs[2] {
                    1
                } else {
                    2
                };
                let others: Vec<usize> = (0..3).filter(|&i| i != lone).collect();
                let p0 = edge_crossing(v[lone], v[others[0]], z);
                let p1 = edge_crossing(v[lone], v[others[1]], z);
                Some(Segment2D::new(p0, p1))
            }
        }
        _ => unreachable!("at most 3 vertices can be on-plane"),
    }
}

fn to_point(v: Vertex) -> Point2D {
    Point2D::new(canonicalize(v.x), canonicalize(v.y))
}

/// Intercept-theorem crossing point of edge (a, b) with plane z, rounded to
/// 8 decimal digits so two facets sharing an edge produce coincident
/// endpoints.
fn edge_crossing(a: Vertex, b: Vertex, z: f64) -> Point2D {
    let t = (z - a.z) / (b.z - a.z);
    let x = a.x + (b.x - a.x) * t;
    let y = a.y + (b.y - a.y) * t;
    Point2D::new(canonicalize(x), canonicalize(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_types::Vertex;

    fn unit_cube() -> Mesh {
        // Two triangles per face, 12 total, size 2x2x2.
        let s = 2.0;
        let corners = [
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(s, 0.0, 0.0),
            Vertex::new(s, s, 0.0),
            Vertex::new(0.0, s, 0.0),
            Vertex::new(0.0, 0.0, s),
            Vertex::new(s, 0.0, s),
            Vertex::new(s, s, s),
            Vertex::new(0.0, s, s),
        ];
        let quads = [
            [0, 1, 2, 3], // bottom
            [4, 5, 6, 7], // top
            [0, 1, 5, 4], // front
            [1, 2, 6, 5], // right
            [2, 3, 7, 6], // back
            [3, 0, 4, 7], // left
        ];
        let mut facets = Vec::new();
        for q in quads {
            facets.push(Facet::new(corners[q[0]], corners[q[1]], corners[q[2]]));
            facets.push(Facet::new(corners[q[0]], corners[q[2]], corners[q[3]]));
        }
        Mesh::new("cube", facets)
    }

    #[test]
    fn slices_unit_cube_at_three_planes() {
        let mesh = unit_cube();
        let layers = run(&[mesh], 1.0, 2.0);
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0].z, 0.0);
        assert_eq!(layers[1].z, 1.0);
        assert_eq!(layers[2].z, 2.0);

        // Each of the 4 side faces is triangulated with one diagonal that
        // itself crosses z=1, so the mid-layer raw bag has 2 collinear
        // segments per side face (8 total) before reconstruction collapses
        // them into the expected 4-sided square.
        let mid = &layers[1].per_mesh[0];
        assert_eq!(mid.len(), 8);
    }

    #[test]
    fn coplanar_facet_emits_nothing() {
        let facet = Facet::new(
            Vertex::new(0.0, 0.0, 0.2),
            Vertex::new(1.0, 0.0, 0.2),
            Vertex::new(0.0, 1.0, 0.2),
        );
        assert!(classify_facet(&facet, 0.2).is_none());
    }

    #[test]
    fn single_vertex_touch_emits_nothing() {
        // Apex on the plane, base strictly above it: a touch, not a cut.
        let facet = Facet::new(
            Vertex::new(0.0, 0.0, 1.0),
            Vertex::new(1.0, 0.0, 2.0),
            Vertex::new(0.0, 1.0, 2.0),
        );
        assert!(classify_facet(&facet, 1.0).is_none());
    }

    #[test]
    fn single_vertex_cut_emits_segment() {
        let facet = Facet::new(
            Vertex::new(0.0, 0.0, 1.0),
            Vertex::new(1.0, 0.0, 2.0),
            Vertex::new(0.0, 1.0, 0.0),
        );
        let seg = classify_facet(&facet, 1.0).expect("should cut");
        assert!(!seg.is_degenerate());
    }
}
