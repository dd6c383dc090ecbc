//! # Infill Generator
//!
//! For each reconstructed region, emits axis-aligned zig-zag scan segments
//! filling the interior of its perimeter polylines.
//!
//! Grounded in `original_source/fill.py`'s `XFillLine`/`YFillLine`/
//! `GridPattern`: the sweep-and-intercept structure is the same, but the
//! clip clauses follow spec.md's symmetric clamp rule rather than the
//! Python original's asymmetric one (the design notes call that an open
//! question the spec resolves in the symmetric rule's favor).

use plan_types::{GridSegment, Point2D, Polyline};

use crate::error::SlicerError;

const EPS: f64 = plan_types::tolerance::EPSILON;

/// Emits zig-zag scan segments filling `polylines`' combined footprint.
///
/// `region_index` is carried only for error reporting. `layer_index` and
/// `total_layers` pick the scan step (solid skin vs. sparse interior) and
/// the scan axis (alternates with layer parity).
pub fn run(
    polylines: &[Polyline],
    region_index: usize,
    layer_index: usize,
    total_layers: usize,
    nozzle_diameter: f64,
) -> Result<Vec<GridSegment>, SlicerError> {
    let Some((min, max)) = combined_bbox(polylines) else {
        return Ok(Vec::new());
    };

    let step = scan_step(layer_index, total_layers, nozzle_diameter);

    if layer_index % 2 == 0 {
        scan_x(polylines, min, max, step, region_index)
    } else {
        scan_y(polylines, min, max, step, region_index)
    }
}

fn scan_step(layer_index: usize, total_layers: usize, nozzle_diameter: f64) -> f64 {
    let is_first_three = layer_index < 3;
    let is_last_three = total_layers >= 3 && layer_index + 3 >= total_layers;
    if is_first_three || is_last_three {
        nozzle_diameter
    } else {
        1.0
    }
}

fn combined_bbox(polylines: &[Polyline]) -> Option<(Point2D, Point2D)> {
    let mut iter = polylines.iter().filter_map(Polyline::bbox);
    let (mut min, mut max) = iter.next()?;
    for (lo, hi) in iter {
        min.x = min.x.min(lo.x);
        min.y = min.y.min(lo.y);
        max.x = max.x.max(hi.x);
        max.y = max.y.max(hi.y);
    }
    Some((min, max))
}

/// Linear interpolation (intercept theorem): given edge (p, q) and a target
/// value `t` on the axis the edge straddles, returns the corresponding
/// value on the other axis.
fn intercept(a0: f64, a1: f64, b0: f64, b1: f64, t: f64) -> f64 {
    a0 + (b0 - a0) * (t - a1) / (b1 - a1)
}

fn scan_x(
    polylines: &[Polyline],
    min: Point2D,
    max: Point2D,
    step: f64,
    region_index: usize,
) -> Result<Vec<GridSegment>, SlicerError> {
    let mut segments = Vec::new();
    let mut y = min.y + step;
    let mut zig = true;

    while y <= max.y + EPS {
        let mut xs = Vec::new();
        for poly in polylines {
            for w in poly.points.windows(2) {
                let (p, q) = (w[0], w[1]);
                let (lo, hi) = (p.y.min(q.y), p.y.max(q.y));
                if y > lo && y <= hi {
                    xs.push(intercept(p.x, p.y, q.x, q.y, y));
                }
            }
        }

        if xs.len() % 2 != 0 {
            return Err(SlicerError::DegenerateLayer { y, contour: region_index });
        }

        if zig {
            xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        } else {
            xs.sort_by(|a, b| b.partial_cmp(a).unwrap());
        }

        for pair in xs.chunks(2) {
            let (mut x0, mut x1) = (pair[0], pair[1]);
            if zig {
                if x0 >= max.x {
                    continue;
                }
                if x1 > min.x {
                    if x0 < min.x {
                        x0 = min.x;
                    }
                    if x1 > max.x {
                        x1 = max.x;
                    }
                    segments.push(GridSegment::new(x0, y, x1, y));
                }
            } else {
                if x0 < min.x {
                    continue;
                }
                if x1 < max.x {
                    if x0 > max.x {
                        x0 = max.x;
                    }
                    if x1 < min.x {
                        x1 = min.x;
                    }
                    segments.push(GridSegment::new(x0, y, x1, y));
                }
            }
        }

        zig = !zig;
        y += step;
    }

    Ok(segments)
}

fn scan_y(
    polylines: &[Polyline],
    min: Point2D,
    max: Point2D,
    step: f64,
    region_index: usize,
) -> Result<Vec<GridSegment>, SlicerError> {
    let mut segments = Vec::new();
    let mut x = min.x + step;
    let mut zig = true;

    while x <= max.x + EPS {
        let mut ys = Vec::new();
        for poly in polylines {
            for w in poly.points.windows(2) {
                let (p, q) = (w[0], w[1]);
                let (lo, hi) = (p.x.min(q.x), p.x.max(q.x));
                if x > lo && x <= hi {
                    ys.push(intercept(p.y, p.x, q.y, q.x, x));
                }
            }
        }

        if ys.len() % 2 != 0 {
            return Err(SlicerError::DegenerateLayer { y: x, contour: region_index });
        }

        if zig {
            ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
        } else {
            ys.sort_by(|a, b| b.partial_cmp(a).unwrap());
        }

        for pair in ys.chunks(2) {
            let (mut y0, mut y1) = (pair[0], pair[1]);
            if zig {
                if y0 >= max.y {
                    continue;
                }
                if y1 > min.y {
                    if y0 < min.y {
                        y0 = min.y;
                    }
                    if y1 > max.y {
                        y1 = max.y;
                    }
                    segments.push(GridSegment::new(x, y0, x, y1));
                }
            } else {
                if y0 < min.y {
                    continue;
                }
                if y1 < max.y {
                    if y0 > max.y {
                        y0 = max.y;
                    }
                    if y1 < min.y {
                        y1 = min.y;
                    }
                    segments.push(GridSegment::new(x, y0, x, y1));
                }
            }
        }

        zig = !zig;
        x += step;
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Polyline {
        Polyline::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(size, 0.0),
            Point2D::new(size, size),
            Point2D::new(0.0, size),
            Point2D::new(0.0, 0.0),
        ])
    }

    #[test]
    fn skin_layer_uses_nozzle_step() {
        assert_eq!(scan_step(0, 50, 0.4), 0.4);
        assert_eq!(scan_step(49, 50, 0.4), 0.4);
        assert_eq!(scan_step(25, 50, 0.4), 1.0);
    }

    #[test]
    fn square_contour_fills_with_even_intercepts() {
        let polylines = vec![square(20.0)];
        let segments = run(&polylines, 0, 0, 50, 0.4).unwrap();
        assert!(!segments.is_empty());
        for seg in &segments {
            assert!(seg.x0 >= 0.0 - 1e-6 && seg.x1 <= 20.0 + 1e-6);
        }
    }

    #[test]
    fn alternates_axis_with_layer_parity() {
        let polylines = vec![square(20.0)];
        let even = run(&polylines, 0, 0, 50, 0.4).unwrap();
        let odd = run(&polylines, 0, 1, 50, 0.4).unwrap();
        // Even (X-axis scan) segments are horizontal; odd (Y-axis) vertical.
        assert!(even.iter().all(|s| (s.y0 - s.y1).abs() < 1e-9));
        assert!(odd.iter().all(|s| (s.x0 - s.x1).abs() < 1e-9));
    }
}
