//! # Path Reconstructor
//!
//! Converts an unordered bag of [`Segment2D`] into a list of [`Polyline`]s
//! by endpoint matching, collapsing runs of collinear points as it goes.
//!
//! Grounded directly in `original_source/optimizer.py`'s
//! `points_from_segments`: the same front/back extend-or-collapse matching,
//! the same collinearity test via normalized dot product. The module
//! departs from the Python original in one place, per the design notes:
//! a degenerate (near-zero-length) vector is treated as *not* collinear
//! here, where the original returned `True` for it — the spec's version
//! is authoritative.
//!
//! The naive endpoint scan is O(n²) per slice; this implementation instead
//! keys every endpoint by a quantized integer coordinate (the same
//! rounding `slice` already applies when it creates segments) into a hash
//! map from endpoint to the pending segments that touch it, making every
//! match O(1) amortized.

use std::collections::HashMap;

use plan_types::{tolerance::EPSILON, Point2D, Polyline, Segment2D};
use tracing::warn;

type Key = (i64, i64);

fn quantize(p: Point2D) -> Key {
    ((p.x * 1e8).round() as i64, (p.y * 1e8).round() as i64)
}

/// Reconstructs ordered polylines from an unordered bag of segments.
pub fn run(segments: Vec<Segment2D>) -> Vec<Polyline> {
    let mut pool: Vec<Option<Segment2D>> = segments.into_iter().map(Some).collect();
    let mut index: HashMap<Key, Vec<usize>> = HashMap::new();
    for (i, seg) in pool.iter().enumerate() {
        let seg = seg.as_ref().unwrap();
        index.entry(quantize(seg.p0)).or_default().push(i);
        index.entry(quantize(seg.p1)).or_default().push(i);
    }

    let mut polylines = Vec::new();

    loop {
        let seed_idx = match pool.iter().position(Option::is_some) {
            Some(i) => i,
            None => break,
        };
        let seed = pool[seed_idx].take().unwrap();
        let mut path: Vec<Point2D> = vec![seed.p0, seed.p1];

        loop {
            let front_key = quantize(path[0]);
            if let Some(idx) = find_active(&index, &pool, front_key) {
                let seg = pool[idx].take().unwrap();
                let new_point = if seg.p0.approx_eq(&path[0]) { seg.p1 } else { seg.p0 };
                extend_front(&mut path, new_point);
                continue;
            }

            let back_key = quantize(*path.last().unwrap());
            if let Some(idx) = find_active(&index, &pool, back_key) {
                let seg = pool[idx].take().unwrap();
                let last = *path.last().unwrap();
                let new_point = if seg.p0.approx_eq(&last) { seg.p1 } else { seg.p0 };
                extend_back(&mut path, new_point);
                continue;
            }

            break;
        }

        if path.len() < 2 || (path.len() == 2 && path[0].approx_eq(&path[1])) {
            warn!(points = path.len(), "discarding polyline with fewer than two distinct points");
            continue;
        }

        polylines.push(Polyline::new(path));
    }

    polylines
}

fn find_active(index: &HashMap<Key, Vec<usize>>, pool: &[Option<Segment2D>], key: Key) -> Option<usize> {
    index.get(&key)?.iter().copied().find(|&i| pool[i].is_some())
}

fn extend_front(path: &mut Vec<Point2D>, new_point: Point2D) {
    if path.len() >= 2 && collinear(path[0], path[1], new_point) {
        path[0] = new_point;
    } else {
        path.insert(0, new_point);
    }
}

fn extend_back(path: &mut Vec<Point2D>, new_point: Point2D) {
    let n = path.len();
    if n >= 2 && collinear(path[n - 2], path[n - 1], new_point) {
        path[n - 1] = new_point;
    } else {
        path.push(new_point);
    }
}

/// True if `p`, `q`, `r` are collinear within ε: both `|q-p|` and `|r-p|`
/// exceed ε, and the unit vectors `(q-p)` and `(r-p)` are parallel
/// (anti-parallel counts too, via the absolute value of the dot product).
fn collinear(p: Point2D, q: Point2D, r: Point2D) -> bool {
    let u = (q.x - p.x, q.y - p.y);
    let v = (r.x - p.x, r.y - p.y);
    let ulen = (u.0 * u.0 + u.1 * u.1).sqrt();
    let vlen = (v.0 * v.0 + v.1 * v.1).sqrt();

    if ulen <= EPSILON || vlen <= EPSILON {
        return false;
    }

    let u1 = (u.0 / ulen, u.1 / ulen);
    let v1 = (v.0 / vlen, v.1 / vlen);
    let dot = u1.0 * v1.0 + u1.1 * v1.1;

    (dot.abs() - 1.0).abs() < EPSILON
}
