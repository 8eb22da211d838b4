//! Planar polygon helpers used to turn a traced board outline into four
//! ordered corners.
//!
//! All points are continuous pixel coordinates (`f32`), pixel `(i, j)` covering
//! `[i, i + 1) x [j, j + 1)`.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Doubled triangle area below this fraction of the squared longest side
/// counts as collinear.
const COLLINEAR_REL_EPS: f32 = 1e-4;
/// Quadrilaterals smaller than this (in px^2) are rejected.
const MIN_QUAD_AREA: f32 = 1.0;
/// Points closer than this are treated as the same point.
const SAME_POINT_EPS: f32 = 1e-4;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("no contour found")]
    NoContour,
    #[error("degenerate corner set: {0}")]
    CornerDegeneracy(&'static str),
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(p: Point2<f32>, q: Point2<f32>) -> f32 {
    (p - q).norm()
}

/// Unsigned enclosed area of a closed polygon (shoelace formula).
pub fn polygon_area(poly: &[Point2<f32>]) -> f32 {
    if poly.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0f64;
    for (i, p) in poly.iter().enumerate() {
        let q = poly[(i + 1) % poly.len()];
        acc += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    (acc.abs() * 0.5) as f32
}

/// Contour with the largest enclosed area. Ties keep the first one seen.
pub fn largest_contour_area<C>(contours: &[C]) -> Result<&C, GeometryError>
where
    C: AsRef<[Point2<f32>]>,
{
    let mut best: Option<(&C, f32)> = None;
    for c in contours {
        let area = polygon_area(c.as_ref());
        match best {
            Some((_, a)) if area <= a => {}
            _ => best = Some((c, area)),
        }
    }
    best.map(|(c, _)| c).ok_or(GeometryError::NoContour)
}

/// Polyline length; `closed` adds the segment from the last point back to the first.
pub fn arc_length(poly: &[Point2<f32>], closed: bool) -> f32 {
    if poly.len() < 2 {
        return 0.0;
    }
    let mut len: f32 = poly.windows(2).map(|w| distance(w[0], w[1])).sum();
    if closed {
        len += distance(poly[poly.len() - 1], poly[0]);
    }
    len
}

/// Simplify a closed polygon with the Douglas-Peucker algorithm.
///
/// The curve is split at two mutually distant vertices and each half is
/// simplified independently, so the result does not depend on where the
/// tracer happened to start the contour.
pub fn approximate_polygon(poly: &[Point2<f32>], epsilon: f32) -> Vec<Point2<f32>> {
    let n = poly.len();
    if n <= 3 {
        return poly.to_vec();
    }

    let far_a = farthest_from(poly, poly[0]);
    let far_b = farthest_from(poly, poly[far_a]);
    if far_a == far_b {
        return vec![poly[far_a]];
    }

    // walk far_a -> far_b and far_b -> far_a, wrapping around
    let arc = |from: usize, to: usize| -> Vec<Point2<f32>> {
        let len = (to + n - from) % n + 1;
        (0..len).map(|k| poly[(from + k) % n]).collect()
    };

    let first = simplify_open(&arc(far_a, far_b), epsilon);
    let second = simplify_open(&arc(far_b, far_a), epsilon);

    let mut out = first;
    out.pop();
    out.extend_from_slice(&second[..second.len() - 1]);
    out
}

fn farthest_from(poly: &[Point2<f32>], p: Point2<f32>) -> usize {
    let mut best = 0usize;
    let mut best_d = -1.0f32;
    for (i, q) in poly.iter().enumerate() {
        let d = (*q - p).norm_squared();
        if d > best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

fn simplify_open(points: &[Point2<f32>], epsilon: f32) -> Vec<Point2<f32>> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0usize, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }

        let mut max_dist = 0.0f32;
        let mut max_index = start;
        for (i, p) in points.iter().enumerate().take(end).skip(start + 1) {
            let d = point_to_line_distance(*p, points[start], points[end]);
            if d > max_dist {
                max_dist = d;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((start, max_index));
            stack.push((max_index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn point_to_line_distance(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let ab = b - a;
    let len = ab.norm();
    if len <= f32::EPSILON {
        return distance(p, a);
    }
    cross(ab, p - a).abs() / len
}

#[inline]
fn cross(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Four board corners ordered top-left, top-right, bottom-right, bottom-left.
///
/// Construction validates the quadrilateral: no three corners collinear and
/// a non-vanishing enclosed area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[Point2<f32>; 4]", into = "[Point2<f32>; 4]")]
pub struct CornerSet {
    pts: [Point2<f32>; 4],
}

impl CornerSet {
    /// Validate four points already given in TL, TR, BR, BL order.
    pub fn new(pts: [Point2<f32>; 4]) -> Result<Self, GeometryError> {
        if pts.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(GeometryError::CornerDegeneracy("non-finite corner"));
        }

        let max_len2 = (0..4)
            .flat_map(|i| (i + 1..4).map(move |j| (i, j)))
            .map(|(i, j)| (pts[i] - pts[j]).norm_squared())
            .fold(0.0f32, f32::max);
        if max_len2 <= SAME_POINT_EPS * SAME_POINT_EPS {
            return Err(GeometryError::CornerDegeneracy("corners coincide"));
        }

        for skip in 0..4 {
            let tri: Vec<Point2<f32>> = (0..4).filter(|&k| k != skip).map(|k| pts[k]).collect();
            let area2 = cross(tri[1] - tri[0], tri[2] - tri[0]).abs();
            if area2 <= COLLINEAR_REL_EPS * max_len2 {
                return Err(GeometryError::CornerDegeneracy("three corners are collinear"));
            }
        }

        if polygon_area(&pts) < MIN_QUAD_AREA {
            return Err(GeometryError::CornerDegeneracy("quadrilateral area is near zero"));
        }

        Ok(Self { pts })
    }

    #[inline]
    pub fn top_left(&self) -> Point2<f32> {
        self.pts[0]
    }

    #[inline]
    pub fn top_right(&self) -> Point2<f32> {
        self.pts[1]
    }

    #[inline]
    pub fn bottom_right(&self) -> Point2<f32> {
        self.pts[2]
    }

    #[inline]
    pub fn bottom_left(&self) -> Point2<f32> {
        self.pts[3]
    }

    #[inline]
    pub fn points(&self) -> [Point2<f32>; 4] {
        self.pts
    }

    pub fn area(&self) -> f32 {
        polygon_area(&self.pts)
    }

    /// Shift every corner by `offset`, e.g. to move region-local corners into
    /// full-image coordinates.
    pub fn translated(&self, offset: Vector2<f32>) -> Self {
        Self {
            pts: self.pts.map(|p| p + offset),
        }
    }
}

impl TryFrom<[Point2<f32>; 4]> for CornerSet {
    type Error = GeometryError;

    fn try_from(pts: [Point2<f32>; 4]) -> Result<Self, Self::Error> {
        Self::new(pts)
    }
}

impl From<CornerSet> for [Point2<f32>; 4] {
    fn from(c: CornerSet) -> Self {
        c.pts
    }
}

/// Pick the outer corners of a simplified board outline.
///
/// Top-left has the smallest `x + y`, bottom-right the largest; top-right has
/// the smallest `y - x`, bottom-left the largest. Ties are resolved on the
/// coordinates themselves so the result never depends on input order.
pub fn order_corners(points: &[Point2<f32>]) -> Result<CornerSet, GeometryError> {
    let mut distinct: Vec<Point2<f32>> = Vec::with_capacity(points.len());
    for p in points {
        if !distinct.iter().any(|q| distance(*p, *q) <= SAME_POINT_EPS) {
            distinct.push(*p);
        }
    }
    if distinct.len() < 4 {
        return Err(GeometryError::CornerDegeneracy("fewer than 4 distinct points"));
    }

    let sum = |p: &Point2<f32>| p.x + p.y;
    let diff = |p: &Point2<f32>| p.y - p.x;

    let tl = extreme_by(&distinct, sum, Ordering::Less);
    let br = extreme_by(&distinct, sum, Ordering::Greater);
    let tr = extreme_by(&distinct, diff, Ordering::Less);
    let bl = extreme_by(&distinct, diff, Ordering::Greater);

    let picked = [tl, tr, br, bl];
    for i in 0..4 {
        for j in i + 1..4 {
            if distance(picked[i], picked[j]) <= SAME_POINT_EPS {
                return Err(GeometryError::CornerDegeneracy(
                    "one point selected for two corners",
                ));
            }
        }
    }

    CornerSet::new(picked)
}

fn extreme_by<F>(points: &[Point2<f32>], key: F, want: Ordering) -> Point2<f32>
where
    F: Fn(&Point2<f32>) -> f32,
{
    let cmp = |a: &Point2<f32>, b: &Point2<f32>| {
        key(a)
            .total_cmp(&key(b))
            .then(a.x.total_cmp(&b.x))
            .then(a.y.total_cmp(&b.y))
    };
    let mut best = points[0];
    for p in &points[1..] {
        if cmp(p, &best) == want {
            best = *p;
        }
    }
    best
}
