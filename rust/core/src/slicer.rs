// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane/triangle intersection.
//!
//! Each triangle is sliced on its own; the fragments it produces are joined
//! into chains later by the [`crate::Consolidator`].
//!
//! ## At-plane policy
//!
//! A vertex is *at* the plane when `(z - t)^2 <= tolerance`. An edge yields
//! an interpolated point only when its endpoints are strictly on opposite
//! sides (neither is at the plane); every at-plane vertex is copied verbatim,
//! once. An edge lying in the plane therefore never reaches the
//! interpolation and no division by zero is possible.

use contour_lite_mesh::{Point3, Triangle};
use smallvec::SmallVec;

use crate::point::PlanePoint;

/// Points contributed by one triangle, in vertex-walk order.
pub type Fragment = SmallVec<[PlanePoint; 4]>;

/// Position of a vertex relative to the slicing plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Below,
    At,
    Above,
}

/// Classifies `z` against `threshold`.
#[inline]
pub fn classify(z: f64, threshold: f64, at_plane_tolerance: f64) -> Side {
    let d = z - threshold;
    if d * d <= at_plane_tolerance {
        Side::At
    } else if z < threshold {
        Side::Below
    } else {
        Side::Above
    }
}

/// Intersects one triangle with `z = threshold`.
///
/// Returns an empty fragment when the triangle lies strictly on one side, or
/// only touches the plane at a single vertex. Normally two points are
/// returned; a triangle lying in the plane returns its three vertices.
pub fn slice_triangle(triangle: &Triangle, threshold: f64, at_plane_tolerance: f64) -> Fragment {
    let vertices = &triangle.vertices;
    let sides = vertices.map(|v| classify(v.z, threshold, at_plane_tolerance));

    let below = sides.iter().filter(|&&s| s == Side::Below).count();
    let above = sides.iter().filter(|&&s| s == Side::Above).count();
    if below == 3 || above == 3 {
        return Fragment::new();
    }

    let mut points = Fragment::new();
    let mut prev = 2;
    for cur in 0..3 {
        match (sides[prev], sides[cur]) {
            (Side::Below, Side::Above) => {
                points.push(interpolate(&vertices[prev], &vertices[cur], threshold));
            }
            (Side::Above, Side::Below) => {
                points.push(interpolate(&vertices[cur], &vertices[prev], threshold));
            }
            _ => {}
        }
        if sides[cur] == Side::At {
            points.push(PlanePoint::new(vertices[cur].x, vertices[cur].y));
        }
        prev = cur;
    }

    points.dedup();
    if points.len() < 2 {
        points.clear();
    }
    points
}

/// Point where the edge `low -> high` crosses `z = threshold`.
///
/// Always interpolating from the lower vertex makes the two triangles that
/// share an edge produce bit-identical points.
#[inline]
fn interpolate(low: &Point3<f64>, high: &Point3<f64>, threshold: f64) -> PlanePoint {
    let t = (threshold - low.z) / (high.z - low.z);
    PlanePoint::new(low.x + t * (high.x - low.x), low.y + t * (high.y - low.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tri(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Triangle {
        Triangle::new(
            Point3::new(a[0], a[1], a[2]),
            Point3::new(b[0], b[1], b[2]),
            Point3::new(c[0], c[1], c[2]),
        )
    }

    #[test]
    fn classify_with_tolerance() {
        assert_eq!(classify(1.0, 1.0, 0.0), Side::At);
        assert_eq!(classify(1.001, 1.0, 0.0), Side::Above);
        assert_eq!(classify(0.999, 1.0, 0.0), Side::Below);
        assert_eq!(classify(1.001, 1.0, 1e-5), Side::At);
    }

    #[test]
    fn one_side_yields_nothing() {
        let t = tri([0.0, 0.0, 1.0], [1.0, 0.0, 2.0], [0.0, 1.0, 3.0]);
        assert!(slice_triangle(&t, 0.5, 0.0).is_empty());
        assert!(slice_triangle(&t, 3.5, 0.0).is_empty());
    }

    #[test]
    fn crossing_yields_two_interpolated_points() {
        let t = tri([0.0, 0.0, 0.0], [4.0, 0.0, 4.0], [0.0, 4.0, 4.0]);
        let pts = slice_triangle(&t, 1.0, 0.0);
        assert_eq!(pts.len(), 2);
        // edge c -> a first, then a -> b
        assert_relative_eq!(pts[0].x, 0.0);
        assert_relative_eq!(pts[0].y, 1.0);
        assert_relative_eq!(pts[1].x, 1.0);
        assert_relative_eq!(pts[1].y, 0.0);
    }

    #[test]
    fn shared_edge_points_are_identical() {
        let a = [0.3, 0.7, -1.3];
        let b = [2.9, 1.1, 2.7];
        let first = tri(a, b, [0.0, 5.0, 2.0]);
        let second = tri(b, a, [3.0, -4.0, 2.0]);
        let p = slice_triangle(&first, 0.1, 0.0);
        let q = slice_triangle(&second, 0.1, 0.0);
        assert!(p.iter().any(|pt| q.contains(pt)));
    }

    #[test]
    fn vertex_on_plane_is_copied() {
        let t = tri([0.0, 0.0, 1.0], [2.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
        let pts = slice_triangle(&t, 1.0, 0.0);
        assert_eq!(pts.len(), 2);
        assert!(pts.contains(&PlanePoint::new(0.0, 0.0)));
        assert!(pts.contains(&PlanePoint::new(2.0, 1.0)));
    }

    #[test]
    fn single_touching_vertex_is_dropped() {
        let t = tri([0.0, 0.0, 1.0], [2.0, 0.0, 2.0], [2.0, 2.0, 3.0]);
        assert!(slice_triangle(&t, 1.0, 0.0).is_empty());
    }

    #[test]
    fn edge_in_plane_does_not_divide_by_zero() {
        let t = tri([0.0, 0.0, 1.0], [3.0, 0.0, 1.0], [1.0, 2.0, 5.0]);
        let pts = slice_triangle(&t, 1.0, 0.0);
        assert_eq!(pts.len(), 2);
        assert!(pts.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        assert!(pts.contains(&PlanePoint::new(0.0, 0.0)));
        assert!(pts.contains(&PlanePoint::new(3.0, 0.0)));
    }

    #[test]
    fn flat_triangle_in_plane_returns_vertices() {
        let t = tri([0.0, 0.0, 2.0], [3.0, 0.0, 2.0], [1.0, 2.0, 2.0]);
        assert_eq!(slice_triangle(&t, 2.0, 0.0).len(), 3);
    }
}
