// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary points in the slicing plane and their text form.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A 2D point where the mesh crosses a slicing plane.
///
/// Equality is exact coordinate equality; contour editing addresses points
/// by value, the same values handed out by [`crate::Contour::points`] or
/// [`crate::PointIndex::query_nearest`]. Coordinates are assumed finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanePoint {
    pub x: f64,
    pub y: f64,
}

impl PlanePoint {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(&self, other: &PlanePoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Consolidation key: both coordinates scaled by `scale` and truncated.
    #[inline]
    pub(crate) fn endpoint_key(&self, scale: f64) -> EndpointKey {
        EndpointKey((self.x * scale).trunc() as i64, (self.y * scale).trunc() as i64)
    }
}

impl Eq for PlanePoint {}

impl Hash for PlanePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // -0.0 == 0.0, so both must hash alike
        fn bits(v: f64) -> u64 {
            if v == 0.0 {
                0
            } else {
                v.to_bits()
            }
        }
        bits(self.x).hash(state);
        bits(self.y).hash(state);
    }
}

impl std::fmt::Display for PlanePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Rounded endpoint identity used to link chain fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EndpointKey(i64, i64);

/// Renders points as `"x1,y1 x2,y2 ... xn,yn"`.
pub fn to_point_string(points: &[PlanePoint]) -> String {
    points
        .iter()
        .map(PlanePoint::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses the `"x1,y1 x2,y2 ..."` form produced by [`to_point_string`].
///
/// Any run of whitespace separates points. An empty string yields no points.
pub fn parse_point_string(text: &str) -> Result<Vec<PlanePoint>> {
    text.split_whitespace()
        .map(|token| {
            let (x, y) = token
                .split_once(',')
                .ok_or_else(|| Error::PointString(token.to_string()))?;
            let x = x
                .parse::<f64>()
                .map_err(|_| Error::PointString(token.to_string()))?;
            let y = y
                .parse::<f64>()
                .map_err(|_| Error::PointString(token.to_string()))?;
            Ok(PlanePoint::new(x, y))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rustc_hash::FxHashSet;

    #[test]
    fn distance() {
        assert_relative_eq!(
            PlanePoint::new(1.0, 1.0).distance(&PlanePoint::new(4.0, 5.0)),
            5.0
        );
    }

    #[test]
    fn endpoint_key_truncates() {
        let scale = 1e5;
        let a = PlanePoint::new(1.000_001_2, -3.5);
        let b = PlanePoint::new(1.000_009_9, -3.500_004);
        assert_eq!(a.endpoint_key(scale), b.endpoint_key(scale));
        let c = PlanePoint::new(1.000_011, -3.5);
        assert_ne!(a.endpoint_key(scale), c.endpoint_key(scale));
    }

    #[test]
    fn signed_zero_hashes_alike() {
        let mut set = FxHashSet::default();
        set.insert(PlanePoint::new(0.0, 1.0));
        assert!(set.contains(&PlanePoint::new(-0.0, 1.0)));
    }

    #[test]
    fn point_string_round_trip() {
        let pts = vec![
            PlanePoint::new(1.5, 2.0),
            PlanePoint::new(-3.25, 0.125),
            PlanePoint::new(1.5, 2.0),
        ];
        let text = to_point_string(&pts);
        assert_eq!(text, "1.5,2 -3.25,0.125 1.5,2");
        assert_eq!(parse_point_string(&text).unwrap(), pts);
    }

    #[test]
    fn point_string_rejects_bad_tokens() {
        assert!(matches!(
            parse_point_string("1,2 3;4"),
            Err(Error::PointString(t)) if t == "3;4"
        ));
        assert!(parse_point_string("1,x").is_err());
        assert!(parse_point_string("   ").unwrap().is_empty());
    }
}
