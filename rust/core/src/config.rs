// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Slicing policy knobs.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tolerances and filters applied while slicing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    /// A vertex is "at" the plane when `(z - t)^2 <= at_plane_tolerance`.
    /// Zero means exact float equality.
    pub at_plane_tolerance: f64,
    /// Decimal digits kept when matching chain endpoints.
    pub key_precision: u32,
    /// Contours whose bounding-box area is below this are discarded.
    pub min_area: f64,
    /// Interior turns at or below this angle (degrees) count as straight.
    pub colinear_angle_deg: f64,
    /// Slice thresholds on the rayon pool.
    pub parallel: bool,
}

impl SliceConfig {
    /// Defaults overlaid with `CONTOUR_*` environment variables.
    ///
    /// Unset or unparsable variables fall back to the default value.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            at_plane_tolerance: env_or("CONTOUR_AT_PLANE_TOLERANCE", defaults.at_plane_tolerance),
            key_precision: env_or("CONTOUR_KEY_PRECISION", defaults.key_precision),
            min_area: env_or("CONTOUR_MIN_AREA", defaults.min_area),
            colinear_angle_deg: env_or("CONTOUR_COLINEAR_ANGLE_DEG", defaults.colinear_angle_deg),
            parallel: env_or("CONTOUR_PARALLEL", defaults.parallel),
        }
    }

    /// Multiplier applied before truncating endpoint coordinates.
    pub(crate) fn key_scale(&self) -> f64 {
        10f64.powi(self.key_precision.min(15) as i32)
    }
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            at_plane_tolerance: 0.0,
            key_precision: 5,
            min_area: 15.0,
            colinear_angle_deg: 1.0,
            parallel: true,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
