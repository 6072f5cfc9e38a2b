// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON report written by the CLI.

use contour_lite_core::{
    contour_paths, level_paths, ContourPath, LevelMap, LevelPath, PatchReport, PathOptions,
    PlanePoint,
};
use contour_lite_mesh::Bounds;
use serde::Serialize;

use crate::config::OutputFormat;

#[derive(Debug, Serialize)]
pub struct Report {
    pub bounds: BoundsReport,
    pub thresholds: Vec<f64>,
    pub contour_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patches: Option<PatchReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nearest: Vec<NearestReport>,
    #[serde(flatten)]
    pub body: Body,
}

#[derive(Debug, Serialize)]
pub struct BoundsReport {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl From<&Bounds> for BoundsReport {
    fn from(b: &Bounds) -> Self {
        Self {
            min: [b.min.x, b.min.y, b.min.z],
            max: [b.max.x, b.max.y, b.max.z],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearestReport {
    pub query: PlanePoint,
    pub found: Option<PlanePoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Levels(Vec<LevelPath>),
    Contours(Vec<ContourPath>),
    Strings(Vec<LevelStrings>),
}

/// Point strings for one threshold.
#[derive(Debug, Serialize)]
pub struct LevelStrings {
    pub threshold: f64,
    pub contours: Vec<String>,
}

pub fn body(map: &LevelMap, format: OutputFormat, options: &PathOptions) -> Body {
    match format {
        OutputFormat::Levels => Body::Levels(level_paths(map, options)),
        OutputFormat::Contours => Body::Contours(contour_paths(map, options)),
        OutputFormat::Strings => Body::Strings(
            map.levels()
                .map(|(threshold, keys)| LevelStrings {
                    threshold,
                    contours: keys
                        .iter()
                        .filter_map(|&k| map.contour(k))
                        .map(|c| c.to_point_string())
                        .collect(),
                })
                .collect(),
        ),
    }
}
