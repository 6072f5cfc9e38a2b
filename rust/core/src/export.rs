// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Path-shaped views of a [`LevelMap`] for renderers and file writers.

use serde::{Deserialize, Serialize};

use crate::contour::Contour;
use crate::keys::ContourId;
use crate::level::LevelMap;
use crate::point::PlanePoint;

/// Shaping applied to every exported ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOptions {
    /// Added to every x coordinate.
    pub x_offset: f64,
    /// Keep every `stride`-th point (values below 1 act as 1).
    pub stride: usize,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            x_offset: 0.0,
            stride: 1,
        }
    }
}

/// All contours of one threshold as subpaths of a single path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelPath {
    pub threshold: f64,
    pub rings: Vec<Vec<PlanePoint>>,
}

/// One contour as its own path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContourPath {
    pub threshold: f64,
    pub id: ContourId,
    pub points: Vec<PlanePoint>,
}

/// One merged path per threshold, ascending.
pub fn level_paths(map: &LevelMap, options: &PathOptions) -> Vec<LevelPath> {
    map.levels()
        .map(|(threshold, keys)| LevelPath {
            threshold,
            rings: keys
                .iter()
                .filter_map(|&k| map.contour(k))
                .map(|c| ring(c, options))
                .collect(),
        })
        .collect()
}

/// One path per contour, grouped by ascending threshold.
pub fn contour_paths(map: &LevelMap, options: &PathOptions) -> Vec<ContourPath> {
    map.levels()
        .flat_map(|(threshold, keys)| {
            keys.iter().filter_map(move |&k| {
                map.contour(k).map(|c| ContourPath {
                    threshold,
                    id: c.id(),
                    points: ring(c, options),
                })
            })
        })
        .collect()
}

/// Decimated, shifted copy of the contour, closed at its first point.
fn ring(contour: &Contour, options: &PathOptions) -> Vec<PlanePoint> {
    let stride = options.stride.max(1);
    let shift = |p: &PlanePoint| PlanePoint::new(p.x + options.x_offset, p.y);

    let mut points: Vec<PlanePoint> = contour.points().iter().step_by(stride).map(shift).collect();
    if let Some(&first) = points.first() {
        if points.last() != Some(&first) || points.len() == 1 {
            points.push(first);
        }
    }
    points
}
