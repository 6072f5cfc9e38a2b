// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coarse grid index for "nearest contour vertex" queries.
//!
//! Points are bucketed by `(floor(x), floor(y))`. A query looks only at the
//! four unit cells nearest the query point, so it is a fixed-radius
//! approximation: points more than one cell away are never returned.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::point::PlanePoint;

/// A unit-cell spatial hash over boundary points.
#[derive(Debug, Default)]
pub struct PointIndex {
    buckets: FxHashMap<(i64, i64), FxHashSet<PlanePoint>>,
    len: usize,
}

impl PointIndex {
    /// Creates a new, empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index over `points`; duplicates are stored once.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a PlanePoint>) -> Self {
        let mut index = Self::new();
        for p in points {
            index.insert(*p);
        }
        index
    }

    /// Adds a point; returns `false` if it was already present.
    pub fn insert(&mut self, point: PlanePoint) -> bool {
        let added = self
            .buckets
            .entry((cell(point.x), cell(point.y)))
            .or_default()
            .insert(point);
        if added {
            self.len += 1;
        }
        added
    }

    /// Number of distinct points indexed.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Closest indexed point among the four cells nearest `query`.
    ///
    /// The cells are the one containing `query` plus its neighbours toward
    /// the nearer integer line on each axis.
    pub fn query_nearest(&self, query: &PlanePoint) -> Option<PlanePoint> {
        let (cx, cy) = (cell(query.x), cell(query.y));
        let nx = neighbour(query.x, cx);
        let ny = neighbour(query.y, cy);

        [(cx, cy), (cx, ny), (nx, cy), (nx, ny)]
            .iter()
            .filter_map(|c| self.buckets.get(c))
            .flatten()
            .map(|p| (p.distance(query), *p))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p)
    }
}

#[inline]
fn cell(v: f64) -> i64 {
    v.floor() as i64
}

/// Adjacent cell on the side of the nearer cell boundary.
#[inline]
fn neighbour(v: f64, c: i64) -> i64 {
    if v - (c as f64) < 0.5 {
        c - 1
    } else {
        c + 1
    }
}
