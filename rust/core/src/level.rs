// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Level Map: threshold-keyed contour sets.
//!
//! Slicing runs in phases:
//!
//! 1. Per threshold (parallel on native): query the mesh index, slice every
//!    candidate triangle and feed the fragments to a fresh [`Consolidator`].
//! 2. Sequential: build canonical [`Contour`]s from the chains, store them in
//!    the arena and replace the threshold's key list.
//! 3. Sequential: drop contours below the configured bounding-box area.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use contour_lite_mesh::{Bounds, MeshIndex};
use tracing::{debug, info, trace, warn};

use crate::arena::ContourArena;
use crate::config::SliceConfig;
use crate::consolidate::{Chain, Consolidator};
use crate::contour::Contour;
use crate::error::{Error, Result};
use crate::keys::ContourKey;
use crate::lookup::PointIndex;
use crate::point::PlanePoint;
use crate::slicer::slice_triangle;

/// A threshold usable as an ordered map key.
///
/// Ordering is `f64::total_cmp`, so `-0.0 < 0.0` and NaN sorts last.
#[derive(Debug, Clone, Copy)]
pub struct Threshold(pub f64);

impl PartialEq for Threshold {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Threshold {}

impl PartialOrd for Threshold {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Threshold {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Whether [`LevelMap::slice_range`] includes `max` itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangeEnd {
    #[default]
    Exclusive,
    Inclusive,
}

/// Contour sets for a series of thresholds, ascending.
#[derive(Debug, Default)]
pub struct LevelMap {
    config: SliceConfig,
    arena: ContourArena,
    levels: BTreeMap<Threshold, Vec<ContourKey>>,
    lookup: Option<PointIndex>,
}

impl LevelMap {
    pub fn new(config: SliceConfig) -> Self {
        Self {
            config,
            arena: ContourArena::new(),
            levels: BTreeMap::new(),
            lookup: None,
        }
    }

    pub fn config(&self) -> &SliceConfig {
        &self.config
    }

    /// Read access to every stored contour.
    pub fn arena(&self) -> &ContourArena {
        &self.arena
    }

    // --- Slicing ---

    /// Slices each threshold and replaces its stored contour set.
    ///
    /// Thresholds not listed are left as they are. Returns the number of
    /// contours kept across the listed thresholds.
    pub fn slice_at<I>(&mut self, index: &I, thresholds: &[f64]) -> usize
    where
        I: MeshIndex + Sync + ?Sized,
    {
        let thresholds: Vec<f64> = thresholds
            .iter()
            .copied()
            .filter(|t| {
                let ok = t.is_finite();
                if !ok {
                    warn!(threshold = t, "skipping non-finite threshold");
                }
                ok
            })
            .collect();

        // PHASE 1: per-threshold chains, each worker with its own consolidator
        let config = &self.config;

        #[cfg(not(target_arch = "wasm32"))]
        let sliced: Vec<(f64, Vec<Chain>)> = if config.parallel {
            use rayon::prelude::*;
            thresholds
                .par_iter()
                .map(|&t| (t, slice_chains(index, t, config)))
                .collect()
        } else {
            thresholds
                .iter()
                .map(|&t| (t, slice_chains(index, t, config)))
                .collect()
        };

        #[cfg(target_arch = "wasm32")]
        let sliced: Vec<(f64, Vec<Chain>)> = thresholds
            .iter()
            .map(|&t| (t, slice_chains(index, t, config)))
            .collect();

        // PHASE 2: contours into the arena
        for (threshold, chains) in sliced {
            self.drop_threshold_contours(threshold);

            let chain_count = chains.len();
            let mut keys = Vec::with_capacity(chain_count);
            for chain in chains {
                let len = chain.points.len();
                match Contour::with_colinear_angle(chain.points, self.config.colinear_angle_deg) {
                    Ok(contour) => keys.push(self.arena.insert(contour)),
                    Err(err) => trace!(threshold, points = len, closed = chain.closed, %err, "skipping chain"),
                }
            }
            debug!(threshold, chains = chain_count, contours = keys.len(), "built contours");
            self.levels.insert(Threshold(threshold), keys);
        }

        // PHASE 3: tiny filter over the re-sliced thresholds only
        let min_area = self.config.min_area;
        let mut removed = 0;
        for &t in &thresholds {
            removed += self.remove_tiny_at(t, min_area);
        }

        let kept: usize = thresholds
            .iter()
            .filter_map(|t| self.levels.get(&Threshold(*t)))
            .map(Vec::len)
            .sum();
        info!(
            thresholds = thresholds.len(),
            contours = kept,
            tiny_removed = removed,
            "slicing complete"
        );
        kept
    }

    /// Slices the arithmetic sequence `min, min + step, ...` up to `max`.
    ///
    /// Thresholds are computed as `min + i * step`. `end` decides whether a
    /// threshold equal to `max` is included.
    pub fn slice_range<I>(
        &mut self,
        index: &I,
        min: f64,
        max: f64,
        step: f64,
        end: RangeEnd,
    ) -> Result<usize>
    where
        I: MeshIndex + Sync + ?Sized,
    {
        let thresholds = range_thresholds(min, max, step, end)?;
        Ok(self.slice_at(index, &thresholds))
    }

    // --- Queries ---

    /// Stored thresholds, ascending.
    pub fn thresholds(&self) -> impl Iterator<Item = f64> + '_ {
        self.levels.keys().map(|t| t.0)
    }

    /// `(threshold, keys)` pairs, ascending by threshold.
    pub fn levels(&self) -> impl Iterator<Item = (f64, &[ContourKey])> + '_ {
        self.levels.iter().map(|(t, keys)| (t.0, keys.as_slice()))
    }

    pub fn contour(&self, key: ContourKey) -> Option<&Contour> {
        self.arena.get(key)
    }

    /// Contours stored for `threshold`.
    pub fn contours_at(
        &self,
        threshold: f64,
    ) -> Result<impl Iterator<Item = (ContourKey, &Contour)> + '_> {
        let keys = self.keys_at(threshold)?;
        Ok(keys
            .iter()
            .filter_map(move |&k| self.arena.get(k).map(|c| (k, c))))
    }

    /// Total number of contours across all thresholds.
    pub fn contour_count(&self) -> usize {
        self.levels.values().map(Vec::len).sum()
    }

    /// The contour at `threshold` passing through `point`, if any.
    ///
    /// Fails only when the threshold itself is not stored.
    pub fn find_contour(&self, point: PlanePoint, threshold: f64) -> Result<Option<ContourKey>> {
        let keys = self.keys_at(threshold)?;
        Ok(keys
            .iter()
            .copied()
            .find(|&k| self.arena.get(k).is_some_and(|c| c.contains(&point))))
    }

    /// Like [`find_contour`](Self::find_contour) but a missing contour is an
    /// error.
    pub fn require_contour(&self, point: PlanePoint, threshold: f64) -> Result<ContourKey> {
        self.find_contour(point, threshold)?
            .ok_or(Error::NoContourAt { threshold, point })
    }

    /// Threshold whose set holds `key`.
    pub fn threshold_of(&self, key: ContourKey) -> Option<f64> {
        self.levels
            .iter()
            .find(|(_, keys)| keys.contains(&key))
            .map(|(t, _)| t.0)
    }

    // --- Spatial lookup ---

    /// Rebuilds the nearest-point index from every stored contour.
    ///
    /// The index is a snapshot: edits made afterwards are not visible until
    /// this is called again. Returns the number of distinct points indexed.
    pub fn build_spatial_index(&mut self) -> usize {
        let index = PointIndex::from_points(
            self.levels
                .values()
                .flatten()
                .filter_map(|&k| self.arena.get(k))
                .flat_map(|c| c.points().iter()),
        );
        let len = index.len();
        debug!(points = len, "built spatial index");
        self.lookup = Some(index);
        len
    }

    /// Nearest contour vertex near `point`; `None` without a built index.
    pub fn query_nearest(&self, point: &PlanePoint) -> Option<PlanePoint> {
        self.lookup.as_ref()?.query_nearest(point)
    }

    pub fn spatial_index(&self) -> Option<&PointIndex> {
        self.lookup.as_ref()
    }

    // --- Set maintenance ---

    /// Builds a contour from `points` and stores it under `threshold`,
    /// creating the threshold if needed.
    pub fn add_contour(&mut self, threshold: f64, points: Vec<PlanePoint>) -> Result<ContourKey> {
        let contour = Contour::with_colinear_angle(points, self.config.colinear_angle_deg)?;
        let key = self.arena.insert(contour);
        self.levels.entry(Threshold(threshold)).or_default().push(key);
        Ok(key)
    }

    /// Removes one contour from `threshold`'s set and returns it.
    pub fn remove_contour(&mut self, threshold: f64, key: ContourKey) -> Result<Contour> {
        let keys = self
            .levels
            .get_mut(&Threshold(threshold))
            .ok_or(Error::ThresholdNotFound(threshold))?;
        let pos = keys
            .iter()
            .position(|&k| k == key)
            .ok_or(Error::ContourNotFound(key))?;
        keys.remove(pos);
        self.arena.remove(key).ok_or(Error::ContourNotFound(key))
    }

    /// Drops a threshold and all its contours; returns how many were removed.
    pub fn remove_threshold(&mut self, threshold: f64) -> Result<usize> {
        let keys = self
            .levels
            .remove(&Threshold(threshold))
            .ok_or(Error::ThresholdNotFound(threshold))?;
        for &k in &keys {
            self.arena.remove(k);
        }
        Ok(keys.len())
    }

    /// Drops every threshold, contour and the spatial index.
    pub fn clear(&mut self) {
        self.levels.clear();
        self.arena.clear();
        self.lookup = None;
    }

    /// Removes contours whose bounding-box area is below `min_area` from
    /// every threshold. Returns the number removed.
    pub fn remove_tiny(&mut self, min_area: f64) -> usize {
        let thresholds: Vec<f64> = self.thresholds().collect();
        thresholds
            .into_iter()
            .map(|t| self.remove_tiny_at(t, min_area))
            .sum()
    }

    fn remove_tiny_at(&mut self, threshold: f64, min_area: f64) -> usize {
        let Some(keys) = self.levels.get_mut(&Threshold(threshold)) else {
            return 0;
        };
        let arena = &mut self.arena;
        let before = keys.len();
        keys.retain(|&k| {
            let keep = arena.get(k).is_some_and(|c| c.area_estimate() >= min_area);
            if !keep {
                arena.remove(k);
            }
            keep
        });
        before - keys.len()
    }

    fn drop_threshold_contours(&mut self, threshold: f64) {
        if let Some(old) = self.levels.remove(&Threshold(threshold)) {
            for k in old {
                self.arena.remove(k);
            }
        }
    }

    fn keys_at(&self, threshold: f64) -> Result<&Vec<ContourKey>> {
        self.levels
            .get(&Threshold(threshold))
            .ok_or(Error::ThresholdNotFound(threshold))
    }

    fn ensure_stored(&self, key: ContourKey) -> Result<()> {
        if self.arena.contains_key(key) {
            Ok(())
        } else {
            Err(Error::ContourNotFound(key))
        }
    }

    // --- Editing ---

    /// Splices a run of `other` into `target`; see [`Contour::splice`].
    #[allow(clippy::too_many_arguments)]
    pub fn splice(
        &mut self,
        target: ContourKey,
        other: ContourKey,
        this_start: PlanePoint,
        this_end: PlanePoint,
        other_start: PlanePoint,
        other_end: PlanePoint,
        reverse_other: bool,
    ) -> Result<()> {
        self.arena.splice(
            target,
            other,
            this_start,
            this_end,
            other_start,
            other_end,
            reverse_other,
        )
    }

    /// See [`Contour::insert`].
    pub fn insert_points(
        &mut self,
        key: ContourKey,
        after: PlanePoint,
        points: &[PlanePoint],
    ) -> Result<()> {
        self.arena.insert_points(key, after, points)
    }

    /// See [`Contour::delete`].
    pub fn delete_run(&mut self, key: ContourKey, start: PlanePoint, end: PlanePoint) -> Result<()> {
        self.arena.delete_run(key, start, end)
    }

    /// Splits a contour; the new contour joins the same threshold.
    pub fn split(&mut self, key: ContourKey, start: PlanePoint, end: PlanePoint) -> Result<ContourKey> {
        self.ensure_stored(key)?;
        let threshold = self.threshold_of(key).ok_or(Error::ContourNotFound(key))?;
        let new_key = self.arena.split(key, start, end)?;
        self.levels
            .entry(Threshold(threshold))
            .or_default()
            .push(new_key);
        Ok(new_key)
    }
}

/// `count` evenly spaced levels strictly between the mesh's lowest and
/// highest z.
pub fn default_levels(bounds: &Bounds, count: usize) -> Vec<f64> {
    let step = bounds.height() / (count as f64 + 1.0);
    (1..=count).map(|i| bounds.min.z + step * i as f64).collect()
}

/// Upper bound on the planes a single range may produce.
pub const MAX_RANGE_THRESHOLDS: usize = 1_000_000;

/// Thresholds `min + i * step` up to `max`.
///
/// Ranges that would produce more than [`MAX_RANGE_THRESHOLDS`] planes are
/// rejected as [`Error::InvalidRange`].
pub fn range_thresholds(min: f64, max: f64, step: f64, end: RangeEnd) -> Result<Vec<f64>> {
    let valid = min.is_finite() && max.is_finite() && step.is_finite() && step > 0.0 && min <= max;
    let span = (max - min) / step;
    // NaN or infinite spans fail the comparison too
    if !valid || !(span < MAX_RANGE_THRESHOLDS as f64) {
        return Err(Error::InvalidRange { min, max, step });
    }

    let last = span as u64 + 1;
    let mut thresholds = Vec::with_capacity(last as usize + 1);
    for i in 0..=last {
        let t = min + step * i as f64;
        let within = match end {
            RangeEnd::Exclusive => t < max,
            RangeEnd::Inclusive => t <= max,
        };
        if !within {
            break;
        }
        thresholds.push(t);
    }
    Ok(thresholds)
}

/// Slices one threshold into chains.
fn slice_chains<I>(index: &I, threshold: f64, config: &SliceConfig) -> Vec<Chain>
where
    I: MeshIndex + ?Sized,
{
    let candidates = index.query_by_z(threshold);
    let mut consolidator = Consolidator::with_scale(config.key_scale());
    for triangle in &candidates {
        let fragment = slice_triangle(triangle, threshold, config.at_plane_tolerance);
        if !fragment.is_empty() {
            consolidator.add(&fragment);
        }
    }
    let chains = consolidator.into_chains();
    debug!(
        threshold,
        triangles = candidates.len(),
        chains = chains.len(),
        "sliced threshold"
    );
    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use contour_lite_mesh::{Mesh, Point3, Triangle};

    fn p(x: f64, y: f64) -> PlanePoint {
        PlanePoint::new(x, y)
    }

    /// Four-sided pyramid: base corners at `(±s, ±s, 0)`, apex `(0, 0, h)`.
    fn pyramid(s: f64, h: f64) -> Mesh {
        let apex = Point3::new(0.0, 0.0, h);
        let corners = [
            Point3::new(-s, -s, 0.0),
            Point3::new(s, -s, 0.0),
            Point3::new(s, s, 0.0),
            Point3::new(-s, s, 0.0),
        ];
        Mesh::new(
            (0..4)
                .map(|i| Triangle::new(corners[i], corners[(i + 1) % 4], apex))
                .collect(),
        )
    }

    fn sequential() -> SliceConfig {
        SliceConfig {
            parallel: false,
            ..SliceConfig::default()
        }
    }

    #[test]
    fn threshold_ordering_is_total() {
        let mut ts = vec![Threshold(2.0), Threshold(-1.0), Threshold(0.5)];
        ts.sort();
        assert_eq!(ts, vec![Threshold(-1.0), Threshold(0.5), Threshold(2.0)]);
        assert_eq!(Threshold(f64::NAN), Threshold(f64::NAN));
    }

    #[test]
    fn range_exclusive_and_inclusive() {
        let ex = range_thresholds(0.0, 1.0, 0.25, RangeEnd::Exclusive).unwrap();
        assert_eq!(ex, vec![0.0, 0.25, 0.5, 0.75]);
        let inc = range_thresholds(0.0, 1.0, 0.25, RangeEnd::Inclusive).unwrap();
        assert_eq!(inc, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn range_rejects_bad_input() {
        for (min, max, step) in [(0.0, 1.0, 0.0), (0.0, 1.0, -1.0), (2.0, 1.0, 0.5), (0.0, f64::NAN, 1.0)] {
            assert!(matches!(
                range_thresholds(min, max, step, RangeEnd::Exclusive),
                Err(Error::InvalidRange { .. })
            ));
        }
    }

    #[test]
    fn range_with_too_many_planes_is_rejected() {
        assert!(matches!(
            range_thresholds(0.0, 1e12, 1e-6, RangeEnd::Exclusive),
            Err(Error::InvalidRange { .. })
        ));
        assert!(range_thresholds(-1e308, 1e308, 1.0, RangeEnd::Inclusive).is_err());

        let at_cap = range_thresholds(0.0, 999_999.0, 1.0, RangeEnd::Inclusive).unwrap();
        assert_eq!(at_cap.len(), MAX_RANGE_THRESHOLDS);
    }

    #[test]
    fn pyramid_slice_yields_one_square() {
        let mesh = pyramid(10.0, 10.0);
        let mut map = LevelMap::new(sequential());
        assert_eq!(map.slice_at(&mesh, &[5.0]), 1);

        let contours: Vec<_> = map.contours_at(5.0).unwrap().collect();
        assert_eq!(contours.len(), 1);
        let square = contours[0].1;
        assert_eq!(square.len(), 5);
        assert_relative_eq!(square.area_estimate(), 100.0);
        assert_eq!(square.anchor(), p(-5.0, -5.0));
    }

    #[test]
    fn tiny_contours_are_filtered() {
        let mesh = pyramid(2.0, 10.0);
        let mut map = LevelMap::new(sequential());
        assert_eq!(map.slice_at(&mesh, &[5.0]), 0);
        // threshold is still recorded, with an empty set
        assert_eq!(map.thresholds().collect::<Vec<_>>(), vec![5.0]);
        assert_eq!(map.contours_at(5.0).unwrap().count(), 0);
    }

    #[test]
    fn threshold_outside_mesh_gives_empty_set() {
        let mesh = pyramid(10.0, 10.0);
        let mut map = LevelMap::new(sequential());
        map.slice_at(&mesh, &[20.0, f64::NAN]);
        assert_eq!(map.thresholds().collect::<Vec<_>>(), vec![20.0]);
        assert_eq!(map.contour_count(), 0);
    }

    #[test]
    fn reslicing_replaces_only_listed_thresholds() {
        let mesh = pyramid(10.0, 10.0);
        let mut map = LevelMap::new(sequential());
        map.slice_at(&mesh, &[2.0, 5.0]);
        let old = map.find_contour(p(-5.0, -5.0), 5.0).unwrap().unwrap();
        let kept = map.contours_at(2.0).unwrap().next().unwrap().0;

        map.slice_at(&mesh, &[5.0]);
        assert!(map.contour(old).is_none());
        assert!(map.contour(kept).is_some());
        assert_eq!(map.arena().len(), 2);
    }

    #[test]
    fn find_contour_policies() {
        let mesh = pyramid(10.0, 10.0);
        let mut map = LevelMap::new(sequential());
        map.slice_at(&mesh, &[5.0]);

        assert!(map.find_contour(p(5.0, 5.0), 5.0).unwrap().is_some());
        assert_eq!(map.find_contour(p(1.0, 1.0), 5.0).unwrap(), None);
        assert!(matches!(
            map.find_contour(p(5.0, 5.0), 4.0),
            Err(Error::ThresholdNotFound(t)) if t == 4.0
        ));
        assert!(matches!(
            map.require_contour(p(1.0, 1.0), 5.0),
            Err(Error::NoContourAt { .. })
        ));
    }

    #[test]
    fn spatial_index_is_a_snapshot() {
        let mesh = pyramid(10.0, 10.0);
        let mut map = LevelMap::new(sequential());
        map.slice_at(&mesh, &[5.0]);
        assert_eq!(map.query_nearest(&p(5.1, 5.1)), None);

        assert_eq!(map.build_spatial_index(), 4);
        assert_eq!(map.query_nearest(&p(5.1, 4.8)), Some(p(5.0, 5.0)));

        let key = map.add_contour(7.0, vec![p(20.0, 20.0), p(30.0, 20.0), p(25.0, 30.0)]).unwrap();
        assert!(map.contour(key).is_some());
        assert_eq!(map.query_nearest(&p(20.1, 20.1)), None);
        map.build_spatial_index();
        assert_eq!(map.query_nearest(&p(20.1, 20.1)), Some(p(20.0, 20.0)));
    }

    #[test]
    fn split_joins_owning_threshold() {
        let mut map = LevelMap::new(sequential());
        let key = map
            .add_contour(1.0, vec![p(0.0, 0.0), p(4.0, 0.0), p(6.0, 3.0), p(4.0, 6.0), p(0.0, 6.0)])
            .unwrap();
        let new_key = map.split(key, p(4.0, 0.0), p(4.0, 6.0)).unwrap();
        assert_eq!(map.threshold_of(new_key), Some(1.0));
        assert_eq!(map.contour_count(), 2);
    }

    #[test]
    fn remove_contour_and_threshold() {
        let mut map = LevelMap::new(sequential());
        let a = map.add_contour(1.0, vec![p(0.0, 0.0), p(9.0, 0.0), p(9.0, 9.0)]).unwrap();
        let b = map.add_contour(1.0, vec![p(20.0, 0.0), p(21.0, 0.0), p(21.0, 1.0)]).unwrap();
        map.add_contour(2.0, vec![p(0.0, 0.0), p(9.0, 0.0), p(9.0, 9.0)]).unwrap();

        assert_eq!(map.remove_tiny(15.0), 1);
        assert!(map.contour(b).is_none());
        assert!(matches!(map.remove_contour(1.0, b), Err(Error::ContourNotFound(_))));

        map.remove_contour(1.0, a).unwrap();
        assert_eq!(map.remove_threshold(2.0).unwrap(), 1);
        assert!(map.remove_threshold(2.0).is_err());
        assert_eq!(map.arena().len(), 0);

        map.clear();
        assert_eq!(map.thresholds().count(), 0);
    }

    #[test]
    fn default_levels_are_interior() {
        let bounds = Bounds {
            min: Point3::new(0.0, 0.0, 0.0),
            max: Point3::new(1.0, 1.0, 12.0),
        };
        assert_eq!(default_levels(&bounds, 3), vec![3.0, 6.0, 9.0]);
        assert!(default_levels(&bounds, 0).is_empty());
    }
}
