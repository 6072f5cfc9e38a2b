// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical closed contours and their topology edits.
//!
//! A [`Contour`] is always held in canonical form:
//!
//! 1. explicitly closed (first point == last point),
//! 2. no repeated consecutive points and no near-straight interior points,
//! 3. clockwise in screen space (x right, y down), i.e. the shoelace term
//!    `sum((x_i - x_{i-1}) * (y_i + y_{i-1}))` is negative,
//! 4. starting at the anchor: the minimal-y point, ties broken by minimal x.
//!
//! Two contours sharing boundary points therefore agree on where their
//! clockwise runs start, which is what makes [`Contour::splice`] and
//! [`Contour::split`] addressable by plain point values.
//!
//! [`Contour::delete`] is the one edit that only restores closure; it does
//! not re-anchor or re-wind.

use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::keys::ContourId;
use crate::point::{to_point_string, PlanePoint};

/// Default colinearity angle, in degrees.
pub const DEFAULT_COLINEAR_ANGLE_DEG: f64 = 1.0;

/// A canonical, closed, clockwise polygon.
#[derive(Debug)]
pub struct Contour {
    id: ContourId,
    points: Vec<PlanePoint>,
    /// Colinearity threshold in radians
    straight: f64,
}

impl Contour {
    /// Builds a canonical contour from a raw (open or closed) point list.
    pub fn new(points: Vec<PlanePoint>) -> Result<Self> {
        Self::with_colinear_angle(points, DEFAULT_COLINEAR_ANGLE_DEG)
    }

    /// Like [`Contour::new`] with a custom colinearity angle in degrees.
    pub fn with_colinear_angle(points: Vec<PlanePoint>, degrees: f64) -> Result<Self> {
        let straight = degrees.to_radians();
        let points = canonicalize(points, straight)?;
        Ok(Self {
            id: ContourId::next(),
            points,
            straight,
        })
    }

    /// Process-unique identity of this contour.
    pub fn id(&self) -> ContourId {
        self.id
    }

    /// The closed point sequence, anchor first and last.
    pub fn points(&self) -> &[PlanePoint] {
        &self.points
    }

    /// Number of stored points, counting the closing duplicate.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point of the contour.
    pub fn anchor(&self) -> PlanePoint {
        self.points[0]
    }

    pub fn contains(&self, point: &PlanePoint) -> bool {
        self.points.contains(point)
    }

    /// Position of the first occurrence of `point`.
    pub fn index_of(&self, point: &PlanePoint) -> Option<usize> {
        self.points.iter().position(|p| p == point)
    }

    /// True if the point sequence winds clockwise in screen space.
    pub fn is_clockwise(&self) -> bool {
        is_clockwise(&self.points)
    }

    /// Area of the tight axis-aligned bounding box.
    ///
    /// A cheap "is this a speck" measure, not the polygon area.
    pub fn area_estimate(&self) -> f64 {
        let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
        let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        (max_x - min_x) * (max_y - min_y)
    }

    /// `"x1,y1 x2,y2 ..."` in canonical order.
    pub fn to_point_string(&self) -> String {
        to_point_string(&self.points)
    }

    /// Replaces this contour with `this_start..this_end` followed by
    /// `other_start..other_end` of `other` (both clockwise and inclusive),
    /// optionally reversing the borrowed run, then re-canonicalizes.
    ///
    /// `other` is not modified. Nothing changes if any point is missing.
    pub fn splice(
        &mut self,
        other: &Contour,
        this_start: PlanePoint,
        this_end: PlanePoint,
        other_start: PlanePoint,
        other_end: PlanePoint,
        reverse_other: bool,
    ) -> Result<()> {
        let borrowed = other.run_between(other_start, other_end)?;
        self.splice_run(this_start, this_end, borrowed, reverse_other)
    }

    /// Splice with the other contour's run already extracted.
    pub(crate) fn splice_run(
        &mut self,
        this_start: PlanePoint,
        this_end: PlanePoint,
        mut borrowed: Vec<PlanePoint>,
        reverse_other: bool,
    ) -> Result<()> {
        let mut joined = self.run_between(this_start, this_end)?;
        if reverse_other {
            borrowed.reverse();
        }
        joined.extend(borrowed);
        self.points = canonicalize(joined, self.straight)?;
        Ok(())
    }

    /// Inserts `points` right after `after` in clockwise order, then
    /// re-canonicalizes.
    pub fn insert(&mut self, after: PlanePoint, points: &[PlanePoint]) -> Result<()> {
        let at = self.locate(after)? + 1;
        let mut ring = self.points.clone();
        ring.splice(at..at, points.iter().copied());
        self.points = canonicalize(ring, self.straight)?;
        Ok(())
    }

    /// Removes the inclusive clockwise run `start..end`.
    ///
    /// Duplicates and straight runs left at the seam are removed and closure
    /// is restored, but the anchor and winding are left as they fall. Fails
    /// without changes if fewer than 3 points would remain.
    pub fn delete(&mut self, start: PlanePoint, end: PlanePoint) -> Result<()> {
        let s = self.locate(start)?;
        let e = self.locate(end)?;
        let ring = self.ring();

        let remaining: Vec<PlanePoint> = if s <= e {
            ring[..s].iter().chain(&ring[e + 1..]).copied().collect()
        } else {
            ring[e + 1..s].to_vec()
        };
        let mut remaining = tidy_ring(remaining, self.straight);
        if remaining.len() < 3 {
            return Err(Error::DegenerateContour {
                points: remaining.len(),
            });
        }
        remaining.push(remaining[0]);
        self.points = remaining;
        Ok(())
    }

    /// Splits the ring at `start` and `end`.
    ///
    /// The clockwise run `start..end` stays in `self` (re-canonicalized); the
    /// complementary run `end..start` is returned as a new contour. The
    /// inverse of [`Contour::splice`].
    pub fn split(&mut self, start: PlanePoint, end: PlanePoint) -> Result<Contour> {
        let s = self.locate(start)?;
        let e = self.locate(end)?;

        let kept = canonicalize(self.run(s, e), self.straight)?;
        let split_off = Contour {
            id: ContourId::next(),
            points: canonicalize(self.run(e, s), self.straight)?,
            straight: self.straight,
        };
        self.points = kept;
        Ok(split_off)
    }

    fn locate(&self, point: PlanePoint) -> Result<usize> {
        self.index_of(&point).ok_or(Error::PointNotFound {
            point,
            contour: self.id,
        })
    }

    /// Points without the closing duplicate.
    fn ring(&self) -> &[PlanePoint] {
        &self.points[..self.points.len() - 1]
    }

    /// Inclusive clockwise run between two points.
    pub(crate) fn run_between(&self, start: PlanePoint, end: PlanePoint) -> Result<Vec<PlanePoint>> {
        let s = self.locate(start)?;
        let e = self.locate(end)?;
        Ok(self.run(s, e))
    }

    /// Inclusive run from index `start` to `end`, wrapping past the anchor
    /// when `start > end`.
    fn run(&self, start: usize, end: usize) -> Vec<PlanePoint> {
        let ring = self.ring();
        if start <= end {
            ring[start..=end].to_vec()
        } else {
            ring[start..].iter().chain(&ring[..=end]).copied().collect()
        }
    }
}

impl PartialEq for Contour {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Contour {}

impl Hash for Contour {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Contour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_point_string())
    }
}

/// Brings a raw point list into canonical form.
fn canonicalize(points: Vec<PlanePoint>, straight: f64) -> Result<Vec<PlanePoint>> {
    let mut ring = tidy_ring(points, straight);
    if ring.len() < 3 {
        return Err(Error::DegenerateContour { points: ring.len() });
    }
    ring.push(ring[0]);

    if !is_clockwise(&ring) {
        ring.reverse();
    }

    let anchor = upper_left(&ring);
    if anchor != 0 {
        ring.pop();
        ring.rotate_left(anchor);
        ring.push(ring[0]);
    }
    Ok(ring)
}

/// Open ring with no repeated neighbours (the seam included) and no point
/// whose turn angle between its surviving neighbours is within `straight`.
fn tidy_ring(mut points: Vec<PlanePoint>, straight: f64) -> Vec<PlanePoint> {
    loop {
        let before = points.len();
        points.dedup();
        while points.len() > 1 && points[0] == points[points.len() - 1] {
            points.pop();
        }
        points = drop_straight_runs(points, straight);
        // a pass judges against neighbours that may themselves be dropped
        if points.len() == before {
            return points;
        }
    }
}

/// One pass removing points whose turn angle is within `straight` radians,
/// comparing each point against the last point kept. `ring` is open.
fn drop_straight_runs(ring: Vec<PlanePoint>, straight: f64) -> Vec<PlanePoint> {
    let n = ring.len();
    if n < 3 {
        return ring;
    }

    let mut kept = Vec::with_capacity(n);
    let mut prev = ring[n - 1];
    for i in 0..n {
        let cur = ring[i];
        let next = ring[(i + 1) % n];
        match turn_angle(&prev, &cur, &next) {
            Some(theta) if theta <= straight => {}
            _ => {
                kept.push(cur);
                prev = cur;
            }
        }
    }
    kept
}

/// Angle between `q - p` and `r - q`: 0 when `q` lies on a straight
/// line between `p` and `r`, up to pi for a full reversal. `None` for a
/// zero-length edge.
fn turn_angle(p: &PlanePoint, q: &PlanePoint, r: &PlanePoint) -> Option<f64> {
    let (ax, ay) = (q.x - p.x, q.y - p.y);
    let (bx, by) = (r.x - q.x, r.y - q.y);
    let norm = ax.hypot(ay) * bx.hypot(by);
    if norm == 0.0 {
        return None;
    }
    Some(((ax * bx + ay * by) / norm).clamp(-1.0, 1.0).acos())
}

fn is_clockwise(points: &[PlanePoint]) -> bool {
    let Some(&last) = points.last() else {
        return false;
    };
    let mut prev = last;
    let mut sum = 0.0;
    for &p in points {
        sum += (p.x - prev.x) * (p.y + prev.y);
        prev = p;
    }
    sum < 0.0
}

/// Index of the first minimal-y point, ties broken by minimal x.
fn upper_left(points: &[PlanePoint]) -> usize {
    let mut best = 0;
    for (i, p) in points.iter().enumerate() {
        let b = &points[best];
        if p.y < b.y || (p.y == b.y && p.x < b.x) {
            best = i;
        }
    }
    best
}
