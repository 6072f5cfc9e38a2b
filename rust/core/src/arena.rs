// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for contours.
//!
//! The [`ContourArena`] owns every contour; callers pass [`ContourKey`]s
//! around instead of references. Keys stay valid while other contours are
//! removed (generational indices), and edits that involve two contours
//! (splice) go through the arena so both can be addressed by key, including
//! the case where both keys are the same contour.

use slotmap::SlotMap;

use crate::contour::Contour;
use crate::error::{Error, Result};
use crate::keys::ContourKey;
use crate::point::PlanePoint;

/// Owner of all contours.
///
/// # Example
///
/// ```
/// use contour_lite_core::{Contour, ContourArena, PlanePoint};
///
/// let mut arena = ContourArena::new();
/// let square = Contour::new(vec![
///     PlanePoint::new(0.0, 0.0),
///     PlanePoint::new(4.0, 0.0),
///     PlanePoint::new(4.0, 4.0),
///     PlanePoint::new(0.0, 4.0),
/// ])
/// .unwrap();
/// let key = arena.insert(square);
///
/// assert_eq!(arena.len(), 1);
/// assert_eq!(arena.get(key).unwrap().len(), 5);
/// ```
#[derive(Debug, Default)]
pub struct ContourArena {
    pub(crate) contours: SlotMap<ContourKey, Contour>,
}

impl ContourArena {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            contours: SlotMap::with_key(),
        }
    }

    /// Takes ownership of a contour and returns its key.
    pub fn insert(&mut self, contour: Contour) -> ContourKey {
        self.contours.insert(contour)
    }

    /// Returns the contour for the given key, or `None` if not found.
    pub fn get(&self, key: ContourKey) -> Option<&Contour> {
        self.contours.get(key)
    }

    /// Removes and returns a contour.
    pub fn remove(&mut self, key: ContourKey) -> Option<Contour> {
        self.contours.remove(key)
    }

    /// Returns the number of contours in the arena.
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn contains_key(&self, key: ContourKey) -> bool {
        self.contours.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContourKey, &Contour)> {
        self.contours.iter()
    }

    pub fn clear(&mut self) {
        self.contours.clear();
    }

    fn get_mut(&mut self, key: ContourKey) -> Result<&mut Contour> {
        self.contours.get_mut(key).ok_or(Error::ContourNotFound(key))
    }

    fn get_checked(&self, key: ContourKey) -> Result<&Contour> {
        self.contours.get(key).ok_or(Error::ContourNotFound(key))
    }

    // --- Topology edits ---

    /// Splices a run of `other` into `target`; see [`Contour::splice`].
    ///
    /// `other` is left unchanged. `target == other` is allowed.
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
        self.get_checked(target)?;
        let borrowed = self.get_checked(other)?.run_between(other_start, other_end)?;
        self.get_mut(target)?
            .splice_run(this_start, this_end, borrowed, reverse_other)
    }

    /// Inserts points after `after`; see [`Contour::insert`].
    pub fn insert_points(
        &mut self,
        key: ContourKey,
        after: PlanePoint,
        points: &[PlanePoint],
    ) -> Result<()> {
        self.get_mut(key)?.insert(after, points)
    }

    /// Deletes a clockwise run; see [`Contour::delete`].
    pub fn delete_run(&mut self, key: ContourKey, start: PlanePoint, end: PlanePoint) -> Result<()> {
        self.get_mut(key)?.delete(start, end)
    }

    /// Splits a contour and stores the split-off part; see [`Contour::split`].
    pub fn split(&mut self, key: ContourKey, start: PlanePoint, end: PlanePoint) -> Result<ContourKey> {
        let split_off = self.get_mut(key)?.split(start, end)?;
        Ok(self.insert(split_off))
    }
}
