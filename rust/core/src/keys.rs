// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handles for arena-stored chains and contours.
//!
//! Contours are edited in place, so nothing may be keyed on their point
//! content. Callers hold a [`ContourKey`] (a generational slot map index)
//! and every contour additionally carries a process-unique [`ContourId`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Key for a contour stored in a [`crate::ContourArena`].
    pub struct ContourKey;

    /// Key for an in-progress chain inside a [`crate::Consolidator`].
    pub struct ChainKey;
}

static NEXT_CONTOUR_ID: AtomicU64 = AtomicU64::new(0);

/// Monotonic, process-unique contour identity.
///
/// Equality and hashing of [`crate::Contour`] go through this id, never
/// through the (mutable) point sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContourId(pub u64);

impl ContourId {
    /// Allocates the next id.
    pub(crate) fn next() -> Self {
        ContourId(NEXT_CONTOUR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ContourId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
