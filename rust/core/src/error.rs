// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for slicing and contour editing.
//!
//! Precondition violations fail loudly: an editing call that names a point
//! missing from its contour returns [`Error::PointNotFound`] and leaves the
//! contour untouched.

use crate::keys::{ContourId, ContourKey};
use crate::point::PlanePoint;

/// Result type alias for contour operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during slicing and contour editing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An editing operation referenced a point that is not on the contour.
    #[error("point {point} is not on contour {contour}")]
    PointNotFound { point: PlanePoint, contour: ContourId },

    /// A contour key is not (or no longer) in the arena.
    #[error("contour not found: {0:?}")]
    ContourNotFound(ContourKey),

    /// No contour set is stored for the threshold.
    #[error("no contours stored for threshold {0}")]
    ThresholdNotFound(f64),

    /// The threshold exists but no contour passes through the point.
    #[error("no contour at threshold {threshold} passes through {point}")]
    NoContourAt { threshold: f64, point: PlanePoint },

    /// Too few distinct, non-colinear points to form a closed polygon.
    #[error("contour needs at least 3 distinct non-colinear points, got {points}")]
    DegenerateContour { points: usize },

    /// A slicing range that would produce no (or infinitely many) planes.
    #[error("invalid slicing range: min {min}, max {max}, step {step}")]
    InvalidRange { min: f64, max: f64, step: f64 },

    /// A point string is not of the form `x1,y1 x2,y2 ...`.
    #[error("malformed point string token: {0:?}")]
    PointString(String),

    /// A declarative patch failed.
    #[error("patch {index} failed: {source}")]
    Patch {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Mesh loading error.
    #[error(transparent)]
    Mesh(#[from] contour_lite_mesh::Error),
}
