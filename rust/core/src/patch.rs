// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Declarative contour fixups.
//!
//! Dataset-specific repairs (stitching slices of one shoreline together,
//! cutting off a spur, dropping a level) are expressed as data and replayed
//! through the public editing operations. Contours are addressed by a
//! threshold plus any point on them, so a patch list stays valid across
//! runs even though contour keys do not.
//!
//! ```json
//! [
//!   { "op": "splice", "threshold": 5.0,
//!     "this_start": {"x": 4, "y": 4}, "this_end": {"x": 0, "y": 0},
//!     "other_start": {"x": 8, "y": 0}, "other_end": {"x": 8, "y": 4},
//!     "remove_other": true },
//!   { "op": "remove_threshold", "threshold": 7.5 }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::level::LevelMap;
use crate::point::PlanePoint;

/// One editing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PatchOp {
    /// Splice the contour through `other_start` into the contour through
    /// `this_start`. Optionally drop the donor contour afterwards.
    Splice {
        threshold: f64,
        this_start: PlanePoint,
        this_end: PlanePoint,
        other_start: PlanePoint,
        other_end: PlanePoint,
        #[serde(default)]
        reverse: bool,
        #[serde(default)]
        remove_other: bool,
    },
    Insert {
        threshold: f64,
        after: PlanePoint,
        points: Vec<PlanePoint>,
    },
    Delete {
        threshold: f64,
        start: PlanePoint,
        end: PlanePoint,
    },
    Split {
        threshold: f64,
        start: PlanePoint,
        end: PlanePoint,
    },
    AddContour {
        threshold: f64,
        points: Vec<PlanePoint>,
    },
    RemoveContour {
        threshold: f64,
        point: PlanePoint,
    },
    RemoveThreshold {
        threshold: f64,
    },
}

/// Outcome of a patch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    pub applied: usize,
    /// Indices of patches that failed and were skipped.
    pub skipped: Vec<usize>,
}

/// Parses a JSON array of patches.
pub fn parse_patches(json: &str) -> Result<Vec<PatchOp>> {
    serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
}

impl LevelMap {
    /// Applies a single patch.
    pub fn apply_patch(&mut self, op: &PatchOp) -> Result<()> {
        match *op {
            PatchOp::Splice {
                threshold,
                this_start,
                this_end,
                other_start,
                other_end,
                reverse,
                remove_other,
            } => {
                let target = self.require_contour(this_start, threshold)?;
                let other = self.require_contour(other_start, threshold)?;
                self.splice(target, other, this_start, this_end, other_start, other_end, reverse)?;
                if remove_other && other != target {
                    self.remove_contour(threshold, other)?;
                }
            }
            PatchOp::Insert {
                threshold,
                after,
                ref points,
            } => {
                let key = self.require_contour(after, threshold)?;
                self.insert_points(key, after, points)?;
            }
            PatchOp::Delete {
                threshold,
                start,
                end,
            } => {
                let key = self.require_contour(start, threshold)?;
                self.delete_run(key, start, end)?;
            }
            PatchOp::Split {
                threshold,
                start,
                end,
            } => {
                let key = self.require_contour(start, threshold)?;
                self.split(key, start, end)?;
            }
            PatchOp::AddContour {
                threshold,
                ref points,
            } => {
                self.add_contour(threshold, points.clone())?;
            }
            PatchOp::RemoveContour { threshold, point } => {
                let key = self.require_contour(point, threshold)?;
                self.remove_contour(threshold, key)?;
            }
            PatchOp::RemoveThreshold { threshold } => {
                self.remove_threshold(threshold)?;
            }
        }
        Ok(())
    }

    /// Applies patches in order, stopping at the first failure.
    ///
    /// Patches before the failing one stay applied.
    pub fn apply_patches(&mut self, ops: &[PatchOp]) -> Result<PatchReport> {
        for (index, op) in ops.iter().enumerate() {
            self.apply_patch(op).map_err(|source| Error::Patch {
                index,
                source: Box::new(source),
            })?;
        }
        info!(patches = ops.len(), "applied patch list");
        Ok(PatchReport {
            applied: ops.len(),
            skipped: Vec::new(),
        })
    }

    /// Applies every patch that can be applied, logging and skipping the rest.
    pub fn apply_patches_lenient(&mut self, ops: &[PatchOp]) -> PatchReport {
        let mut report = PatchReport::default();
        for (index, op) in ops.iter().enumerate() {
            match self.apply_patch(op) {
                Ok(()) => report.applied += 1,
                Err(err) => {
                    warn!(index, %err, "skipping patch");
                    report.skipped.push(index);
                }
            }
        }
        info!(
            applied = report.applied,
            skipped = report.skipped.len(),
            "applied patch list"
        );
        report
    }
}
