// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Contour-Lite Core
//!
//! Iso-elevation contours from terrain meshes, kept as editable, canonically
//! ordered polygons.
//!
//! ## Overview
//!
//! - **Plane slicing**: each triangle straddling `z = t` yields a short
//!   boundary fragment ([`slice_triangle`])
//! - **Consolidation**: fragments are merged online into maximal chains by
//!   rounded endpoint identity ([`Consolidator`])
//! - **Canonical contours**: closed, deduplicated, clockwise, anchored at the
//!   upper-left point, with splice/insert/delete/split editing ([`Contour`])
//! - **Level map**: threshold-keyed contour sets stored in an arena
//!   ([`LevelMap`], [`ContourArena`])
//! - **Nearest-point lookup**: unit-cell grid over all contour vertices
//!   ([`PointIndex`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use contour_lite_core::{LevelMap, RangeEnd, SliceConfig};
//! use contour_lite_mesh::{parse_stl, ZIntervalTree};
//!
//! let mesh = parse_stl(&std::fs::read("terrain.stl")?)?;
//! let index = ZIntervalTree::new(mesh);
//!
//! let mut map = LevelMap::new(SliceConfig::from_env());
//! map.slice_range(&index, 4.0, 6.0, 0.1, RangeEnd::Exclusive)?;
//!
//! for (threshold, keys) in map.levels() {
//!     println!("{threshold}: {} contours", keys.len());
//! }
//! ```
//!
//! ## Editing
//!
//! Contours are addressed by [`ContourKey`]. Locate one with
//! [`LevelMap::find_contour`], then edit through the map or replay a
//! declarative [`PatchOp`] list with [`LevelMap::apply_patches`].

pub mod arena;
pub mod config;
pub mod consolidate;
pub mod contour;
pub mod error;
pub mod export;
pub mod keys;
pub mod level;
pub mod lookup;
pub mod patch;
pub mod point;
pub mod slicer;

pub use arena::ContourArena;
pub use config::SliceConfig;
pub use consolidate::{Chain, Consolidator};
pub use contour::{Contour, DEFAULT_COLINEAR_ANGLE_DEG};
pub use error::{Error, Result};
pub use export::{contour_paths, level_paths, ContourPath, LevelPath, PathOptions};
pub use keys::{ChainKey, ContourId, ContourKey};
pub use level::{
    default_levels, range_thresholds, LevelMap, RangeEnd, Threshold, MAX_RANGE_THRESHOLDS,
};
pub use lookup::PointIndex;
pub use patch::{parse_patches, PatchOp, PatchReport};
pub use point::{parse_point_string, to_point_string, PlanePoint};
pub use slicer::{classify, slice_triangle, Fragment, Side};
