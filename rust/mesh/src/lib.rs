// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Contour-Lite Mesh
//!
//! Terrain surfaces as plain triangle lists.
//!
//! - [`Mesh`] / [`Triangle`]: read-only triangle soup with 3D vertices
//! - [`parse_stl`]: binary and ASCII STL ingestion
//! - [`ZIntervalTree`]: answers "which triangles straddle `z = t`?" without
//!   scanning the whole mesh for every slicing plane
//!
//! No manifoldness or shared-vertex deduplication is assumed anywhere.

pub mod error;
pub mod index;
pub mod mesh;
pub mod stl;

// Re-export nalgebra types for convenience
pub use nalgebra::Point3;

pub use error::{Error, Result};
pub use index::{MeshIndex, ZIntervalTree};
pub use mesh::{Bounds, Mesh, Triangle};
pub use stl::parse_stl;
