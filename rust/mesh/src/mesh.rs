// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle and mesh data structures.

use nalgebra::Point3;

/// A triangle with its three vertices in file order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f64>; 3],
}

impl Triangle {
    /// Create a triangle from three vertices
    #[inline]
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { vertices: [a, b, c] }
    }

    /// Smallest and largest vertex z, as `(z_min, z_max)`.
    #[inline]
    pub fn z_range(&self) -> (f64, f64) {
        let [a, b, c] = &self.vertices;
        (a.z.min(b.z).min(c.z), a.z.max(b.z).max(c.z))
    }

    /// True if `z` lies in the closed interval `[z_min, z_max]`.
    #[inline]
    pub fn spans_z(&self, z: f64) -> bool {
        let (lo, hi) = self.z_range();
        lo <= z && z <= hi
    }
}

/// Axis-aligned bounds of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bounds {
    /// Vertical extent of the bounds.
    pub fn height(&self) -> f64 {
        self.max.z - self.min.z
    }
}

/// Ordered, read-only collection of triangles.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create a mesh from a triangle list
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Number of triangles
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounds over every vertex, computed in one linear scan.
    ///
    /// Returns `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Bounds> {
        if self.triangles.is_empty() {
            return None;
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        for vertex in self.triangles.iter().flat_map(|t| t.vertices.iter()) {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            min.z = min.z.min(vertex.z);
            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
            max.z = max.z.max(vertex.z);
        }

        Some(Bounds { min, max })
    }
}
