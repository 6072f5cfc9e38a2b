// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Z-range indexing over mesh triangles.
//!
//! A slicing plane `z = t` only ever touches triangles whose vertical extent
//! `[z_min, z_max]` contains `t`. [`ZIntervalTree`] is a static centered
//! interval tree over those extents, built once per mesh and queried once per
//! threshold.

use std::cmp::Ordering;

use crate::mesh::{Bounds, Mesh, Triangle};

/// Source of candidate triangles for a slicing plane.
pub trait MeshIndex {
    /// Returns every triangle whose closed z-range contains `threshold`.
    ///
    /// The result is empty when no triangle matches. No particular order is
    /// guaranteed.
    fn query_by_z(&self, threshold: f64) -> Vec<&Triangle>;
}

/// Brute-force scan; useful for tiny meshes and as a reference in tests.
impl MeshIndex for Mesh {
    fn query_by_z(&self, threshold: f64) -> Vec<&Triangle> {
        self.triangles
            .iter()
            .filter(|t| t.spans_z(threshold))
            .collect()
    }
}

#[derive(Debug)]
struct Node {
    center: f64,
    /// Intervals containing `center`, ascending by `z_min`
    by_min: Vec<usize>,
    /// The same intervals, descending by `z_max`
    by_max: Vec<usize>,
    left: Option<usize>,
    right: Option<usize>,
}

/// Centered interval tree over triangle z-ranges.
///
/// Owns the mesh it indexes. Read-only after construction, so it can be
/// shared between threads slicing different thresholds.
#[derive(Debug)]
pub struct ZIntervalTree {
    mesh: Mesh,
    ranges: Vec<(f64, f64)>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl ZIntervalTree {
    /// Builds the tree over every triangle of `mesh`.
    pub fn new(mesh: Mesh) -> Self {
        let ranges: Vec<(f64, f64)> = mesh.triangles.iter().map(Triangle::z_range).collect();
        let mut tree = Self {
            mesh,
            ranges,
            nodes: Vec::new(),
            root: None,
        };
        let all: Vec<usize> = (0..tree.ranges.len()).collect();
        tree.root = tree.build(all);
        tracing::debug!(
            triangles = tree.ranges.len(),
            nodes = tree.nodes.len(),
            "Built z-interval tree"
        );
        tree
    }

    /// The indexed mesh.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Bounds of the indexed mesh.
    pub fn bounds(&self) -> Option<Bounds> {
        self.mesh.bounds()
    }

    fn build(&mut self, items: Vec<usize>) -> Option<usize> {
        if items.is_empty() {
            return None;
        }

        // The median endpoint is itself an endpoint of some interval, so at
        // least one interval lands in this node and recursion terminates.
        let mut endpoints: Vec<f64> = items
            .iter()
            .flat_map(|&i| [self.ranges[i].0, self.ranges[i].1])
            .collect();
        endpoints.sort_by(f64::total_cmp);
        let center = endpoints[endpoints.len() / 2];

        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut here = Vec::new();
        for i in items {
            let (lo, hi) = self.ranges[i];
            if hi < center {
                left.push(i);
            } else if lo > center {
                right.push(i);
            } else {
                here.push(i);
            }
        }

        let mut by_min = here.clone();
        by_min.sort_by(|&a, &b| self.ranges[a].0.total_cmp(&self.ranges[b].0));
        let mut by_max = here;
        by_max.sort_by(|&a, &b| self.ranges[b].1.total_cmp(&self.ranges[a].1));

        let left = self.build(left);
        let right = self.build(right);

        self.nodes.push(Node {
            center,
            by_min,
            by_max,
            left,
            right,
        });
        Some(self.nodes.len() - 1)
    }
}

impl MeshIndex for ZIntervalTree {
    fn query_by_z(&self, threshold: f64) -> Vec<&Triangle> {
        let mut hits = Vec::new();
        let mut cursor = self.root;

        while let Some(idx) = cursor {
            let node = &self.nodes[idx];
            match threshold.partial_cmp(&node.center) {
                Some(Ordering::Less) => {
                    for &i in &node.by_min {
                        if self.ranges[i].0 > threshold {
                            break;
                        }
                        hits.push(&self.mesh.triangles[i]);
                    }
                    cursor = node.left;
                }
                Some(Ordering::Greater) => {
                    for &i in &node.by_max {
                        if self.ranges[i].1 < threshold {
                            break;
                        }
                        hits.push(&self.mesh.triangles[i]);
                    }
                    cursor = node.right;
                }
                Some(Ordering::Equal) => {
                    hits.extend(node.by_min.iter().map(|&i| &self.mesh.triangles[i]));
                    cursor = None;
                }
                // NaN threshold matches nothing
                None => cursor = None,
            }
        }

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    /// Vertical sliver triangle spanning `[lo, hi]`, tagged by its x offset.
    fn sliver(x: f64, lo: f64, hi: f64) -> Triangle {
        Triangle::new(
            Point3::new(x, 0.0, lo),
            Point3::new(x + 1.0, 0.0, hi),
            Point3::new(x, 1.0, (lo + hi) / 2.0),
        )
    }

    fn tags(mut hits: Vec<&Triangle>) -> Vec<f64> {
        hits.sort_by(|a, b| a.vertices[0].x.total_cmp(&b.vertices[0].x));
        hits.iter().map(|t| t.vertices[0].x).collect()
    }

    fn sample_mesh() -> Mesh {
        Mesh::new(vec![
            sliver(0.0, 0.0, 1.0),
            sliver(1.0, 0.5, 2.0),
            sliver(2.0, 3.0, 4.0),
            sliver(3.0, -2.0, 10.0),
            sliver(4.0, 1.0, 1.0),
            sliver(5.0, 6.0, 7.5),
        ])
    }

    #[test]
    fn query_matches_linear_scan() {
        let mesh = sample_mesh();
        let tree = ZIntervalTree::new(mesh.clone());
        for step in -30..=110 {
            let z = step as f64 * 0.1;
            assert_eq!(
                tags(tree.query_by_z(z)),
                tags(mesh.query_by_z(z)),
                "mismatch at z = {z}"
            );
        }
    }

    #[test]
    fn closed_interval_endpoints_match() {
        let tree = ZIntervalTree::new(sample_mesh());
        assert_eq!(tags(tree.query_by_z(4.0)), vec![2.0, 3.0]);
        assert_eq!(tags(tree.query_by_z(1.0)), vec![0.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn outside_all_ranges_is_empty() {
        let tree = ZIntervalTree::new(sample_mesh());
        assert!(tree.query_by_z(11.0).is_empty());
        assert!(tree.query_by_z(-2.5).is_empty());
        assert!(tree.query_by_z(f64::NAN).is_empty());
    }

    #[test]
    fn empty_mesh() {
        let tree = ZIntervalTree::new(Mesh::default());
        assert!(tree.query_by_z(0.0).is_empty());
        assert!(tree.bounds().is_none());
    }
}
