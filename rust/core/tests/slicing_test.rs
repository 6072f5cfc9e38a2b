// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use contour_lite_core::{
    level_paths, slice_triangle, Consolidator, LevelMap, PathOptions, PlanePoint, RangeEnd,
    SliceConfig,
};
use contour_lite_mesh::{parse_stl, Mesh, MeshIndex, Point3, Triangle, ZIntervalTree};

/// Four triangles around an apex at `(cx, cy, h)`, base corners at
/// `(cx ± s, cy ± s, 0)`.
fn pyramid_at(cx: f64, cy: f64, s: f64, h: f64) -> Vec<Triangle> {
    let apex = Point3::new(cx, cy, h);
    let corners = [
        Point3::new(cx - s, cy - s, 0.0),
        Point3::new(cx + s, cy - s, 0.0),
        Point3::new(cx + s, cy + s, 0.0),
        Point3::new(cx - s, cy + s, 0.0),
    ];
    (0..4)
        .map(|i| Triangle::new(corners[i], corners[(i + 1) % 4], apex))
        .collect()
}

fn pyramid(s: f64, h: f64) -> Mesh {
    Mesh::new(pyramid_at(0.0, 0.0, s, h))
}

fn sequential() -> SliceConfig {
    SliceConfig {
        parallel: false,
        ..SliceConfig::default()
    }
}

fn ascii_stl(triangles: &[Triangle]) -> String {
    let mut out = String::from("solid pyramid\n");
    for t in triangles {
        out.push_str("  facet normal 0 0 1\n    outer loop\n");
        for v in &t.vertices {
            out.push_str(&format!("      vertex {} {} {}\n", v.x, v.y, v.z));
        }
        out.push_str("    endloop\n  endfacet\n");
    }
    out.push_str("endsolid pyramid\n");
    out
}

#[test]
fn ring_of_pyramid_faces_closes_into_one_chain() {
    let mesh = pyramid(10.0, 10.0);
    let mut consolidator = Consolidator::new(5);
    // feed in a scrambled order
    for i in [2, 0, 3, 1] {
        let fragment = slice_triangle(&mesh.triangles[i], 4.0, 0.0);
        assert_eq!(fragment.len(), 2);
        consolidator.add(&fragment);
    }

    let chains = consolidator.into_chains();
    assert_eq!(chains.len(), 1);
    assert!(chains[0].closed);
    assert_eq!(chains[0].points.len(), 5);
}

#[test]
fn large_pyramid_is_kept() {
    let mesh = pyramid(10.0, 10.0);
    let mut map = LevelMap::new(sequential());
    assert_eq!(map.slice_at(&mesh, &[5.0]), 1);

    let (_, contour) = map.contours_at(5.0).unwrap().next().unwrap();
    assert_eq!(contour.points().first(), contour.points().last());
    assert!(contour.is_clockwise());
    assert_eq!(contour.anchor(), PlanePoint::new(-5.0, -5.0));
    assert_relative_eq!(contour.area_estimate(), 100.0);
}

#[test]
fn small_pyramid_is_filtered_as_tiny() {
    let mesh = pyramid(2.0, 10.0);
    let mut map = LevelMap::new(sequential());
    assert_eq!(map.slice_at(&mesh, &[5.0]), 0);

    // same slice survives once the cutoff is lowered
    let mut lenient = LevelMap::new(SliceConfig {
        min_area: 1.0,
        ..sequential()
    });
    assert_eq!(lenient.slice_at(&mesh, &[5.0]), 1);
    let (_, contour) = lenient.contours_at(5.0).unwrap().next().unwrap();
    assert_relative_eq!(contour.area_estimate(), 4.0);
}

#[test]
fn interval_tree_and_linear_scan_agree() {
    let mut triangles = pyramid_at(0.0, 0.0, 10.0, 10.0);
    triangles.extend(pyramid_at(40.0, 0.0, 10.0, 20.0));
    let mesh = Mesh::new(triangles.clone());
    let tree = ZIntervalTree::new(Mesh::new(triangles));

    for t in [0.5, 5.0, 9.9, 12.0, 19.0, 25.0] {
        assert_eq!(tree.query_by_z(t).len(), mesh.query_by_z(t).len(), "z = {t}");
    }

    let mut by_tree = LevelMap::new(sequential());
    let mut by_scan = LevelMap::new(sequential());
    by_tree
        .slice_range(&tree, 1.0, 20.0, 1.0, RangeEnd::Exclusive)
        .unwrap();
    by_scan
        .slice_range(&mesh, 1.0, 20.0, 1.0, RangeEnd::Exclusive)
        .unwrap();

    let counts = |map: &LevelMap| map.levels().map(|(t, keys)| (t, keys.len())).collect::<Vec<_>>();
    assert_eq!(counts(&by_tree), counts(&by_scan));
    assert_eq!(by_tree.thresholds().count(), 19);
}

#[test]
fn parallel_slicing_matches_sequential() {
    let mut triangles = pyramid_at(0.0, 0.0, 10.0, 10.0);
    triangles.extend(pyramid_at(30.0, 30.0, 12.0, 6.0));
    let tree = ZIntervalTree::new(Mesh::new(triangles));

    let mut parallel = LevelMap::new(SliceConfig::default());
    let mut serial = LevelMap::new(sequential());
    parallel
        .slice_range(&tree, 0.5, 10.0, 0.5, RangeEnd::Inclusive)
        .unwrap();
    serial
        .slice_range(&tree, 0.5, 10.0, 0.5, RangeEnd::Inclusive)
        .unwrap();

    let opts = PathOptions::default();
    assert_eq!(level_paths(&parallel, &opts), level_paths(&serial, &opts));
    // both peaks are cut below 6
    assert_eq!(parallel.contours_at(3.0).unwrap().count(), 2);
}

#[test]
fn stl_to_contours() {
    let stl = ascii_stl(&pyramid_at(0.0, 0.0, 10.0, 10.0));
    let mesh = parse_stl(stl.as_bytes()).unwrap();
    let bounds = mesh.bounds().unwrap();
    assert_eq!(bounds.max.z, 10.0);

    let tree = ZIntervalTree::new(mesh);
    let mut map = LevelMap::new(sequential());
    let levels = contour_lite_core::default_levels(&bounds, 4);
    assert_eq!(levels, vec![2.0, 4.0, 6.0, 8.0]);

    assert_eq!(map.slice_at(&tree, &levels), 4);
    // the 4x4 square at z = 8 goes once the cutoff is raised past 16
    assert_eq!(map.remove_tiny(20.0), 1);
    assert_eq!(map.contours_at(8.0).unwrap().count(), 0);
    assert_eq!(map.contour_count(), 3);
}
