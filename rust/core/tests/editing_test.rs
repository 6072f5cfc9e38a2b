// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use contour_lite_core::{
    parse_patches, parse_point_string, Contour, Error, LevelMap, PlanePoint, SliceConfig,
};
use contour_lite_mesh::{Mesh, Point3, Triangle};
use rustc_hash::FxHashSet;

fn p(x: f64, y: f64) -> PlanePoint {
    PlanePoint::new(x, y)
}

fn point_set(contour: &Contour) -> FxHashSet<PlanePoint> {
    contour.points().iter().copied().collect()
}

fn pyramid(s: f64, h: f64) -> Mesh {
    let apex = Point3::new(0.0, 0.0, h);
    let corners = [
        Point3::new(-s, -s, 0.0),
        Point3::new(s, -s, 0.0),
        Point3::new(s, s, 0.0),
        Point3::new(-s, s, 0.0),
    ];
    Mesh::new(
        (0..4)
            .map(|i| Triangle::new(corners[i], corners[(i + 1) % 4], apex))
            .collect(),
    )
}

#[test]
fn split_then_splice_restores_point_set() {
    let hexagon = parse_point_string("2,0 6,0 8,3 6,6 2,6 0,3").unwrap();
    let mut map = LevelMap::new(SliceConfig::default());
    let key = map.add_contour(1.0, hexagon).unwrap();
    let original = point_set(map.contour(key).unwrap());
    let pts = map.contour(key).unwrap().points().to_vec();

    let other = map.split(key, pts[0], pts[3]).unwrap();
    assert_eq!(map.contour_count(), 2);

    map.splice(key, other, pts[0], pts[3], pts[3], pts[0], false)
        .unwrap();
    map.remove_contour(1.0, other).unwrap();

    let rejoined = map.contour(key).unwrap();
    assert_eq!(point_set(rejoined), original);
    assert_eq!(rejoined.len(), 7);
    assert_eq!(rejoined.anchor(), p(2.0, 0.0));
}

#[test]
fn editing_a_missing_point_fails_loudly() {
    let mut map = LevelMap::new(SliceConfig::default());
    let key = map
        .add_contour(1.0, parse_point_string("0,0 9,0 9,9 0,9").unwrap())
        .unwrap();
    let before = map.contour(key).unwrap().points().to_vec();

    let err = map.delete_run(key, p(0.0, 0.0), p(3.0, 3.0)).unwrap_err();
    assert!(matches!(err, Error::PointNotFound { point, .. } if point == p(3.0, 3.0)));
    assert_eq!(map.contour(key).unwrap().points(), &before[..]);
}

#[test]
fn json_patch_list_on_sliced_map() {
    let mesh = pyramid(10.0, 10.0);
    let mut map = LevelMap::new(SliceConfig {
        parallel: false,
        ..SliceConfig::default()
    });
    map.slice_at(&mesh, &[2.0, 5.0]);
    assert_eq!(map.contour_count(), 2);

    let ops = parse_patches(
        r#"[
            {"op": "insert", "threshold": 5.0,
             "after": {"x": 5.0, "y": -5.0}, "points": [{"x": 7.0, "y": 0.0}]},
            {"op": "remove_threshold", "threshold": 2.0},
            {"op": "add_contour", "threshold": 9.0,
             "points": [{"x": 20, "y": 20}, {"x": 30, "y": 20}, {"x": 25, "y": 28}]}
        ]"#,
    )
    .unwrap();
    let report = map.apply_patches(&ops).unwrap();
    assert_eq!(report.applied, 3);
    assert!(report.skipped.is_empty());

    assert_eq!(map.thresholds().collect::<Vec<_>>(), vec![5.0, 9.0]);
    let key = map.require_contour(p(7.0, 0.0), 5.0).unwrap();
    assert_eq!(map.contour(key).unwrap().len(), 6);

    map.build_spatial_index();
    assert_eq!(map.query_nearest(&p(6.9, 0.1)), Some(p(7.0, 0.0)));
    assert_eq!(map.query_nearest(&p(24.8, 27.6)), Some(p(25.0, 28.0)));
}
