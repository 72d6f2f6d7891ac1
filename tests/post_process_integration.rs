//! Post-processing passes over handcrafted levels

use levelforge::geometry::heightmap::{
    generate_cliffs_from_polygon_edges, generate_walls_from_polygon_edges, CliffOptions,
    WallOptions,
};
use levelforge::geometry::object::{GeometryObject, ObjectKind, PointXY};
use levelforge::geometry::METER;

fn square_floor(x: f64, y: f64, side: f64, floor_height: f64) -> GeometryObject {
    let mut obj = GeometryObject::new(ObjectKind::Polyfloor);
    obj.points = Some(vec![
        PointXY::new(x, y),
        PointXY::new(x + side, y),
        PointXY::new(x + side, y + side),
        PointXY::new(x, y + side),
    ]);
    obj.x = Some(x);
    obj.y = Some(y);
    obj.width = Some(side);
    obj.height = Some(side);
    obj.floor_height = Some(floor_height);
    obj
}

#[test]
fn test_walls_surround_single_floor() {
    let objects = vec![square_floor(0.0, 0.0, 10.0 * METER, 0.0)];
    let walls = generate_walls_from_polygon_edges(&objects, WallOptions::default());

    assert!(!walls.is_empty());
    assert!(walls.iter().all(|w| w.kind == ObjectKind::Polywall));
    // Walls rise from ground level regardless of floor height
    assert!(walls.iter().all(|w| w.from_height == Some(0.0)));
    assert!(walls.iter().all(|w| w.height == Some(4.0 * METER)));
    assert_eq!(walls[0].id, Some(90_000));
}

#[test]
fn test_no_floors_no_walls() {
    let walls = generate_walls_from_polygon_edges(&[], WallOptions::default());
    assert!(walls.is_empty());
}

#[test]
fn test_cliffs_emitted_on_outer_boundary() {
    let objects = vec![square_floor(0.0, 0.0, 10.0 * METER, 0.0)];
    let cliffs = generate_cliffs_from_polygon_edges(&objects, CliffOptions::default());

    assert!(!cliffs.is_empty());
    assert!(cliffs.iter().all(|c| c.kind == ObjectKind::Polycliff));
    // Outer boundary uses the default drop
    assert!(cliffs.iter().all(|c| c.depth == Some(8.0 * METER)));
    assert_eq!(cliffs[0].id, Some(95_000));
}

#[test]
fn test_cliff_between_floors_uses_height_difference() {
    // Two abutting squares, the left one 4 m higher
    let side = 10.0 * METER;
    let objects = vec![square_floor(0.0, 0.0, side, 4.0), square_floor(side, 0.0, side, 0.0)];
    let cliffs = generate_cliffs_from_polygon_edges(&objects, CliffOptions::default());

    let internal: Vec<&GeometryObject> =
        cliffs.iter().filter(|c| c.depth == Some(4.0 * METER)).collect();
    assert!(!internal.is_empty(), "no cliff along the height step");
    // Emitted from the higher side only, starting at its floor height
    assert!(internal.iter().all(|c| c.from_height == Some(4.0 * METER)));
}

#[test]
fn test_small_height_difference_ignored() {
    let side = 10.0 * METER;
    let objects = vec![square_floor(0.0, 0.0, side, 0.05), square_floor(side, 0.0, side, 0.0)];
    let cliffs = generate_cliffs_from_polygon_edges(&objects, CliffOptions::default());

    // 0.05 m is below the 0.1 m threshold; only the outer rim drops
    assert!(cliffs.iter().all(|c| c.depth != Some(0.05 * METER)));
}

#[test]
fn test_spawn_markers_count_as_floor() {
    // A spawn rectangle with no polyfloor still produces outline walls
    let mut spawn = GeometryObject::new(ObjectKind::SpawnOff);
    spawn.x = Some(0.0);
    spawn.y = Some(0.0);
    spawn.width = Some(8.0 * METER);
    spawn.height = Some(8.0 * METER);

    let walls = generate_walls_from_polygon_edges(&[spawn], WallOptions::default());
    assert!(!walls.is_empty());
}

#[test]
fn test_wall_thickness_and_height_scale_with_options() {
    let objects = vec![square_floor(0.0, 0.0, 10.0 * METER, 0.0)];
    let options = WallOptions { wall_height: 6.0, wall_thickness: 2.0 };
    let walls = generate_walls_from_polygon_edges(&objects, options);
    assert!(walls.iter().all(|w| w.height == Some(6.0 * METER)));
    assert!(walls.iter().all(|w| w.thickness == Some(2.0 * METER)));
}
