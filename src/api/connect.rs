//! Point-to-point corridor synthesis for the editor's connect tool
//!
//! Joins two world-space points with an L of axis-aligned corridor strips
//! and a slightly randomized junction room at the elbow. Coordinates are
//! pixels throughout; widths arrive in meters.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::types::WorldPoint;
use crate::geometry::object::{GeometryObject, ObjectKind, PointXY};
use crate::geometry::METER;

/// Pairs closer than this (in pixels) get no corridor at all.
const MIN_PATH_DISTANCE: f64 = 50.0;

pub fn generate_procedural_path(
    start: WorldPoint,
    end: WorldPoint,
    width: f64,
    rng: &mut ChaCha8Rng,
) -> Vec<GeometryObject> {
    let (x1, y1) = (start.x, start.y);
    let (x2, y2) = (end.x, end.y);
    let width_px = width * METER;

    let (dx, dy) = (x2 - x1, y2 - y1);
    if (dx * dx + dy * dy).sqrt() < MIN_PATH_DISTANCE {
        return Vec::new();
    }

    // Longer axis first
    let (mid_x, mid_y) = if dx.abs() > dy.abs() { (x2, y1) } else { (x1, y2) };

    let mut objects = Vec::new();
    if let Some(corridor) = create_rect_corridor(x1, y1, mid_x, mid_y, width_px) {
        objects.push(corridor);
    }
    objects.push(create_junction_room(mid_x, mid_y, width_px * 1.5, rng));
    if let Some(corridor) = create_rect_corridor(mid_x, mid_y, x2, y2, width_px) {
        objects.push(corridor);
    }

    objects
}

/// Axis-aligned corridor strip. Degenerate strips (both extents under ten
/// pixels) are dropped.
fn create_rect_corridor(x1: f64, y1: f64, x2: f64, y2: f64, width: f64) -> Option<GeometryObject> {
    let half_w = width / 2.0;

    let (min_x, max_x, min_y, max_y) = if (x2 - x1).abs() > (y2 - y1).abs() {
        (x1.min(x2) - half_w, x1.max(x2) + half_w, y1 - half_w, y1 + half_w)
    } else {
        (x1 - half_w, x1 + half_w, y1.min(y2) - half_w, y1.max(y2) + half_w)
    };

    let w = max_x - min_x;
    let h = max_y - min_y;
    if w < 10.0 && h < 10.0 {
        return None;
    }

    let mut obj = GeometryObject::new(ObjectKind::Polyfloor);
    obj.x = Some(min_x + w / 2.0);
    obj.y = Some(min_y + h / 2.0);
    obj.width = Some(w);
    obj.height = Some(h);
    obj.points = Some(vec![
        PointXY::new(min_x, min_y),
        PointXY::new(max_x, min_y),
        PointXY::new(max_x, max_y),
        PointXY::new(min_x, max_y),
    ]);
    obj.floor_height = Some(0.0);
    obj.closed = Some(true);
    obj.label = Some(String::new());
    Some(obj)
}

fn create_junction_room(cx: f64, cy: f64, size: f64, rng: &mut ChaCha8Rng) -> GeometryObject {
    let w = size * (0.9 + rng.gen::<f64>() * 0.3);
    let h = size * (0.9 + rng.gen::<f64>() * 0.3);
    let min_x = cx - w / 2.0;
    let min_y = cy - h / 2.0;

    let mut obj = GeometryObject::new(ObjectKind::Polyfloor);
    obj.x = Some(cx);
    obj.y = Some(cy);
    obj.points = Some(vec![
        PointXY::new(min_x, min_y),
        PointXY::new(min_x + w, min_y),
        PointXY::new(min_x + w, min_y + h),
        PointXY::new(min_x, min_y + h),
    ]);
    obj.width = Some(w);
    obj.height = Some(h);
    obj.floor_height = Some(0.0);
    obj.closed = Some(true);
    obj.label = Some(String::new());
    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_short_path_yields_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let objects = generate_procedural_path(
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(30.0, 30.0),
            5.0,
            &mut rng,
        );
        assert!(objects.is_empty());
    }

    #[test]
    fn test_l_path_has_two_corridors_and_junction() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let objects = generate_procedural_path(
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(800.0, 400.0),
            5.0,
            &mut rng,
        );
        assert_eq!(objects.len(), 3);
        assert!(objects.iter().all(|o| o.kind == ObjectKind::Polyfloor));
        // dx dominates, so the elbow sits at (end.x, start.y)
        let junction = &objects[1];
        assert_eq!(junction.x, Some(800.0));
        assert_eq!(junction.y, Some(0.0));
    }

    #[test]
    fn test_straight_path_drops_degenerate_leg() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let objects = generate_procedural_path(
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(0.0, 900.0),
            5.0,
            &mut rng,
        );
        // Vertical line: elbow equals the end point, second leg survives as
        // a width-only strip, first leg carries the full run
        assert!(objects.len() >= 2);
        let total_height: f64 = objects.iter().filter_map(|o| o.height).sum();
        assert!(total_height >= 900.0);
    }

    #[test]
    fn test_corridor_width_in_pixels() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let objects = generate_procedural_path(
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(1000.0, 0.0),
            5.0,
            &mut rng,
        );
        let first = &objects[0];
        // 5 m corridor is 160 px across
        assert_eq!(first.height, Some(5.0 * METER));
        assert_eq!(first.width, Some(1000.0 + 5.0 * METER));
    }
}
