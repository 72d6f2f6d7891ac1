//! Perimeter walls and gap fill for freshly generated maps
//!
//! Both passes work in tile space and emit world-space objects. Boundary
//! edges live on the tile lattice, so merging is done on integer lattice
//! indices and only converted to pixels at emission time.

use std::collections::BTreeMap;

use crate::geometry::coverage::{compute_polyfloor_coverage, Mask};
use crate::geometry::object::{GeometryObject, ObjectKind, PointXY};
use crate::grid::TileGrid;

const PERIMETER_WALL_ID_BASE: u64 = 90_000;
const GAP_FILL_ID_BASE: u64 = 95_000;

/// Merge sorted 1-tile segments on the same lattice line into runs.
/// Adjacent or overlapping segments coalesce.
fn merge_runs(mut segments: Vec<(i32, i32)>) -> Vec<(i32, i32)> {
    segments.sort_unstable();
    let mut merged = Vec::new();
    let mut iter = segments.into_iter();
    let Some((mut start, mut end)) = iter.next() else { return merged };
    for (s, e) in iter {
        if s <= end {
            end = end.max(e);
        } else {
            merged.push((start, end));
            start = s;
            end = e;
        }
    }
    merged.push((start, end));
    merged
}

/// Walls along every floor/void boundary of the covered mask, offset half a
/// thickness toward the void so they never intrude on the floor.
pub fn generate_perimeter_walls(
    covered: &Mask,
    scale_factor: f64,
    offset_x: f64,
    offset_y: f64,
    wall_thickness: f64,
    wall_height: f64,
) -> Vec<GeometryObject> {
    let (h, w) = (covered.height as i32, covered.width as i32);
    let tile_size = 32.0 * scale_factor;
    let map_center_x = w as f64 * tile_size / 2.0;
    let map_center_y = h as f64 * tile_size / 2.0;
    let wall_offset = wall_thickness / 2.0;

    let at = |y: i32, x: i32| -> bool {
        y >= 0 && x >= 0 && covered.get(y as usize, x as usize)
    };

    // Keyed by (lattice line index, offset sign): edges pushed toward
    // opposite sides never merge.
    let mut h_lines: BTreeMap<(i32, i8), Vec<(i32, i32)>> = BTreeMap::new();
    for y in 0..=h {
        for x in 0..w {
            let above = at(y - 1, x);
            let below = at(y, x);
            if above != below {
                let sign: i8 = if above { 1 } else { -1 };
                h_lines.entry((y, sign)).or_default().push((x, x + 1));
            }
        }
    }

    let mut v_lines: BTreeMap<(i32, i8), Vec<(i32, i32)>> = BTreeMap::new();
    for y in 0..h {
        for x in 0..=w {
            let left = at(y, x - 1);
            let right = at(y, x);
            if left != right {
                let sign: i8 = if left { 1 } else { -1 };
                v_lines.entry((x, sign)).or_default().push((y, y + 1));
            }
        }
    }

    let mut walls = Vec::new();
    let mut wall_id = PERIMETER_WALL_ID_BASE;
    let push_wall = |p1: PointXY, p2: PointXY, id: &mut u64| {
        let length = ((p2.x - p1.x).powi(2) + (p2.y - p1.y).powi(2)).sqrt();
        if length < 10.0 {
            return None;
        }
        let mut obj = GeometryObject::new(ObjectKind::Polywall);
        obj.id = Some(*id);
        *id += 1;
        obj.category = Some("walls".into());
        obj.floor = Some(0);
        obj.color = Some("#2a3540".into());
        obj.points = Some(vec![p1, p2]);
        obj.x = Some(p1.x);
        obj.y = Some(p1.y);
        obj.thickness = Some(wall_thickness);
        obj.height = Some(wall_height);
        obj.closed = Some(false);
        obj.label = Some(String::new());
        Some(obj)
    };

    for ((y, sign), segments) in h_lines {
        let py = y as f64 * tile_size - map_center_y + offset_y + sign as f64 * wall_offset;
        for (x1, x2) in merge_runs(segments) {
            let px1 = x1 as f64 * tile_size - map_center_x + offset_x;
            let px2 = x2 as f64 * tile_size - map_center_x + offset_x;
            if let Some(wall) = push_wall(PointXY::new(px1, py), PointXY::new(px2, py), &mut wall_id) {
                walls.push(wall);
            }
        }
    }
    for ((x, sign), segments) in v_lines {
        let px = x as f64 * tile_size - map_center_x + offset_x + sign as f64 * wall_offset;
        for (y1, y2) in merge_runs(segments) {
            let py1 = y1 as f64 * tile_size - map_center_y + offset_y;
            let py2 = y2 as f64 * tile_size - map_center_y + offset_y;
            if let Some(wall) = push_wall(PointXY::new(px, py1), PointXY::new(px, py2), &mut wall_id) {
                walls.push(wall);
            }
        }
    }

    tracing::debug!(count = walls.len(), "generated perimeter walls");
    walls
}

/// Fill tiles that are walkable on the tile map but not covered by any
/// polyfloor with raised rectangular blocks, greedily meshed row-first.
pub fn fill_polyfloor_gaps(
    objects: &[GeometryObject],
    grid: &TileGrid,
    scale_factor: f64,
    offset_x: f64,
    offset_y: f64,
    wall_height: f64,
) -> Vec<GeometryObject> {
    let size = grid.size();
    let tile_size = 32.0 * scale_factor;
    let map_center = size as f64 * tile_size / 2.0;

    let covered = compute_polyfloor_coverage(objects, size, scale_factor, offset_x, offset_y);

    let mut gaps = Mask::new(size, size);
    for (y, x, tile) in grid.iter_cells() {
        if tile != crate::grid::Tile::Void && !covered.get(y as usize, x as usize) {
            gaps.set(y as usize, x as usize, true);
        }
    }

    if gaps.count() == 0 {
        tracing::debug!("no gaps between polyfloors");
        return Vec::new();
    }

    // Greedy meshing: grow a run horizontally, then extend it down while
    // every row below matches the full x range.
    let mut processed = Mask::new(size, size);
    let mut rectangles = Vec::new();
    for y in 0..size {
        let mut x = 0;
        while x < size {
            if !gaps.get(y, x) || processed.get(y, x) {
                x += 1;
                continue;
            }
            let x_start = x;
            while x < size && gaps.get(y, x) && !processed.get(y, x) {
                x += 1;
            }
            let x_end = x;

            let mut y_end = y + 1;
            'grow: while y_end < size {
                for tx in x_start..x_end {
                    if !gaps.get(y_end, tx) || processed.get(y_end, tx) {
                        break 'grow;
                    }
                }
                y_end += 1;
            }

            for ty in y..y_end {
                for tx in x_start..x_end {
                    processed.set(ty, tx, true);
                }
            }
            rectangles.push((x_start, y, x_end, y_end));
        }
    }

    let mut walls = Vec::new();
    let mut wall_id = GAP_FILL_ID_BASE;
    for (x_min, y_min, x_max, y_max) in rectangles {
        let px1 = x_min as f64 * tile_size - map_center + offset_x;
        let py1 = y_min as f64 * tile_size - map_center + offset_y;
        let px2 = x_max as f64 * tile_size - map_center + offset_x;
        let py2 = y_max as f64 * tile_size - map_center + offset_y;

        let mut obj = GeometryObject::new(ObjectKind::Polyfloor);
        obj.id = Some(wall_id);
        wall_id += 1;
        obj.category = Some("floors".into());
        obj.floor = Some(0);
        obj.color = Some("#2a3540".into());
        obj.points = Some(vec![
            PointXY::new(px1, py1),
            PointXY::new(px2, py1),
            PointXY::new(px2, py2),
            PointXY::new(px1, py2),
        ]);
        obj.x = Some(px1);
        obj.y = Some(py1);
        obj.floor_height = Some(wall_height / 32.0);
        obj.label = Some(String::new());
        walls.push(obj);
    }

    tracing::debug!(count = walls.len(), "generated gap-fill blocks");
    walls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use proptest::prelude::*;

    #[test]
    fn test_merge_runs_coalesces_adjacent() {
        assert_eq!(merge_runs(vec![(2, 3), (0, 1), (1, 2), (5, 6)]), vec![(0, 3), (5, 6)]);
    }

    proptest! {
        #[test]
        fn merge_runs_ignores_input_order(
            mut segments in proptest::collection::vec(
                (0i32..60).prop_map(|s| (s, s + 1)),
                1..40,
            )
        ) {
            let forward = merge_runs(segments.clone());
            segments.reverse();
            prop_assert_eq!(merge_runs(segments), forward);
        }
    }

    #[test]
    fn test_square_mask_produces_four_walls() {
        let mut mask = Mask::new(20, 20);
        for y in 5..15 {
            for x in 5..15 {
                mask.set(y, x, true);
            }
        }
        let walls = generate_perimeter_walls(&mask, 1.0, 0.0, 0.0, 32.0, 128.0);
        assert_eq!(walls.len(), 4);
        // Offsets push walls away from the floor
        let top = &walls[0];
        let pts = top.points();
        assert_eq!(pts[0].y, pts[1].y);
    }

    #[test]
    fn test_wall_ids_start_at_base() {
        let mut mask = Mask::new(20, 20);
        for y in 5..15 {
            for x in 5..15 {
                mask.set(y, x, true);
            }
        }
        let walls = generate_perimeter_walls(&mask, 1.0, 0.0, 0.0, 32.0, 128.0);
        assert_eq!(walls[0].id, Some(90_000));
    }

    #[test]
    fn test_gap_fill_covers_uncovered_walkable() {
        // Single walkable tile, no polyfloors at all: the whole tile is a gap
        let mut grid = TileGrid::new(10);
        grid.set(4, 4, Tile::Floor);
        grid.set(4, 5, Tile::Floor);
        let blocks = fill_polyfloor_gaps(&[], &grid, 1.0, 0.0, 0.0, 128.0);
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.kind, ObjectKind::Polyfloor);
        assert_eq!(block.floor_height, Some(4.0));
        assert_eq!(block.points().len(), 4);
    }
}
