//! Carving operations on the tile grid
//!
//! These mirror the hand-carving a level designer would do: stamp a
//! rectangular room, run a corridor between two room centers with bend
//! constraints, scatter cover, stamp walls around the walkable area, and
//! cull anything the spawns cannot reach.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashSet, VecDeque};

use crate::core::types::GridPos;
use crate::grid::room::{Room, RoomTable};
use crate::grid::tile::{Tile, TileGrid};

/// Stamp a rectangular floor room and record it under `name`.
///
/// The top-left corner is clamped two tiles inside the grid edge. When a
/// marker tile is given, a 5x5 patch of it is stamped at the room center.
pub fn create_room(
    grid: &mut TileGrid,
    rooms: &mut RoomTable,
    name: &str,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    marker: Option<Tile>,
) {
    let s = grid.size() as i32;
    let x = x.min(s - w - 2).max(2);
    let y = y.min(s - h - 2).max(2);
    rooms.insert(name, Room::new(x, y, w, h));

    for dy in 0..h {
        for dx in 0..w {
            grid.set(y + dy, x + dx, Tile::Floor);
        }
    }

    if let Some(marker) = marker {
        let (cy, cx) = (y + h / 2, x + w / 2);
        for dy in -2..=2 {
            for dx in -2..=2 {
                grid.set(cy + dy, cx + dx, marker);
            }
        }
    }
}

/// Connect two rooms with an orthogonal corridor, carving floor only onto
/// void cells.
///
/// Shape depends on the center-to-center axis distances against
/// `max_straight`: both long gives an S (two perpendicular jogs), one long
/// gives a Z (one jog of 5-12 tiles to a random side), otherwise a plain L.
pub fn connect_rooms(
    grid: &mut TileGrid,
    rooms: &RoomTable,
    rng: &mut ChaCha8Rng,
    name1: &str,
    name2: &str,
    width: i32,
    max_straight: i32,
) {
    let (Some(r1), Some(r2)) = (rooms.get(name1), rooms.get(name2)) else {
        return;
    };
    let (cy1, cx1) = r1.center();
    let (cy2, cx2) = r2.center();
    let half = width / 2;
    let s = grid.size() as i32;

    let dist_x = (cx2 - cx1).abs();
    let dist_y = (cy2 - cy1).abs();

    if dist_x > max_straight && dist_y > max_straight {
        // S shape: vertical, horizontal, vertical, horizontal, vertical
        let mid_x = (cx1 + cx2) / 2 + rng.gen_range(-5..6);
        let mid_y1 = cy1 + (cy2 - cy1) / 3 + rng.gen_range(-3..4);
        let mid_y2 = cy1 + (cy2 - cy1) * 2 / 3 + rng.gen_range(-3..4);

        carve_vertical(grid, cx1, cy1, mid_y1, half);
        carve_horizontal(grid, mid_y1, cx1, mid_x, half);
        carve_vertical(grid, mid_x, mid_y1, mid_y2, half);
        carve_horizontal(grid, mid_y2, mid_x, cx2, half);
        carve_vertical(grid, cx2, mid_y2, cy2, half);
    } else if dist_x > max_straight {
        // Z shape: long horizontal broken by a vertical jog
        let mid_x = (cx1 + cx2) / 2 + rng.gen_range(-8..9);
        let offset_y = rng.gen_range(5..12) * if rng.gen::<f64>() < 0.5 { 1 } else { -1 };
        let mid_y = (cy1 + offset_y).clamp(half + 1, s - half - 2);

        carve_horizontal(grid, cy1, cx1, mid_x, half);
        carve_vertical(grid, mid_x, cy1, mid_y, half);
        carve_horizontal(grid, mid_y, mid_x, cx2, half);
        carve_vertical(grid, cx2, mid_y, cy2, half);
    } else if dist_y > max_straight {
        // Z shape: long vertical broken by a horizontal jog
        let mid_y = (cy1 + cy2) / 2 + rng.gen_range(-8..9);
        let offset_x = rng.gen_range(5..12) * if rng.gen::<f64>() < 0.5 { 1 } else { -1 };
        let mid_x = (cx1 + offset_x).clamp(half + 1, s - half - 2);

        carve_vertical(grid, cx1, cy1, mid_y, half);
        carve_horizontal(grid, mid_y, cx1, mid_x, half);
        carve_vertical(grid, mid_x, mid_y, cy2, half);
        carve_horizontal(grid, cy2, mid_x, cx2, half);
    } else {
        // L shape
        carve_horizontal(grid, cy1, cx1, cx2, half);
        carve_vertical(grid, cx2, cy1, cy2, half);
    }
}

fn carve_horizontal(grid: &mut TileGrid, y: i32, x0: i32, x1: i32, half: i32) {
    for x in x0.min(x1)..=x0.max(x1) {
        for dy in -half..=half {
            grid.carve(y + dy, x, Tile::Floor);
        }
    }
}

fn carve_vertical(grid: &mut TileGrid, x: i32, y0: i32, y1: i32, half: i32) {
    for y in y0.min(y1)..=y0.max(y1) {
        for dx in -half..=half {
            grid.carve(y, x + dx, Tile::Floor);
        }
    }
}

/// Scatter cover props over room floors.
///
/// Sites get the most cover, corridor-like rooms (MID/LONG/TUNNEL/MAIN)
/// a little, everything else a sprinkle. Rooms 6 tiles or thinner are
/// skipped.
pub fn add_random_covers(grid: &mut TileGrid, rooms: &RoomTable, rng: &mut ChaCha8Rng) {
    const COVERS: [Tile; 3] = [Tile::CoverHalf, Tile::CoverFull, Tile::Box];

    for (name, room) in rooms.iter() {
        let upper = name.to_uppercase();
        let count = if upper.contains("SITE") {
            rng.gen_range(4..8)
        } else if ["MID", "LONG", "TUNNEL", "MAIN"].iter().any(|k| upper.contains(k)) {
            rng.gen_range(1..4)
        } else {
            rng.gen_range(0..3)
        };

        for _ in 0..count {
            if room.h <= 6 || room.w <= 6 {
                continue;
            }
            let y = room.y + rng.gen_range(3..room.h - 3);
            let x = room.x + rng.gen_range(3..room.w - 3);
            if grid.get(y, x) == Tile::Floor {
                let tile = COVERS[rng.gen_range(0..COVERS.len())];
                grid.set(y, x, tile);
            }
        }
    }
}

/// Stamp walls on every void cell that touches a walkable cell in its
/// 8-neighborhood.
pub fn mark_walls(grid: &mut TileGrid) {
    let s = grid.size() as i32;
    let mut walls = Vec::new();
    for y in 0..s {
        for x in 0..s {
            if grid.get(y, x) != Tile::Void {
                continue;
            }
            'neighbors: for dy in -1..=1 {
                for dx in -1..=1 {
                    if grid.in_bounds(y + dy, x + dx) && grid.get(y + dy, x + dx).is_walkable() {
                        walls.push((y, x));
                        break 'neighbors;
                    }
                }
            }
        }
    }
    for (y, x) in walls {
        grid.set(y, x, Tile::Wall);
    }
}

/// Flood-fill from the spawn room centers and void out every walkable
/// tile the fill never reaches. Returns the number of tiles removed.
pub fn remove_isolated_areas(grid: &mut TileGrid, rooms: &RoomTable) -> usize {
    let s = grid.size() as i32;

    let mut starts: Vec<GridPos> = Vec::new();
    for name in ["ATK_SPAWN", "DEF_SPAWN"] {
        if let Some(room) = rooms.get(name) {
            let (cy, cx) = room.center();
            if grid.in_bounds(cy, cx) {
                starts.push(GridPos::new(cy, cx));
            }
        }
    }
    if starts.is_empty() {
        // No spawns: seed from the first walkable tile in scan order
        'scan: for y in 0..s {
            for x in 0..s {
                if grid.get(y, x).is_walkable() {
                    starts.push(GridPos::new(y, x));
                    break 'scan;
                }
            }
        }
    }
    if starts.is_empty() {
        return 0;
    }

    let mut reachable = HashSet::new();
    let mut queue: VecDeque<GridPos> = starts.into();
    while let Some(pos) = queue.pop_front() {
        if reachable.contains(&pos)
            || !grid.in_bounds(pos.row, pos.col)
            || !grid.get(pos.row, pos.col).is_walkable()
        {
            continue;
        }
        reachable.insert(pos);
        for next in pos.neighbors4() {
            if !reachable.contains(&next) {
                queue.push_back(next);
            }
        }
    }

    let mut removed = 0;
    for y in 0..s {
        for x in 0..s {
            if grid.get(y, x).is_walkable() && !reachable.contains(&GridPos::new(y, x)) {
                grid.set(y, x, Tile::Void);
                removed += 1;
            }
        }
    }
    if removed > 0 {
        tracing::debug!(removed, "removed isolated tiles");
    }
    removed
}

/// BFS over route tiles from `start`, succeeding as soon as the fill gets
/// within Chebyshev distance 8 of `goal`.
pub fn route_exists(grid: &TileGrid, start: GridPos, goal: GridPos) -> bool {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(start);
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        if pos.chebyshev(&goal) <= 8 {
            return true;
        }
        for next in pos.neighbors4() {
            if grid.in_bounds(next.row, next.col)
                && grid.get(next.row, next.col).is_route()
                && seen.insert(next)
            {
                queue.push_back(next);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_create_room_clamps_to_edge_margin() {
        let mut grid = TileGrid::new(50);
        let mut rooms = RoomTable::new();
        create_room(&mut grid, &mut rooms, "EDGE", -10, 100, 10, 10, None);
        let room = rooms.get("EDGE").unwrap();
        assert_eq!(room.x, 2);
        assert_eq!(room.y, 38);
    }

    #[test]
    fn test_create_room_stamps_marker() {
        let mut grid = TileGrid::new(50);
        let mut rooms = RoomTable::new();
        create_room(&mut grid, &mut rooms, "A_SITE", 10, 10, 20, 20, Some(Tile::SiteA));
        // 5x5 marker centered on the room center
        assert_eq!(grid.get(20, 20), Tile::SiteA);
        assert_eq!(grid.get(18, 18), Tile::SiteA);
        assert_eq!(grid.get(17, 18), Tile::Floor);
        assert_eq!(grid.count(Tile::SiteA), 25);
    }

    #[test]
    fn test_l_corridor_connects_rooms() {
        let mut grid = TileGrid::new(60);
        let mut rooms = RoomTable::new();
        let mut rng = rng();
        create_room(&mut grid, &mut rooms, "A", 5, 5, 8, 8, None);
        create_room(&mut grid, &mut rooms, "B", 15, 15, 8, 8, None);
        connect_rooms(&mut grid, &rooms, &mut rng, "A", "B", 4, 15);
        let (ay, ax) = rooms.get("A").unwrap().center();
        let (by, bx) = rooms.get("B").unwrap().center();
        assert!(route_exists(&grid, GridPos::new(ay, ax), GridPos::new(by, bx)));
    }

    #[test]
    fn test_long_corridor_bends() {
        // Axis distance above max_straight forces a jog, so the corridor
        // cannot be a single straight band.
        let mut grid = TileGrid::new(150);
        let mut rooms = RoomTable::new();
        let mut rng = rng();
        create_room(&mut grid, &mut rooms, "A", 10, 70, 8, 8, None);
        create_room(&mut grid, &mut rooms, "B", 120, 70, 8, 8, None);
        connect_rooms(&mut grid, &rooms, &mut rng, "A", "B", 4, 15);
        let (ay, ax) = rooms.get("A").unwrap().center();
        let (by, bx) = rooms.get("B").unwrap().center();
        assert!(route_exists(&grid, GridPos::new(ay, ax), GridPos::new(by, bx)));
        // Floor outside the straight band between the rooms proves the jog.
        let band: Vec<i32> = (0..150)
            .filter(|&y| (0..150).any(|x| grid.get(y, x) == Tile::Floor))
            .collect();
        let span = band.iter().max().unwrap() - band.iter().min().unwrap();
        assert!(span > 10, "corridor stayed in a straight band (span {span})");
    }

    #[test]
    fn test_connect_missing_room_is_noop() {
        let mut grid = TileGrid::new(30);
        let mut rooms = RoomTable::new();
        let mut rng = rng();
        create_room(&mut grid, &mut rooms, "A", 5, 5, 6, 6, None);
        let before = grid.count(Tile::Floor);
        connect_rooms(&mut grid, &rooms, &mut rng, "A", "GHOST", 4, 15);
        assert_eq!(grid.count(Tile::Floor), before);
    }

    #[test]
    fn test_mark_walls_rings_floor() {
        let mut grid = TileGrid::new(20);
        let mut rooms = RoomTable::new();
        create_room(&mut grid, &mut rooms, "A", 8, 8, 4, 4, None);
        mark_walls(&mut grid);
        assert_eq!(grid.get(7, 7), Tile::Wall);
        assert_eq!(grid.get(12, 12), Tile::Wall);
        assert_eq!(grid.get(5, 5), Tile::Void);
        assert_eq!(grid.get(9, 9), Tile::Floor);
    }

    #[test]
    fn test_remove_isolated_keeps_spawn_component() {
        let mut grid = TileGrid::new(80);
        let mut rooms = RoomTable::new();
        create_room(&mut grid, &mut rooms, "ATK_SPAWN", 5, 5, 10, 10, Some(Tile::SpawnAttack));
        create_room(&mut grid, &mut rooms, "ORPHAN", 60, 60, 10, 10, None);
        let removed = remove_isolated_areas(&mut grid, &rooms);
        assert_eq!(removed, 100);
        assert_eq!(grid.get(65, 65), Tile::Void);
        assert_eq!(grid.get(6, 6), Tile::Floor);
    }
}
