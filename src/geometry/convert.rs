//! Tile map to editor objects
//!
//! Rooms and corridors become separate polygons whose boundaries meet
//! exactly on the tile lattice. Markers are emitted first, then room
//! polygons in priority order (sites claim their tiles before spawns,
//! chokes, and the rest), then whatever walkable area no room claimed is
//! grouped into corridor polygons.

use std::collections::VecDeque;

use crate::geometry::contour::{extract_contour, simplify_contour, split_long_corridor, TileSet};
use crate::geometry::object::{GeometryObject, ObjectKind, PointXY};
use crate::grid::{RoomTable, TileGrid};

pub struct LevelConverter<'a> {
    grid: &'a TileGrid,
    rooms: &'a RoomTable,
    scale: f64,
    size: i32,
    next_id: u64,
}

impl<'a> LevelConverter<'a> {
    pub fn new(grid: &'a TileGrid, rooms: &'a RoomTable, scale_factor: f64) -> Self {
        Self {
            grid: Self::fill_small_holes(grid),
            rooms,
            scale: 32.0 * scale_factor,
            size: grid.size() as i32,
            next_id: 1,
        }
    }

    /// Hole filling was retired but the hook stays in the pipeline.
    fn fill_small_holes(grid: &TileGrid) -> &TileGrid {
        grid
    }

    pub fn convert(&mut self) -> Vec<GeometryObject> {
        let mut objects = Vec::new();
        self.next_id = 1;
        self.add_markers(&mut objects);
        self.add_room_polygons(&mut objects);
        self.add_corridor_polygons(&mut objects);
        objects
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Tile coordinate to world coordinate, map center at the origin.
    fn to_world(&self, tile: i32) -> f64 {
        (tile as f64 - self.size as f64 / 2.0) * self.scale
    }

    fn add_markers(&mut self, objects: &mut Vec<GeometryObject>) {
        for (name, room) in self.rooms.iter() {
            let lower = name.to_lowercase();
            let wx = self.to_world(room.x);
            let wy = self.to_world(room.y);
            let w = room.w as f64 * self.scale;
            let h = room.h as f64 * self.scale;

            let mut obj = if lower.contains("atk") || lower.contains("off") {
                let mut o = GeometryObject::new(ObjectKind::SpawnOff);
                o.color = Some("#d63031".into());
                o.fixed_size = Some(true);
                o.label = Some("OFFENCE".into());
                o
            } else if lower.contains("def") {
                let mut o = GeometryObject::new(ObjectKind::SpawnDef);
                o.color = Some("#00b894".into());
                o.fixed_size = Some(true);
                o.label = Some("DEFENCE".into());
                o
            } else if lower.contains("site") {
                let mut o = GeometryObject::new(ObjectKind::Objective);
                o.color = Some("#ffe66d".into());
                o.min_size = Some(64.0);
                o.label = Some(name.to_uppercase().replace('_', " "));
                o
            } else {
                continue;
            };

            obj.id = Some(self.next_id());
            obj.category = Some("markers".into());
            obj.floor = Some(0);
            obj.x = Some(wx);
            obj.y = Some(wy);
            obj.width = Some(w);
            obj.height = Some(h);
            objects.push(obj);
        }
    }

    /// Open-floor tiles inside a room footprint, minus already-claimed ones.
    fn room_tiles(&self, room: &crate::grid::Room, claimed: Option<&TileSet>) -> TileSet {
        let mut tiles = TileSet::new();
        for y in room.y..(room.y + room.h).min(self.size) {
            for x in room.x..(room.x + room.w).min(self.size) {
                if y >= 0 && x >= 0 && self.grid.get(y, x).is_open_floor() {
                    if claimed.map_or(true, |c| !c.contains(&(y, x))) {
                        tiles.insert((y, x));
                    }
                }
            }
        }
        tiles
    }

    fn polygon_from_tiles(&mut self, tiles: &TileSet) -> Option<GeometryObject> {
        let contour = extract_contour(tiles);
        if contour.len() < 3 {
            return None;
        }
        let mut simplified = simplify_contour(&contour);
        if simplified.len() < 3 {
            simplified = contour;
        }

        let points: Vec<PointXY> = simplified
            .iter()
            .map(|&(ty, tx)| PointXY::with_z(self.to_world(tx), self.to_world(ty), 0.0))
            .collect();

        let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        let mut obj = GeometryObject::new(ObjectKind::Polyfloor);
        obj.id = Some(self.next_id());
        obj.category = Some("floors".into());
        obj.floor = Some(0);
        obj.points = Some(points);
        obj.x = Some(min_x);
        obj.y = Some(min_y);
        obj.width = Some(max_x - min_x);
        obj.height = Some(max_y - min_y);
        obj.floor_height = Some(0.0);
        obj.closed = Some(true);
        Some(obj)
    }

    fn add_room_polygons(&mut self, objects: &mut Vec<GeometryObject>) {
        // Sites claim tiles first, then spawns, then chokes, then the rest;
        // ties keep insertion order.
        let mut order: Vec<(u8, String)> = self
            .rooms
            .iter()
            .map(|(name, _)| {
                let upper = name.to_uppercase();
                let priority = if upper.contains("SITE") {
                    0
                } else if upper.contains("SPAWN") || upper.contains("ATK") || upper.contains("DEF") {
                    1
                } else if upper.contains("CHOKE") {
                    2
                } else {
                    3
                };
                (priority, name.to_string())
            })
            .collect();
        order.sort_by_key(|(priority, _)| *priority);

        let mut claimed = TileSet::new();
        for (_, name) in order {
            let room = *self.rooms.get(&name).unwrap();
            let tiles = self.room_tiles(&room, Some(&claimed));
            if tiles.len() < 4 {
                continue;
            }
            claimed.extend(tiles.iter().copied());

            if let Some(mut obj) = self.polygon_from_tiles(&tiles) {
                let lower = name.to_lowercase();
                obj.color = Some(
                    if lower.contains("site") {
                        "hsla(45, 50%, 40%, 0.7)"
                    } else if lower.contains("atk") {
                        "hsla(0, 40%, 35%, 0.7)"
                    } else if lower.contains("spawn") || lower.contains("def") {
                        "hsla(160, 40%, 35%, 0.7)"
                    } else {
                        "hsla(200, 50%, 35%, 0.7)"
                    }
                    .into(),
                );
                obj.label = Some(name.replace('_', " "));
                objects.push(obj);
            }
        }
    }

    fn add_corridor_polygons(&mut self, objects: &mut Vec<GeometryObject>) {
        // Everything walkable that no room footprint covers is corridor.
        let mut room_tiles = TileSet::new();
        for (_, room) in self.rooms.iter() {
            room_tiles.extend(self.room_tiles(room, None));
        }

        let mut corridor_tiles = TileSet::new();
        for (y, x, tile) in self.grid.iter_cells() {
            if tile.is_open_floor() && !room_tiles.contains(&(y, x)) {
                corridor_tiles.insert((y, x));
            }
        }

        let mut visited = TileSet::new();
        for &start in corridor_tiles.iter() {
            if visited.contains(&start) {
                continue;
            }

            // Connected component of corridor tiles, 4-connected.
            let mut region = TileSet::new();
            let mut queue = VecDeque::from([start]);
            while let Some((y, x)) = queue.pop_front() {
                if visited.contains(&(y, x)) || !corridor_tiles.contains(&(y, x)) {
                    continue;
                }
                visited.insert((y, x));
                region.insert((y, x));
                for (ny, nx) in [(y - 1, x), (y + 1, x), (y, x - 1), (y, x + 1)] {
                    if corridor_tiles.contains(&(ny, nx)) && !visited.contains(&(ny, nx)) {
                        queue.push_back((ny, nx));
                    }
                }
            }

            if region.len() < 4 {
                continue;
            }

            let sub_regions = if region.len() > 60 {
                split_long_corridor(&region)
            } else {
                vec![region]
            };

            for sub in sub_regions {
                if sub.len() < 4 {
                    continue;
                }
                if let Some(mut obj) = self.polygon_from_tiles(&sub) {
                    obj.color = Some("hsla(200, 40%, 30%, 0.7)".into());
                    obj.label = Some(String::new());
                    objects.push(obj);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ops::{connect_rooms, create_room};
    use crate::grid::{Room, Tile};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn simple_map() -> (TileGrid, RoomTable) {
        let mut grid = TileGrid::new(60);
        let mut rooms = RoomTable::new();
        create_room(&mut grid, &mut rooms, "A_SITE", 5, 5, 10, 10, Some(Tile::SiteA));
        create_room(&mut grid, &mut rooms, "ATK_SPAWN", 40, 40, 10, 10, Some(Tile::SpawnAttack));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        connect_rooms(&mut grid, &rooms, &mut rng, "A_SITE", "ATK_SPAWN", 4, 100);
        (grid, rooms)
    }

    #[test]
    fn test_markers_emitted_for_sites_and_spawns() {
        let (grid, rooms) = simple_map();
        let objects = LevelConverter::new(&grid, &rooms, 1.0).convert();
        let kinds: Vec<ObjectKind> = objects.iter().map(|o| o.kind).collect();
        assert!(kinds.contains(&ObjectKind::Objective));
        assert!(kinds.contains(&ObjectKind::SpawnOff));
        let site = objects.iter().find(|o| o.kind == ObjectKind::Objective).unwrap();
        assert_eq!(site.label.as_deref(), Some("A SITE"));
        assert_eq!(site.min_size, Some(64.0));
    }

    #[test]
    fn test_room_and_corridor_polygons_disjoint() {
        use crate::geometry::coverage::{compute_polyfloor_coverage, Mask};

        // Two rooms with overlapping footprints: whichever claims a tile
        // first keeps it, and every later polygon must exclude it
        let mut grid = TileGrid::new(40);
        let mut rooms = RoomTable::new();
        create_room(&mut grid, &mut rooms, "A_SITE", 5, 5, 12, 12, Some(Tile::SiteA));
        create_room(&mut grid, &mut rooms, "LONG_A", 10, 10, 12, 12, None);
        let objects = LevelConverter::new(&grid, &rooms, 1.0).convert();

        let floors: Vec<&GeometryObject> =
            objects.iter().filter(|o| o.kind == ObjectKind::Polyfloor).collect();
        assert_eq!(floors.len(), 2);

        // Rasterize each polygon back to tiles; no tile may land in two
        let mut seen = Mask::new(40, 40);
        for obj in floors {
            let mask = compute_polyfloor_coverage(std::slice::from_ref(obj), 40, 1.0, 0.0, 0.0);
            assert!(mask.count() > 0);
            for y in 0..40 {
                for x in 0..40 {
                    if mask.get(y, x) {
                        assert!(!seen.get(y, x), "tile ({y}, {x}) covered twice");
                        seen.set(y, x, true);
                    }
                }
            }
        }
        // The overlap region went to the site polygon, which claims first
        assert!(seen.get(12, 12));
    }

    #[test]
    fn test_convert_is_deterministic() {
        let (grid, rooms) = simple_map();
        let a = LevelConverter::new(&grid, &rooms, 1.0).convert();
        let b = LevelConverter::new(&grid, &rooms, 1.0).convert();
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn test_ids_sequential_from_one(){
        let (grid, rooms) = simple_map();
        let objects = LevelConverter::new(&grid, &rooms, 1.0).convert();
        let ids: Vec<u64> = objects.iter().filter_map(|o| o.id).collect();
        assert_eq!(ids, (1..=ids.len() as u64).collect::<Vec<_>>());
    }

    #[test]
    fn test_tiny_room_skipped() {
        let mut grid = TileGrid::new(40);
        let mut rooms = RoomTable::new();
        rooms.insert("DOT", Room::new(10, 10, 1, 1));
        grid.set(10, 10, Tile::Floor);
        let objects = LevelConverter::new(&grid, &rooms, 1.0).convert();
        assert!(objects.iter().all(|o| o.kind != ObjectKind::Polyfloor));
    }
}
