//! Organic voronoi layout
//!
//! Seeds the grid with key points (spawns, sites, mid, and a handful of
//! randomly scattered support rooms), partitions it with a noise-perturbed
//! Voronoi diagram, grows an irregular room inside each cell from its seed,
//! then links the rooms with a mix of thick Bresenham diagonals and bent
//! orthogonal corridors. Boundary noise roughens the edges afterwards, and
//! a final flood fill stitches any stranded floor back to the main body.
//!
//! Unlike the rule-driven strategy this one places no marker tiles and no
//! walls; the converter keys markers off room names alone.

use std::collections::{BTreeSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::grid::{Room, RoomTable, Tile, TileGrid};
use crate::rules::DesignRules;

const MARGIN: i32 = 15;

/// Support rooms scattered around the five fixed seeds.
const EXTRA_ROOMS: [&str; 10] = [
    "A_MAIN",
    "A_LOBBY",
    "A_HEAVEN",
    "B_MAIN",
    "B_LOBBY",
    "B_HEAVEN",
    "MID_TOP",
    "MID_BOTTOM",
    "A_CONNECTOR",
    "B_CONNECTOR",
];

const CONNECTIONS: [(&str, &str); 16] = [
    ("ATK_SPAWN", "A_LOBBY"),
    ("ATK_SPAWN", "B_LOBBY"),
    ("ATK_SPAWN", "MID_BOTTOM"),
    ("MID_BOTTOM", "MID"),
    ("MID", "MID_TOP"),
    ("A_LOBBY", "A_MAIN"),
    ("A_MAIN", "A_SITE"),
    ("MID", "A_CONNECTOR"),
    ("A_CONNECTOR", "A_SITE"),
    ("B_LOBBY", "B_MAIN"),
    ("B_MAIN", "B_SITE"),
    ("MID", "B_CONNECTOR"),
    ("B_CONNECTOR", "B_SITE"),
    ("DEF_SPAWN", "A_SITE"),
    ("DEF_SPAWN", "B_SITE"),
    ("DEF_SPAWN", "MID_TOP"),
];

/// Seed points in placement order, (y, x).
type KeyPoints = Vec<(String, (i32, i32))>;

/// Room centers are the Voronoi seeds, not bounding-box centers; corridors
/// aim at the seed so they always hit grown floor.
struct Centers(Vec<(String, (i32, i32))>);

impl Centers {
    fn get(&self, name: &str) -> Option<(i32, i32)> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, c)| *c)
    }
}

pub fn generate(rng: &mut ChaCha8Rng, rules: &DesignRules, size: usize) -> (TileGrid, RoomTable) {
    let s = size as i32;
    let mut grid = TileGrid::new(size);
    let mut rooms = RoomTable::new();

    let key_points = place_key_points(rng, s);
    let regions = voronoi_regions(rng, rules, s, &key_points);
    let centers = create_organic_rooms(&mut grid, &mut rooms, rng, rules, &key_points, regions, s);
    connect_organic(&mut grid, rng, rules, &rooms, &centers, s);
    add_loops_and_flanks(&mut grid, rng, rules, &rooms, &centers, s);
    apply_boundary_noise(&mut grid, rng, rules, s);
    validate_connectivity(&mut grid, rng, s);

    (grid, rooms)
}

fn place_key_points(rng: &mut ChaCha8Rng, s: i32) -> KeyPoints {
    let mut points: KeyPoints = vec![
        ("ATK_SPAWN".into(), (s - MARGIN - 10, s / 2)),
        ("DEF_SPAWN".into(), (MARGIN + 10, s / 2)),
        ("A_SITE".into(), (MARGIN + 25, s - MARGIN - 30)),
        ("B_SITE".into(), (MARGIN + 25, MARGIN + 30)),
        ("MID".into(), (s / 2, s / 2)),
    ];

    for name in EXTRA_ROOMS {
        for _ in 0..50 {
            let y = rng.gen_range(MARGIN + 10..s - MARGIN - 10);
            let x = rng.gen_range(MARGIN + 10..s - MARGIN - 10);
            let min_dist = points
                .iter()
                .map(|(_, (py, px))| (((y - py).pow(2) + (x - px).pow(2)) as f64).sqrt())
                .fold(f64::INFINITY, f64::min);
            if min_dist > 20.0 {
                points.push((name.into(), (y, x)));
                break;
            }
        }
    }

    points
}

/// Assign every cell to its cheapest seed. Distance is Manhattan with a
/// Euclidean admixture so cell walls bow instead of staying axis-aligned,
/// plus per-candidate noise scaled by the organic level.
fn voronoi_regions(
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    s: i32,
    points: &KeyPoints,
) -> Vec<BTreeSet<(i32, i32)>> {
    let organic_level = rules.scalar("organic_level");
    let mut regions: Vec<BTreeSet<(i32, i32)>> = vec![BTreeSet::new(); points.len()];

    for y in 0..s {
        for x in 0..s {
            let mut min_dist = f64::INFINITY;
            let mut closest = None;
            for (i, (_, (py, px))) in points.iter().enumerate() {
                let manhattan = ((y - py).abs() + (x - px).abs()) as f64;
                let euclid = (((y - py).pow(2) + (x - px).pow(2)) as f64).sqrt();
                let noise = rng.gen::<f64>() * 5.0 * organic_level;
                let dist = manhattan + 0.3 * euclid + noise;
                if dist < min_dist {
                    min_dist = dist;
                    closest = Some(i);
                }
            }
            if let Some(i) = closest {
                regions[i].insert((y, x));
            }
        }
    }

    regions
}

fn create_organic_rooms(
    grid: &mut TileGrid,
    rooms: &mut RoomTable,
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    key_points: &KeyPoints,
    regions: Vec<BTreeSet<(i32, i32)>>,
    s: i32,
) -> Centers {
    let mut centers = Vec::new();

    for ((name, (cy, cx)), available) in key_points.iter().zip(regions) {
        if available.is_empty() {
            continue;
        }

        let size_key = if name.contains("SITE") {
            "site_size"
        } else if name.contains("SPAWN") {
            "spawn_size"
        } else {
            "room_size"
        };
        let target_size = rules.draw_int(rng, size_key) as usize;

        let tiles = grow_organic_room(rng, rules, &available, *cy, *cx, target_size);
        for &(ty, tx) in &tiles {
            if ty >= 0 && ty < s && tx >= 0 && tx < s {
                grid.set(ty, tx, Tile::Floor);
            }
        }

        if !tiles.is_empty() {
            let min_x = tiles.iter().map(|t| t.1).min().unwrap();
            let max_x = tiles.iter().map(|t| t.1).max().unwrap();
            let min_y = tiles.iter().map(|t| t.0).min().unwrap();
            let max_y = tiles.iter().map(|t| t.0).max().unwrap();
            rooms.insert(name, Room::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1));
            centers.push((name.clone(), (*cy, *cx)));
        }
    }

    Centers(centers)
}

/// Frontier growth from the seed. Popping a random frontier entry instead
/// of the oldest one is what makes the room lobed rather than round.
fn grow_organic_room(
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    available: &BTreeSet<(i32, i32)>,
    center_y: i32,
    center_x: i32,
    target_size: usize,
) -> BTreeSet<(i32, i32)> {
    let (center_y, center_x) = if available.contains(&(center_y, center_x)) {
        (center_y, center_x)
    } else {
        match available
            .iter()
            .min_by_key(|(ty, tx)| (ty - center_y).abs() + (tx - center_x).abs())
        {
            Some(&(ty, tx)) => (ty, tx),
            None => return BTreeSet::new(),
        }
    };

    let irregularity = rules.scalar("room_irregularity");
    let mut room = BTreeSet::from([(center_y, center_x)]);
    let mut frontier = vec![(center_y, center_x)];

    while room.len() < target_size && !frontier.is_empty() {
        let idx = if rng.gen::<f64>() < irregularity {
            rng.gen_range(0..frontier.len())
        } else {
            0
        };
        let (cy, cx) = frontier.remove(idx);

        let mut neighbors = [
            (cy - 1, cx),
            (cy + 1, cx),
            (cy, cx - 1),
            (cy, cx + 1),
            (cy - 1, cx - 1),
            (cy - 1, cx + 1),
            (cy + 1, cx - 1),
            (cy + 1, cx + 1),
        ];
        neighbors.shuffle(rng);

        for (ny, nx) in neighbors {
            if available.contains(&(ny, nx)) && !room.contains(&(ny, nx)) {
                room.insert((ny, nx));
                frontier.push((ny, nx));
                if room.len() >= target_size {
                    break;
                }
            }
        }
    }

    room
}

fn connect_organic(
    grid: &mut TileGrid,
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    rooms: &RoomTable,
    centers: &Centers,
    s: i32,
) {
    let diagonal_ratio = rules.scalar("diagonal_ratio");

    for (room1, room2) in CONNECTIONS {
        if !rooms.contains(room1) || !rooms.contains(room2) {
            continue;
        }
        let (Some(c1), Some(c2)) = (centers.get(room1), centers.get(room2)) else { continue };

        if rng.gen::<f64>() < diagonal_ratio {
            draw_diagonal_corridor(grid, rng, rules, c1, c2, s);
        } else {
            draw_organic_corridor(grid, rng, rules, c1, c2, s);
        }
    }
}

/// Cross-section offsets for a corridor of the given width: odd widths
/// hang one tile further toward negative offsets.
fn width_span(width: i32) -> std::ops::RangeInclusive<i32> {
    (-width).div_euclid(2)..=width / 2
}

/// Thick interpolated line between two centers, floor laid unconditionally.
fn draw_diagonal_corridor(
    grid: &mut TileGrid,
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    (y1, x1): (i32, i32),
    (y2, x2): (i32, i32),
    s: i32,
) {
    let min_w = rules.scalar("corridor_min_width") as i32;
    let max_w = rules.scalar("corridor_max_width") as i32;
    let width = if max_w > min_w { rng.gen_range(min_w..max_w) } else { min_w };

    let steps = (y2 - y1).abs().max((x2 - x1).abs());
    if steps == 0 {
        return;
    }

    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let cy = (y1 as f64 + t * (y2 - y1) as f64) as i32;
        let cx = (x1 as f64 + t * (x2 - x1) as f64) as i32;
        for wy in width_span(width) {
            for wx in width_span(width) {
                let (ny, nx) = (cy + wy, cx + wx);
                if ny >= 0 && ny < s && nx >= 0 && nx < s {
                    grid.set(ny, nx, Tile::Floor);
                }
            }
        }
    }
}

/// Bent corridor: long routes get one or two jittered midpoints, each leg
/// drawn as an L with a randomly chosen elbow.
fn draw_organic_corridor(
    grid: &mut TileGrid,
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    (y1, x1): (i32, i32),
    (y2, x2): (i32, i32),
    s: i32,
) {
    let min_w = rules.scalar("corridor_min_width") as i32;
    let max_w = rules.scalar("corridor_max_width") as i32;
    let width = if max_w > min_w { rng.gen_range(min_w..max_w) } else { min_w };
    let max_straight = rules.scalar("max_straight_corridor") as i32;

    let dist = (y2 - y1).abs() + (x2 - x1).abs();
    if dist > max_straight {
        let num_midpoints = 1 + i32::from(dist > max_straight * 2);
        let mut points = vec![(y1, x1)];
        for i in 0..num_midpoints {
            let t = (i + 1) as f64 / (num_midpoints + 1) as f64;
            let mut my = (y1 as f64 + t * (y2 - y1) as f64) as i32;
            let mut mx = (x1 as f64 + t * (x2 - x1) as f64) as i32;

            let offset = rng.gen_range(-15..16);
            if (y2 - y1).abs() > (x2 - x1).abs() {
                mx += offset;
            } else {
                my += offset;
            }
            points.push((my.clamp(5, s - 5), mx.clamp(5, s - 5)));
        }
        points.push((y2, x2));

        for pair in points.windows(2) {
            draw_corridor_segment(grid, rng, pair[0], pair[1], width, s);
        }
    } else {
        draw_corridor_segment(grid, rng, (y1, x1), (y2, x2), width, s);
    }
}

fn draw_corridor_segment(
    grid: &mut TileGrid,
    rng: &mut ChaCha8Rng,
    (y1, x1): (i32, i32),
    (y2, x2): (i32, i32),
    width: i32,
    s: i32,
) {
    let mid = if rng.gen::<f64>() < 0.5 { (y1, x2) } else { (y2, x1) };

    let mut set = |y: i32, x: i32| {
        if y >= 0 && y < s && x >= 0 && x < s {
            grid.set(y, x, Tile::Floor);
        }
    };

    for y in y1.min(mid.0)..=y1.max(mid.0) {
        for w in width_span(width) {
            set(y, x1 + w);
        }
    }
    for x in x1.min(mid.1)..=x1.max(mid.1) {
        for w in width_span(width) {
            set(y1 + w, x);
        }
    }
    for y in mid.0.min(y2)..=mid.0.max(y2) {
        for w in width_span(width) {
            set(y, mid.1 + w);
        }
    }
    for x in mid.1.min(x2)..=mid.1.max(x2) {
        for w in width_span(width) {
            set(mid.0 + w, x);
        }
    }
}

/// Loops connect random room pairs; flanks connect each main to its heaven.
/// Both use thick diagonals so they read as distinct cut-throughs.
fn add_loops_and_flanks(
    grid: &mut TileGrid,
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    rooms: &RoomTable,
    centers: &Centers,
    s: i32,
) {
    let loop_count = rules.scalar("loop_count") as usize;
    let flank_count = rules.scalar("flank_routes") as usize;

    let room_names: Vec<&str> = rooms.iter().map(|(name, _)| name).collect();

    for _ in 0..loop_count {
        if room_names.len() < 2 {
            break;
        }
        let i = rng.gen_range(0..room_names.len());
        let mut j = rng.gen_range(0..room_names.len());
        while j == i {
            j = rng.gen_range(0..room_names.len());
        }
        let (Some(c1), Some(c2)) = (centers.get(room_names[i]), centers.get(room_names[j])) else {
            continue;
        };
        draw_diagonal_corridor(grid, rng, rules, c1, c2, s);
    }

    let flank_pairs = [("A_MAIN", "A_HEAVEN"), ("B_MAIN", "B_HEAVEN")];
    for (r1, r2) in flank_pairs.iter().take(flank_count) {
        if rooms.contains(r1) && rooms.contains(r2) {
            let (Some(c1), Some(c2)) = (centers.get(r1), centers.get(r2)) else { continue };
            draw_diagonal_corridor(grid, rng, rules, c1, c2, s);
        }
    }
}

/// Roughen the floor/void boundary: eat some edge tiles, sprout diagonal
/// bumps off others.
fn apply_boundary_noise(grid: &mut TileGrid, rng: &mut ChaCha8Rng, rules: &DesignRules, s: i32) {
    let noise_level = rules.scalar("corner_noise");
    if noise_level <= 0.0 {
        return;
    }

    let mut boundary = Vec::new();
    for y in 1..s - 1 {
        for x in 1..s - 1 {
            if grid.get(y, x) == Tile::Floor {
                let exposed = [(y - 1, x), (y + 1, x), (y, x - 1), (y, x + 1)]
                    .iter()
                    .any(|&(ny, nx)| grid.get(ny, nx) == Tile::Void);
                if exposed {
                    boundary.push((y, x));
                }
            }
        }
    }

    for (y, x) in boundary {
        if rng.gen::<f64>() < noise_level * 0.3 {
            grid.set(y, x, Tile::Void);
        }
        if rng.gen::<f64>() < noise_level * 0.2 {
            let dy = if rng.gen::<bool>() { 1 } else { -1 };
            let dx = if rng.gen::<bool>() { 1 } else { -1 };
            let (ny, nx) = (y + dy, x + dx);
            if ny >= 0 && ny < s && nx >= 0 && nx < s && grid.get(ny, nx) == Tile::Void {
                grid.set(ny, nx, Tile::Floor);
            }
        }
    }
}

/// Flood fill from the lowest floor tile; every stranded tile gets an L
/// corridor back to its nearest reached tile.
fn validate_connectivity(grid: &mut TileGrid, rng: &mut ChaCha8Rng, s: i32) {
    let mut floor_tiles = BTreeSet::new();
    for (y, x, tile) in grid.iter_cells() {
        if tile == Tile::Floor {
            floor_tiles.insert((y, x));
        }
    }

    let Some(&start) = floor_tiles.iter().next() else { return };
    let mut visited = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some((cy, cx)) = queue.pop_front() {
        for (ny, nx) in [(cy - 1, cx), (cy + 1, cx), (cy, cx - 1), (cy, cx + 1)] {
            if floor_tiles.contains(&(ny, nx)) && visited.insert((ny, nx)) {
                queue.push_back((ny, nx));
            }
        }
    }

    let disconnected: Vec<(i32, i32)> = floor_tiles.difference(&visited).copied().collect();
    if !disconnected.is_empty() {
        tracing::debug!(count = disconnected.len(), "reconnecting stranded floor tiles");
    }
    for (dy, dx) in disconnected {
        let closest = visited
            .iter()
            .min_by_key(|(vy, vx)| (vy - dy).abs() + (vx - dx).abs())
            .copied();
        if let Some(closest) = closest {
            draw_corridor_segment(grid, rng, (dy, dx), closest, 4, s);
            visited.insert((dy, dx));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn run(seed: u64) -> (TileGrid, RoomTable) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let rules = DesignRules::organic();
        generate(&mut rng, &rules, 150)
    }

    #[test]
    fn test_core_rooms_present() {
        let (_, rooms) = run(42);
        for name in ["ATK_SPAWN", "DEF_SPAWN", "A_SITE", "B_SITE", "MID"] {
            assert!(rooms.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_no_markers_or_walls_placed() {
        let (grid, _) = run(42);
        for (_, _, tile) in grid.iter_cells() {
            assert!(matches!(tile, Tile::Void | Tile::Floor), "unexpected {tile:?}");
        }
    }

    #[test]
    fn test_floor_is_one_component() {
        let (grid, _) = run(7);
        let mut floor = BTreeSet::new();
        for (y, x, tile) in grid.iter_cells() {
            if tile == Tile::Floor {
                floor.insert((y, x));
            }
        }
        assert!(!floor.is_empty());

        let start = *floor.iter().next().unwrap();
        let mut visited = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some((cy, cx)) = queue.pop_front() {
            for (ny, nx) in [(cy - 1, cx), (cy + 1, cx), (cy, cx - 1), (cy, cx + 1)] {
                if floor.contains(&(ny, nx)) && visited.insert((ny, nx)) {
                    queue.push_back((ny, nx));
                }
            }
        }
        assert_eq!(visited.len(), floor.len(), "floor has disconnected islands");
    }

    #[test]
    fn test_same_seed_same_map() {
        let (grid_a, _) = run(99);
        let (grid_b, _) = run(99);
        for (y, x, tile) in grid_a.iter_cells() {
            assert_eq!(tile, grid_b.get(y, x), "tile mismatch at ({y}, {x})");
        }
    }

    #[test]
    fn test_width_span_matches_floor_division() {
        assert_eq!(width_span(4), -2..=2);
        assert_eq!(width_span(5), -3..=2);
    }
}
