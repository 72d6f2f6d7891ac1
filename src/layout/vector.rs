//! Grid-free vector layout
//!
//! Skips the tile grid entirely: each room is a star polygon sampled
//! around a jittered anchor point, and corridors are quads (straight
//! diagonals) or eight-vertex bent strips drawn directly in meter space.
//! Output is already a finished object list; there is no tile conversion
//! or wall pass downstream of this strategy.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::geometry::object::{GeometryObject, ObjectKind, PointXY};
use crate::geometry::METER;
use crate::rules::DesignRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoomType {
    SpawnOff,
    SpawnDef,
    Objective,
    Room,
}

struct VectorRoom {
    name: String,
    /// Anchor in meters, (y, x).
    center: (f64, f64),
    vertices: Vec<(f64, f64)>,
    room_type: RoomType,
}

struct VectorCorridor {
    vertices: Vec<(f64, f64)>,
}

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
    ("DEF_SPAWN", "MID_TOP"),
    ("MID_TOP", "A_SITE"),
    ("MID_TOP", "B_SITE"),
];

pub fn generate(rng: &mut ChaCha8Rng, rules: &DesignRules) -> Vec<GeometryObject> {
    let size = rules.scalar("map_size");
    let mut rooms = place_key_points(rng, rules, size);
    create_organic_rooms(rng, rules, &mut rooms);
    let corridors = connect_rooms(rng, rules, &rooms);
    to_objects(&rooms, &corridors)
}

fn place_key_points(rng: &mut ChaCha8Rng, rules: &DesignRules, size: f64) -> Vec<VectorRoom> {
    let margin = 20.0;
    let table: [(&str, f64, f64, RoomType); 13] = [
        ("ATK_SPAWN", size - margin - 15.0, size / 2.0, RoomType::SpawnOff),
        ("DEF_SPAWN", margin + 15.0, size / 2.0, RoomType::SpawnDef),
        ("A_SITE", margin + 30.0, size - margin - 35.0, RoomType::Objective),
        ("B_SITE", margin + 30.0, margin + 35.0, RoomType::Objective),
        ("MID", size / 2.0, size / 2.0, RoomType::Room),
        ("MID_TOP", size / 3.0, size / 2.0, RoomType::Room),
        ("MID_BOTTOM", size * 2.0 / 3.0, size / 2.0, RoomType::Room),
        ("A_LOBBY", size - margin - 40.0, size - margin - 40.0, RoomType::Room),
        ("A_MAIN", size / 2.0 + 10.0, size - margin - 35.0, RoomType::Room),
        ("A_CONNECTOR", size / 3.0, size - margin - 45.0, RoomType::Room),
        ("B_LOBBY", size - margin - 40.0, margin + 40.0, RoomType::Room),
        ("B_MAIN", size / 2.0 + 10.0, margin + 35.0, RoomType::Room),
        ("B_CONNECTOR", size / 3.0, margin + 45.0, RoomType::Room),
    ];

    let noise = rules.scalar("vertex_noise") * 0.5;
    table
        .into_iter()
        .map(|(name, y, x, room_type)| VectorRoom {
            name: name.to_string(),
            center: (y + jitter(rng, noise), x + jitter(rng, noise)),
            vertices: Vec::new(),
            room_type,
        })
        .collect()
}

/// Symmetric jitter in `[-amount, amount)`. Overrides can collapse a noise
/// rule to zero, which would make the draw range empty.
fn jitter(rng: &mut ChaCha8Rng, amount: f64) -> f64 {
    if amount > 0.0 {
        rng.gen_range(-amount..amount)
    } else {
        0.0
    }
}

fn create_organic_rooms(rng: &mut ChaCha8Rng, rules: &DesignRules, rooms: &mut [VectorRoom]) {
    for room in rooms.iter_mut() {
        let size_key = if room.name.contains("SITE") {
            "site_size"
        } else if room.name.contains("SPAWN") {
            "spawn_size"
        } else {
            "room_size"
        };
        let base_size = rules.draw_f64(rng, size_key);
        room.vertices = create_organic_polygon(rng, rules, room.center, base_size, room.room_type);
    }
}

/// Star polygon around the anchor: evenly spaced base angles with jitter
/// on both angle and radius, scaled by the organic level.
fn create_organic_polygon(
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    (cy, cx): (f64, f64),
    size: f64,
    room_type: RoomType,
) -> Vec<(f64, f64)> {
    let num_vertices = match room_type {
        RoomType::SpawnOff | RoomType::SpawnDef => rng.gen_range(4..6),
        RoomType::Objective => rng.gen_range(5..8),
        RoomType::Room => {
            let min_v = rules.scalar("min_vertices") as i32;
            let max_v = rules.scalar("max_vertices") as i32;
            if max_v > min_v {
                rng.gen_range(min_v..max_v + 1)
            } else {
                min_v
            }
        }
    };

    let organic_level = rules.scalar("organic_level");
    let vertex_noise = rules.scalar("vertex_noise");
    let base_radius = size / 2.0;

    (0..num_vertices)
        .map(|i| {
            let base_angle = std::f64::consts::TAU * i as f64 / num_vertices as f64;
            let angle = base_angle + rng.gen_range(-0.3..0.3) * organic_level;
            let radius = base_radius + jitter(rng, vertex_noise) * organic_level;
            (cy + radius * angle.cos(), cx + radius * angle.sin())
        })
        .collect()
}

fn connect_rooms(
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    rooms: &[VectorRoom],
) -> Vec<VectorCorridor> {
    let diagonal_prob = rules.scalar("diagonal_probability");
    let center_of = |name: &str| rooms.iter().find(|r| r.name == name).map(|r| r.center);

    let mut corridors = Vec::new();
    for (name1, name2) in CONNECTIONS {
        let (Some(c1), Some(c2)) = (center_of(name1), center_of(name2)) else { continue };

        let width = rules.draw_f64(rng, "corridor_width");
        let vertices = if rng.gen::<f64>() < diagonal_prob {
            diagonal_corridor(c1, c2, width)
        } else {
            bent_corridor(rng, rules, c1, c2, width)
        };
        corridors.push(VectorCorridor { vertices });
    }
    corridors
}

/// Straight quad along the center line, expanded by the perpendicular.
fn diagonal_corridor((y1, x1): (f64, f64), (y2, x2): (f64, f64), width: f64) -> Vec<(f64, f64)> {
    let (dy, dx) = (y2 - y1, x2 - x1);
    let length = (dy * dy + dx * dx).sqrt();
    if length == 0.0 {
        return Vec::new();
    }
    let (uy, ux) = (dy / length, dx / length);
    let (py, px) = (-ux, uy);
    let hw = width / 2.0;

    vec![
        (y1 + py * hw, x1 + px * hw),
        (y1 - py * hw, x1 - px * hw),
        (y2 - py * hw, x2 - px * hw),
        (y2 + py * hw, x2 + px * hw),
    ]
}

/// Eight-vertex strip through a jittered elbow point.
fn bent_corridor(
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    (y1, x1): (f64, f64),
    (y2, x2): (f64, f64),
    width: f64,
) -> Vec<(f64, f64)> {
    let (mut mid_y, mut mid_x) = if rng.gen::<f64>() < 0.5 { (y1, x2) } else { (y2, x1) };

    let noise = rules.scalar("vertex_noise");
    mid_y += jitter(rng, noise);
    mid_x += jitter(rng, noise);

    let hw = width / 2.0;
    vec![
        (y1 - hw, x1 - hw),
        (y1 + hw, x1 - hw),
        (mid_y + hw, mid_x - hw),
        (mid_y + hw, mid_x + hw),
        (y2 + hw, x2 + hw),
        (y2 - hw, x2 + hw),
        (mid_y - hw, mid_x + hw),
        (mid_y - hw, mid_x - hw),
    ]
}

/// Markers first, then room polygons, then corridor polygons. Marker x/y
/// is the room CENTER here, not the top-left corner the tile converter
/// emits; the caller's scaling pass expects that.
fn to_objects(rooms: &[VectorRoom], corridors: &[VectorCorridor]) -> Vec<GeometryObject> {
    let mut objects = Vec::new();

    for room in rooms {
        let kind = match room.room_type {
            RoomType::SpawnOff => ObjectKind::SpawnOff,
            RoomType::SpawnDef => ObjectKind::SpawnDef,
            RoomType::Objective => ObjectKind::Objective,
            RoomType::Room => continue,
        };
        let (cy, cx) = room.center;
        let extent = if kind == ObjectKind::Objective { 10.0 } else { 20.0 };

        let mut marker = GeometryObject::new(kind);
        marker.x = Some(cx * METER);
        marker.y = Some(cy * METER);
        marker.width = Some(extent * METER);
        marker.height = Some(extent * METER);
        marker.label = Some(match kind {
            ObjectKind::SpawnOff => "OFFENCE".to_string(),
            ObjectKind::SpawnDef => "DEFENCE".to_string(),
            _ => room.name.replace('_', " "),
        });
        if kind == ObjectKind::Objective {
            marker.min_size = Some(64.0);
        }
        objects.push(marker);
    }

    for room in rooms {
        if room.vertices.is_empty() {
            continue;
        }
        let points: Vec<PointXY> = room
            .vertices
            .iter()
            .map(|&(vy, vx)| PointXY::new(vx * METER, vy * METER))
            .collect();

        let mut floor = GeometryObject::new(ObjectKind::Polyfloor);
        floor.x = Some(room.center.1 * METER);
        floor.y = Some(room.center.0 * METER);
        floor.width = Some(span(points.iter().map(|p| p.x)));
        floor.height = Some(span(points.iter().map(|p| p.y)));
        floor.points = Some(points);
        floor.floor_height = Some(0.0);
        floor.closed = Some(true);
        floor.label = Some(room.name.replace('_', " "));
        objects.push(floor);
    }

    for corridor in corridors {
        if corridor.vertices.is_empty() {
            continue;
        }
        let points: Vec<PointXY> = corridor
            .vertices
            .iter()
            .map(|&(vy, vx)| PointXY::new(vx * METER, vy * METER))
            .collect();

        let mut floor = GeometryObject::new(ObjectKind::Polyfloor);
        floor.x = Some(points.iter().map(|p| p.x).sum::<f64>() / points.len() as f64);
        floor.y = Some(points.iter().map(|p| p.y).sum::<f64>() / points.len() as f64);
        floor.width = Some(span(points.iter().map(|p| p.x)));
        floor.height = Some(span(points.iter().map(|p| p.y)));
        floor.points = Some(points);
        floor.floor_height = Some(0.0);
        floor.closed = Some(true);
        floor.label = Some(String::new());
        objects.push(floor);
    }

    objects
}

fn span(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    max - min
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn run(seed: u64) -> Vec<GeometryObject> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let rules = DesignRules::vector();
        generate(&mut rng, &rules)
    }

    #[test]
    fn test_markers_come_first() {
        let objects = run(42);
        let kinds: Vec<ObjectKind> = objects.iter().take(4).map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ObjectKind::SpawnOff,
                ObjectKind::SpawnDef,
                ObjectKind::Objective,
                ObjectKind::Objective
            ]
        );
        let site = &objects[2];
        assert_eq!(site.label.as_deref(), Some("A SITE"));
        assert_eq!(site.min_size, Some(64.0));
        assert_eq!(site.width, Some(10.0 * METER));
    }

    #[test]
    fn test_all_rooms_and_corridors_emitted() {
        let objects = run(42);
        let floors = objects.iter().filter(|o| o.kind == ObjectKind::Polyfloor).count();
        // 13 room polygons plus 16 corridors
        assert_eq!(floors, 13 + 16);
    }

    #[test]
    fn test_polygon_vertex_counts() {
        let objects = run(7);
        for obj in objects.iter().filter(|o| o.kind == ObjectKind::Polyfloor) {
            let n = obj.points().len();
            assert!((3..=8).contains(&n), "unexpected vertex count {n}");
        }
    }

    #[test]
    fn test_no_ids_or_categories() {
        let objects = run(7);
        assert!(objects.iter().all(|o| o.id.is_none() && o.category.is_none()));
    }

    #[test]
    fn test_collapsed_rule_ranges_still_generate() {
        // Scalar overrides collapse size/width ranges and zero out the
        // vertex noise; every draw must tolerate the empty ranges
        let mut rules = DesignRules::vector();
        let over: crate::rules::RulesOverride = serde_json::from_value(serde_json::json!({
            "site": {"size": 25},
            "spawn": {"size": 20},
            "room": {"size": 12},
            "corridor": {"width": 5},
            "vertex": {"noise": 0},
            "min": {"vertices": 6},
            "max": {"vertices": 6},
        }))
        .unwrap();
        rules.apply_flat_override(&over);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let objects = generate(&mut rng, &rules);
        let floors = objects.iter().filter(|o| o.kind == ObjectKind::Polyfloor).count();
        assert_eq!(floors, 13 + 16);
        for obj in objects.iter().filter(|o| o.kind == ObjectKind::Polyfloor) {
            if obj.label.as_deref().map_or(false, |l| l.ends_with("CONNECTOR")) {
                assert_eq!(obj.points().len(), 6);
            }
        }
    }

    #[test]
    fn test_same_seed_same_objects() {
        let a = serde_json::to_string(&run(99)).unwrap();
        let b = serde_json::to_string(&run(99)).unwrap();
        assert_eq!(a, b);
    }
}
