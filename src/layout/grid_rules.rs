//! Rule-driven grid layout
//!
//! The classic defuse-map skeleton: attack spawn at the bottom, defense at
//! the top, one to three bomb sites with choke, main, and lobby rooms on
//! each lane, a mid lane with top and entrance rooms, plus flank sides,
//! angle rooms, and heaven overlooks. Placement dimensions and corridor
//! widths come from the design-rule table; user-pinned node positions
//! override the automatic skeleton.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::types::GridPos;
use crate::grid::ops::{
    add_random_covers, connect_rooms, create_room, mark_walls, remove_isolated_areas, route_exists,
};
use crate::grid::{Room, RoomTable, Tile, TileGrid};
use crate::layout::UserLayout;
use crate::rules::DesignRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MidType {
    Wide,
    Narrow,
    Split,
}

/// Resolved skeleton for one generation run.
struct MapSkeleton {
    a_side: Side,
    mid_type: MidType,
    asymmetry: f64,
    user: Option<UserPositions>,
}

/// User node positions converted to map coordinates, (x, y).
#[derive(Default)]
struct UserPositions {
    atk: (i32, i32),
    def: (i32, i32),
    mid: (i32, i32),
    site_a: Option<(i32, i32)>,
    site_b: Option<(i32, i32)>,
    site_c: Option<(i32, i32)>,
    side_a: Option<(i32, i32)>,
    side_b: Option<(i32, i32)>,
    lobby_a: Option<(i32, i32)>,
    lobby_b: Option<(i32, i32)>,
    main_a: Option<(i32, i32)>,
    main_b: Option<(i32, i32)>,
    choke_a: Option<(i32, i32)>,
    choke_b: Option<(i32, i32)>,
    heaven_a: Option<(i32, i32)>,
    heaven_b: Option<(i32, i32)>,
    mid_top: Option<(i32, i32)>,
    mid_entrance: Option<(i32, i32)>,
}

/// Inclusive-low, exclusive-high integer draw; collapses to `lo` when the
/// range is empty.
fn randint(rng: &mut ChaCha8Rng, lo: i32, hi: i32) -> i32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

fn overlaps_existing(rooms: &RoomTable, x: i32, y: i32, w: i32, h: i32) -> bool {
    let candidate = Room::new(x, y, w, h);
    rooms.iter().any(|(_, room)| candidate.overlaps(room, 3))
}

/// Generate a tile map and room table. `size` is the square grid extent in
/// tiles; `site_count` must already be validated to 1..=3.
pub fn generate(
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    size: usize,
    site_count: u8,
    layout: Option<&UserLayout>,
) -> (TileGrid, RoomTable) {
    let s = size as i32;
    let mut grid = TileGrid::new(size);
    let mut rooms = RoomTable::new();

    let skeleton = match layout {
        Some(user) => skeleton_from_user(s, user, site_count),
        None => decide_skeleton(rng),
    };

    place_key_points(&mut grid, &mut rooms, rng, rules, s, site_count, &skeleton);
    design_chokepoints(&mut grid, &mut rooms, rng, rules, s, site_count);
    design_mid(&mut grid, &mut rooms, rng, rules, s, &skeleton);
    place_sightline_rooms(&mut grid, &mut rooms, rng, s);
    connect_with_cover(&mut grid, &rooms, rng, rules, s, site_count);
    add_angle_positions(&mut grid, &mut rooms, rng, s);
    add_vertical_positions(&mut grid, &mut rooms, rng, s);
    validate_and_fix(&mut grid, &rooms, rng);
    add_random_covers(&mut grid, &rooms, rng);
    remove_isolated_areas(&mut grid, &rooms);
    mark_walls(&mut grid);

    (grid, rooms)
}

fn decide_skeleton(rng: &mut ChaCha8Rng) -> MapSkeleton {
    let a_side = if rng.gen::<f64>() < 0.5 { Side::Left } else { Side::Right };
    let mid_type = match rng.gen_range(0..3) {
        0 => MidType::Wide,
        1 => MidType::Narrow,
        _ => MidType::Split,
    };
    let asymmetry = rng.gen_range(0.1..0.4);
    MapSkeleton { a_side, mid_type, asymmetry, user: None }
}

fn skeleton_from_user(s: i32, layout: &UserLayout, site_count: u8) -> MapSkeleton {
    let margin = 15;
    let to_map = |nx: f64, ny: f64| -> (i32, i32) {
        let x = (nx * (s - 2 * margin) as f64) as i32 + margin;
        let y = (ny * (s - 2 * margin) as f64) as i32 + margin;
        (x.clamp(margin, s - margin), y.clamp(margin, s - margin))
    };
    let node = |key: &str| layout.get(key).map(|p| to_map(p.x, p.y));
    let node_or = |key: &str, dx: f64, dy: f64| node(key).unwrap_or_else(|| to_map(dx, dy));

    let site_a = node("siteA").or_else(|| Some(to_map(0.25, 0.7)));
    let site_b = if site_count >= 2 {
        node("siteB").or_else(|| Some(to_map(0.75, 0.7)))
    } else {
        None
    };
    let site_c = if site_count >= 3 { node("siteC") } else { None };
    let b_only = |key: &str| if site_count >= 2 { node(key) } else { None };

    let a_side = match site_a {
        Some((x, _)) if x >= s / 2 => Side::Right,
        _ => Side::Left,
    };

    MapSkeleton {
        a_side,
        mid_type: MidType::Wide,
        asymmetry: 0.2,
        user: Some(UserPositions {
            atk: node_or("atk", 0.5, 0.1),
            def: node_or("def", 0.5, 0.9),
            mid: node_or("mid", 0.5, 0.5),
            site_a,
            site_b,
            site_c,
            side_a: node("sideA"),
            side_b: b_only("sideB"),
            lobby_a: node("lobbyA"),
            lobby_b: b_only("lobbyB"),
            main_a: node("mainA"),
            main_b: b_only("mainB"),
            choke_a: node("chokeA"),
            choke_b: b_only("chokeB"),
            heaven_a: node("heavenA"),
            heaven_b: b_only("heavenB"),
            mid_top: node("midTop"),
            mid_entrance: node("midEntrance"),
        }),
    }
}

fn place_key_points(
    grid: &mut TileGrid,
    rooms: &mut RoomTable,
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    s: i32,
    site_count: u8,
    skeleton: &MapSkeleton,
) {
    let atk_w = rules.draw_int(rng, "spawn_size");
    let atk_h = randint(rng, 18, 24);
    let def_w = rules.draw_int(rng, "spawn_size");
    let def_h = randint(rng, 16, 22);
    let (room_min, room_max) = {
        let (lo, hi) = rules.range("room_size");
        (lo as i32, hi as i32)
    };

    if let Some(user) = &skeleton.user {
        let centered = |pos: (i32, i32), w: i32, h: i32| (pos.0 - w / 2, pos.1 - h / 2);

        let (x, y) = centered(user.atk, atk_w, atk_h);
        create_room(grid, rooms, "ATK_SPAWN", x, y, atk_w, atk_h, Some(Tile::SpawnAttack));
        let (x, y) = centered(user.def, def_w, def_h);
        create_room(grid, rooms, "DEF_SPAWN", x, y, def_w, def_h, Some(Tile::SpawnDefense));

        let mut place_site = |rng: &mut ChaCha8Rng, pos: (i32, i32), name: &str, marker: Tile| {
            let w = rules.draw_int(rng, "site_size");
            let h = rules.draw_int(rng, "site_size");
            let (x, y) = centered(pos, w, h);
            create_room(grid, rooms, name, x, y, w, h, Some(marker));
        };
        if let Some(pos) = user.site_a {
            place_site(rng, pos, "A_SITE", Tile::SiteA);
        }
        if site_count >= 2 {
            if let Some(pos) = user.site_b {
                place_site(rng, pos, "B_SITE", Tile::SiteB);
            }
        }
        if site_count >= 3 {
            if let Some(pos) = user.site_c {
                // No dedicated marker tile for a third site
                place_site(rng, pos, "C_SITE", Tile::SiteA);
            }
        }

        let mid_w = randint(rng, room_min, room_max);
        let mid_h = randint(rng, room_min, room_max);
        let (x, y) = centered(user.mid, mid_w, mid_h);
        create_room(grid, rooms, "MID", x, y, mid_w, mid_h, None);

        // Flank sides run slightly smaller than regular rooms
        let (side_min, side_max) = ((room_min - 4).max(8), (room_max - 4).max(12));
        let side_w = randint(rng, side_min, side_max);
        let side_h = randint(rng, side_min, side_max);
        for (pos, name) in [(user.side_a, "A_SIDE"), (user.side_b, "B_SIDE")] {
            if let Some(pos) = pos {
                let (x, y) = centered(pos, side_w, side_h);
                create_room(grid, rooms, name, x, y, side_w, side_h, None);
            }
        }

        let lobby_w = randint(rng, room_min, room_max);
        let lobby_h = randint(rng, room_min, room_max);
        for (pos, name) in [(user.lobby_a, "A_LOBBY"), (user.lobby_b, "B_LOBBY")] {
            if let Some(pos) = pos {
                let (x, y) = centered(pos, lobby_w, lobby_h);
                create_room(grid, rooms, name, x, y, lobby_w, lobby_h, None);
            }
        }

        let main_w = randint(rng, room_min, room_max);
        let main_h = randint(rng, room_min - 2, room_max - 2);
        for (pos, name) in [(user.main_a, "A_MAIN"), (user.main_b, "B_MAIN")] {
            if let Some(pos) = pos {
                let (x, y) = centered(pos, main_w, main_h);
                create_room(grid, rooms, name, x, y, main_w, main_h, None);
            }
        }

        let choke_w = randint(rng, 8, 14);
        let choke_h = randint(rng, 8, 14);
        for (pos, name) in [(user.choke_a, "A_CHOKE"), (user.choke_b, "B_CHOKE")] {
            if let Some(pos) = pos {
                let (x, y) = centered(pos, choke_w, choke_h);
                create_room(grid, rooms, name, x, y, choke_w, choke_h, None);
            }
        }

        let heaven_w = randint(rng, 10, 16);
        let heaven_h = randint(rng, 8, 12);
        for (pos, name) in [(user.heaven_a, "A_HEAVEN"), (user.heaven_b, "B_HEAVEN")] {
            if let Some(pos) = pos {
                let (x, y) = centered(pos, heaven_w, heaven_h);
                create_room(grid, rooms, name, x, y, heaven_w, heaven_h, None);
            }
        }

        let sub_w = randint(rng, room_min - 2, room_max - 2);
        let sub_h = randint(rng, room_min - 4, room_max - 4);
        for (pos, name) in [(user.mid_top, "MID_TOP"), (user.mid_entrance, "MID_ENTRANCE")] {
            if let Some(pos) = pos {
                let (x, y) = centered(pos, sub_w, sub_h);
                create_room(grid, rooms, name, x, y, sub_w, sub_h, None);
            }
        }
        return;
    }

    // Automatic skeleton: attack along the bottom edge, defense at the top
    let atk_x = s / 2 - atk_w / 2 + randint(rng, -10, 11);
    let atk_y = s - atk_h - randint(rng, 8, 15);
    create_room(grid, rooms, "ATK_SPAWN", atk_x, atk_y, atk_w, atk_h, Some(Tile::SpawnAttack));

    let def_x = s / 2 - def_w / 2 + randint(rng, -8, 9);
    let def_y = randint(rng, 6, 15);
    create_room(grid, rooms, "DEF_SPAWN", def_x, def_y, def_w, def_h, Some(Tile::SpawnDefense));

    match site_count {
        1 => {
            let a_w = rules.draw_int(rng, "site_size");
            let a_h = rules.draw_int(rng, "site_size");
            let a_x = s / 2 - a_w / 2 + randint(rng, -15, 16);
            let a_y = randint(rng, 20, 40);
            create_room(grid, rooms, "A_SITE", a_x, a_y, a_w, a_h, Some(Tile::SiteA));
        }
        3 => {
            let a_w = rules.draw_int(rng, "site_size");
            let a_h = rules.draw_int(rng, "site_size");
            let a_x = randint(rng, 10, 25);
            let a_y = randint(rng, 18, 35);
            create_room(grid, rooms, "A_SITE", a_x, a_y, a_w, a_h, Some(Tile::SiteA));

            let b_w = rules.draw_int(rng, "site_size");
            let b_h = rules.draw_int(rng, "site_size");
            let b_x = s - b_w - randint(rng, 10, 25);
            let b_y = randint(rng, 18, 35);
            create_room(grid, rooms, "B_SITE", b_x, b_y, b_w, b_h, Some(Tile::SiteB));

            let c_w = rules.draw_int(rng, "site_size");
            let c_h = rules.draw_int(rng, "site_size");
            let c_x = s / 2 - c_w / 2 + randint(rng, -10, 11);
            let c_y = randint(rng, 30, 50);
            create_room(grid, rooms, "C_SITE", c_x, c_y, c_w, c_h, Some(Tile::SiteA));
        }
        _ => {
            let a_w = rules.draw_int(rng, "site_size");
            let a_h = rules.draw_int(rng, "site_size");
            let a_x = match skeleton.a_side {
                Side::Left => randint(rng, 10, 30),
                Side::Right => s - a_w - randint(rng, 10, 30),
            };
            let a_y = randint(rng, 18, 35);
            create_room(grid, rooms, "A_SITE", a_x, a_y, a_w, a_h, Some(Tile::SiteA));

            let b_w = rules.draw_int(rng, "site_size");
            let b_h = rules.draw_int(rng, "site_size");
            let b_x = match skeleton.a_side {
                Side::Left => s - b_w - randint(rng, 10, 30),
                Side::Right => randint(rng, 10, 30),
            };
            let asymmetry_offset = (skeleton.asymmetry * 15.0) as i32;
            let b_y = randint(rng, 20, 40)
                + randint(rng, -asymmetry_offset, asymmetry_offset + 1);
            create_room(grid, rooms, "B_SITE", b_x, b_y.clamp(15, 50), b_w, b_h, Some(Tile::SiteB));
        }
    }
}

/// Entry rooms per lane: a choke right below each site, a main halfway down
/// the map, and a lobby near the attack side. Rooms already pinned by the
/// user layout are left alone.
fn design_chokepoints(
    grid: &mut TileGrid,
    rooms: &mut RoomTable,
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    s: i32,
    site_count: u8,
) {
    let atk = match rooms.get("ATK_SPAWN") {
        Some(room) => *room,
        None => return,
    };

    let lanes: [(&str, bool); 3] = [
        ("A", true),
        ("B", site_count >= 2),
        ("C", site_count >= 3),
    ];

    for (prefix, enabled) in lanes {
        if !enabled {
            continue;
        }
        let Some(site) = rooms.get(&format!("{prefix}_SITE")).copied() else { continue };

        let choke_name = format!("{prefix}_CHOKE");
        if !rooms.contains(&choke_name) {
            let choke_w = rules.draw_int(rng, "choke_width");
            let choke_h = randint(rng, 10, 18);
            let choke_x = site.x + site.w / 2 - choke_w / 2;
            let choke_y = site.y + site.h + randint(rng, 8, 18);
            create_room(grid, rooms, &choke_name, choke_x, choke_y, choke_w + 8, choke_h, None);
        }

        let main_name = format!("{prefix}_MAIN");
        if !rooms.contains(&main_name) {
            let main_w = rules.draw_int(rng, "room_size");
            let main_h = rules.draw_int(rng, "room_size");
            let main_x = site.x + randint(rng, -5, 10);
            let main_y = if prefix == "C" {
                s / 2 + randint(rng, 10, 25)
            } else {
                s / 2 + randint(rng, -5, 15)
            };
            create_room(grid, rooms, &main_name, main_x, main_y, main_w, main_h, None);
        }

        // The C lane shares the mid approach and gets no lobby of its own
        if prefix == "C" {
            continue;
        }
        let lobby_name = format!("{prefix}_LOBBY");
        if !rooms.contains(&lobby_name) {
            let lobby_w = rules.draw_int(rng, "room_size");
            let lobby_h = rules.draw_int(rng, "room_size");
            let lobby_x = (site.x + atk.x) / 2 - lobby_w / 2 + randint(rng, -8, 9);
            let lobby_y = s - 52 + randint(rng, -5, 10);
            let lobby_x = lobby_x.clamp(5, s - lobby_w - 5);
            create_room(grid, rooms, &lobby_name, lobby_x, lobby_y, lobby_w, lobby_h, None);
        }
    }
}

fn design_mid(
    grid: &mut TileGrid,
    rooms: &mut RoomTable,
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    s: i32,
    skeleton: &MapSkeleton,
) {
    let (room_min, room_max) = {
        let (lo, hi) = rules.range("room_size");
        (lo as i32, hi as i32)
    };

    if !rooms.contains("MID") {
        let mid_w = randint(rng, room_min, room_max);
        let mid_h = randint(rng, room_min, room_max);
        let mid_x = s / 2 - mid_w / 2 + randint(rng, -8, 9);
        let mid_y = s / 2 - mid_h / 2 + randint(rng, -8, 5);
        create_room(grid, rooms, "MID", mid_x, mid_y, mid_w, mid_h, None);
    }

    if !rooms.contains("MID_TOP") {
        let top_w = randint(rng, room_min, room_max);
        let top_h = randint(rng, (room_min - 4).max(8), (room_max - 6).max(12));
        let top_x = s / 2 - top_w / 2 + randint(rng, -5, 6);
        let top_y = randint(rng, 28, 40);
        create_room(grid, rooms, "MID_TOP", top_x, top_y, top_w, top_h, None);
    }

    if !rooms.contains("MID_ENTRANCE") {
        let ent_w = randint(rng, room_min, room_max);
        let ent_h = randint(rng, (room_min - 4).max(8), (room_max - 6).max(12));
        let ent_x = s / 2 - ent_w / 2 + randint(rng, -8, 9);
        let ent_y = s - 55 + randint(rng, -5, 10);
        create_room(grid, rooms, "MID_ENTRANCE", ent_x, ent_y, ent_w, ent_h, None);
    }

    if skeleton.mid_type == MidType::Split {
        let conn_w = randint(rng, (room_min - 4).max(8), (room_max - 6).max(12));
        let conn_h = randint(rng, (room_min - 4).max(8), (room_max - 6).max(12));
        let conn_x = s / 2 - conn_w / 2 + randint(rng, -15, 16);
        let conn_y = s / 2 + randint(rng, 5, 15);
        create_room(grid, rooms, "MID_CONNECTOR", conn_x, conn_y, conn_w, conn_h, None);
    }
}

/// Flank side rooms, placed between each site and its main/choke on the
/// map-center side so they cut off a rotation path.
fn place_sightline_rooms(grid: &mut TileGrid, rooms: &mut RoomTable, rng: &mut ChaCha8Rng, s: i32) {
    for prefix in ["A", "B", "C"] {
        let Some(site) = rooms.get(&format!("{prefix}_SITE")).copied() else { continue };
        let side_name = format!("{prefix}_SIDE");
        if rooms.contains(&side_name) {
            continue;
        }
        let reference = rooms
            .get(&format!("{prefix}_MAIN"))
            .or_else(|| rooms.get(&format!("{prefix}_CHOKE")))
            .copied();
        let Some(reference) = reference else { continue };

        let side_w = randint(rng, 12, 18);
        let side_h = randint(rng, 14, 20);
        let mid_y = (site.y + reference.y) / 2;

        let side_x = if site.x < s / 2 {
            site.x + site.w + randint(rng, 5, 15)
        } else {
            site.x - side_w - randint(rng, 5, 15)
        };
        let side_y = mid_y + randint(rng, -10, 10);
        let side_x = side_x.clamp(10, s - side_w - 10);
        let side_y = side_y.clamp(10, s - side_h - 10);

        if !overlaps_existing(rooms, side_x, side_y, side_w, side_h) {
            create_room(grid, rooms, &side_name, side_x, side_y, side_w, side_h, None);
        }
    }
}

/// Corridor tables per site count: essential routes first, then secondary
/// rotations, then everything a side room connects to.
fn connect_with_cover(
    grid: &mut TileGrid,
    rooms: &RoomTable,
    rng: &mut ChaCha8Rng,
    rules: &DesignRules,
    _s: i32,
    site_count: u8,
) {
    let min_w = rules.scalar("corridor_min_width") as i32;
    let max_w = rules.scalar("corridor_max_width") as i32;
    let max_straight = rules.scalar("max_straight_corridor") as i32;

    let connections: Vec<(&str, &str, i32)> = match site_count {
        1 => vec![
            ("ATK_SPAWN", "MID_ENTRANCE", 5),
            ("MID_ENTRANCE", "MID", 5),
            ("MID", "MID_TOP", 5),
            ("MID_TOP", "A_CHOKE", 5),
            ("A_CHOKE", "A_SITE", 6),
            ("ATK_SPAWN", "A_LOBBY", 5),
            ("A_LOBBY", "A_MAIN", 5),
            ("A_MAIN", "A_CHOKE", 5),
            ("DEF_SPAWN", "A_SITE", 5),
            ("DEF_SPAWN", "MID_TOP", 5),
            // Secondary detours
            ("MID", "A_MAIN", 4),
            ("A_LOBBY", "MID_ENTRANCE", 4),
        ],
        3 => vec![
            ("ATK_SPAWN", "A_LOBBY", 6),
            ("ATK_SPAWN", "B_LOBBY", 6),
            ("ATK_SPAWN", "MID_ENTRANCE", 5),
            ("A_LOBBY", "A_MAIN", 5),
            ("A_MAIN", "A_CHOKE", 5),
            ("A_CHOKE", "A_SITE", 6),
            ("B_LOBBY", "B_MAIN", 5),
            ("B_MAIN", "B_CHOKE", 5),
            ("B_CHOKE", "B_SITE", 6),
            ("MID_ENTRANCE", "MID", 5),
            ("MID", "C_MAIN", 5),
            ("C_MAIN", "C_CHOKE", 5),
            ("C_CHOKE", "C_SITE", 6),
            ("MID", "MID_TOP", 5),
            ("MID_TOP", "DEF_SPAWN", 5),
            ("MID", "A_CHOKE", 4),
            ("MID", "B_CHOKE", 4),
            ("MID_TOP", "A_SITE", 4),
            ("MID_TOP", "B_SITE", 4),
            ("MID_TOP", "C_SITE", 4),
            ("DEF_SPAWN", "A_SITE", 5),
            ("DEF_SPAWN", "B_SITE", 5),
            ("DEF_SPAWN", "C_SITE", 5),
        ],
        _ => vec![
            ("ATK_SPAWN", "A_LOBBY", 6),
            ("ATK_SPAWN", "B_LOBBY", 6),
            ("ATK_SPAWN", "MID_ENTRANCE", 5),
            ("A_LOBBY", "A_MAIN", 5),
            ("A_MAIN", "A_CHOKE", 5),
            ("A_CHOKE", "A_SITE", 6),
            ("B_LOBBY", "B_MAIN", 5),
            ("B_MAIN", "B_CHOKE", 5),
            ("B_CHOKE", "B_SITE", 6),
            ("MID_ENTRANCE", "MID", 5),
            ("MID", "MID_TOP", 5),
            ("MID_TOP", "DEF_SPAWN", 5),
            ("MID", "A_CHOKE", 4),
            ("MID", "B_CHOKE", 4),
            ("MID_TOP", "A_SITE", 4),
            ("MID_TOP", "B_SITE", 4),
            ("DEF_SPAWN", "A_SITE", 5),
            ("DEF_SPAWN", "B_SITE", 5),
        ],
    };

    for (from, to, width) in connections {
        if rooms.contains(from) && rooms.contains(to) {
            let clamped = width.clamp(min_w, max_w);
            connect_rooms(grid, rooms, rng, from, to, clamped, max_straight);
        }
    }

    let side_names: Vec<String> = rooms
        .iter()
        .filter(|(name, _)| name.contains("_SIDE"))
        .map(|(name, _)| name.to_string())
        .collect();
    for name in side_names {
        let prefix = &name[..1];
        for (other, width) in [
            (format!("{prefix}_SITE"), 5),
            (format!("{prefix}_MAIN"), 5),
            (format!("{prefix}_CHOKE"), 4),
            ("MID".to_string(), 4),
        ] {
            if rooms.contains(&other) {
                connect_rooms(grid, rooms, rng, &name, &other, width, max_straight);
            }
        }
    }
}

/// Small engagement rooms scattered around each site at a random polar
/// offset, connected back to the site with a narrow corridor.
fn add_angle_positions(grid: &mut TileGrid, rooms: &mut RoomTable, rng: &mut ChaCha8Rng, s: i32) {
    for site_name in ["A_SITE", "B_SITE"] {
        let Some(site) = rooms.get(site_name).copied() else { continue };
        let prefix = &site_name[..1];

        let num_angles = randint(rng, 2, 4);
        for i in 0..num_angles {
            let ang_w = randint(rng, 8, 14);
            let ang_h = randint(rng, 8, 14);
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let dist = randint(rng, 15, 30) as f64;

            let ang_x = ((site.x + site.w / 2) as f64 + dist * angle.cos()) as i32 - ang_w / 2;
            let ang_y = ((site.y + site.h / 2) as f64 + dist * angle.sin()) as i32 - ang_h / 2;
            let ang_x = ang_x.clamp(5, s - ang_w - 5);
            let ang_y = ang_y.clamp(5, s - ang_h - 5);

            if !overlaps_existing(rooms, ang_x, ang_y, ang_w, ang_h) {
                let name = format!("{prefix}_ANGLE_{i}");
                create_room(grid, rooms, &name, ang_x, ang_y, ang_w, ang_h, None);
                connect_rooms(grid, rooms, rng, &name, site_name, 3, 15);
            }
        }
    }
}

/// Heaven overlooks above each site, linked to the site and back to the
/// defense spawn.
fn add_vertical_positions(grid: &mut TileGrid, rooms: &mut RoomTable, rng: &mut ChaCha8Rng, _s: i32) {
    for site_name in ["A_SITE", "B_SITE"] {
        let Some(site) = rooms.get(site_name).copied() else { continue };
        let prefix = &site_name[..1];

        let h_w = randint(rng, 14, 20);
        let h_h = randint(rng, 10, 16);
        let h_x = site.x + randint(rng, 0, (site.w - h_w).max(1));
        let h_y = site.y - h_h - randint(rng, 3, 10);

        if h_y > 5 && !overlaps_existing(rooms, h_x, h_y, h_w, h_h) {
            let name = format!("{prefix}_HEAVEN");
            create_room(grid, rooms, &name, h_x, h_y, h_w, h_h, None);
            connect_rooms(grid, rooms, rng, &name, site_name, 4, 15);
            connect_rooms(grid, rooms, rng, &name, "DEF_SPAWN", 3, 15);
        }
    }
}

/// Force a corridor between any spawn/site pair the flood fill cannot
/// already reach.
fn validate_and_fix(grid: &mut TileGrid, rooms: &RoomTable, rng: &mut ChaCha8Rng) {
    let required = [
        ("ATK_SPAWN", "A_SITE"),
        ("ATK_SPAWN", "B_SITE"),
        ("DEF_SPAWN", "A_SITE"),
        ("DEF_SPAWN", "B_SITE"),
    ];

    for (from, to) in required {
        let (Some(start), Some(end)) = (rooms.get(from), rooms.get(to)) else { continue };
        let (sy, sx) = start.center();
        let (ey, ex) = end.center();
        if !route_exists(grid, GridPos::new(sy, sx), GridPos::new(ey, ex)) {
            tracing::debug!(from, to, "forcing missing connection");
            connect_rooms(grid, rooms, rng, from, to, 5, 15);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn run(seed: u64, site_count: u8) -> (TileGrid, RoomTable) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let rules = DesignRules::grid_rules();
        generate(&mut rng, &rules, 150, site_count, None)
    }

    #[test]
    fn test_core_rooms_present() {
        let (_, rooms) = run(42, 2);
        for name in ["ATK_SPAWN", "DEF_SPAWN", "A_SITE", "B_SITE", "MID", "MID_TOP"] {
            assert!(rooms.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_single_site_has_no_b_lane() {
        let (_, rooms) = run(7, 1);
        assert!(rooms.contains("A_SITE"));
        assert!(!rooms.contains("B_SITE"));
        assert!(!rooms.contains("B_LOBBY"));
    }

    #[test]
    fn test_three_sites_add_c_lane() {
        let (_, rooms) = run(7, 3);
        assert!(rooms.contains("C_SITE"));
        assert!(rooms.contains("C_MAIN"));
        assert!(rooms.contains("C_CHOKE"));
    }

    #[test]
    fn test_spawns_reach_sites() {
        let (grid, rooms) = run(123, 2);
        for (from, to) in [("ATK_SPAWN", "A_SITE"), ("DEF_SPAWN", "B_SITE")] {
            let (sy, sx) = rooms.get(from).unwrap().center();
            let (ey, ex) = rooms.get(to).unwrap().center();
            assert!(
                route_exists(&grid, GridPos::new(sy, sx), GridPos::new(ey, ex)),
                "{from} cannot reach {to}"
            );
        }
    }

    #[test]
    fn test_same_seed_same_map() {
        let (grid_a, rooms_a) = run(99, 2);
        let (grid_b, rooms_b) = run(99, 2);
        for (y, x, tile) in grid_a.iter_cells() {
            assert_eq!(tile, grid_b.get(y, x), "tile mismatch at ({y}, {x})");
        }
        let names_a: Vec<&str> = rooms_a.iter().map(|(n, _)| n).collect();
        let names_b: Vec<&str> = rooms_b.iter().map(|(n, _)| n).collect();
        assert_eq!(names_a, names_b);
    }

    #[test]
    fn test_user_layout_pins_site() {
        let mut layout = UserLayout::new();
        layout.insert("siteA".into(), crate::layout::NormPoint { x: 0.2, y: 0.3 });
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let rules = DesignRules::grid_rules();
        let (_, rooms) = generate(&mut rng, &rules, 150, 2, Some(&layout));
        let site = rooms.get("A_SITE").unwrap();
        // Normalized 0.2 of a 150 grid with margin 15 lands near x=39
        let (cy, cx) = site.center();
        assert!((cx - 39).abs() <= 3, "site center x {cx}");
        assert!((cy - 51).abs() <= 3, "site center y {cy}");
    }

    #[test]
    fn test_walls_ring_walkable_area() {
        let (grid, _) = run(21, 2);
        for (y, x, tile) in grid.iter_cells() {
            if tile == Tile::Void {
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        assert!(
                            !grid.get(y + dy, x + dx).is_walkable(),
                            "void at ({y},{x}) touches walkable"
                        );
                    }
                }
            }
        }
    }
}
