//! Tile-region outlines
//!
//! A region is a set of (row, col) tiles. Its outline is walked clockwise
//! along the exposed cell edges, using lattice vertices: tile (y, x) owns
//! the unit square with corners (y, x) to (y+1, x+1). Regions are kept in
//! ordered sets so the walk is reproducible.

use std::collections::{HashMap, HashSet};

pub type TileSet = std::collections::BTreeSet<(i32, i32)>;

/// Extract the boundary polygon of a tile region as lattice vertices in
/// (row, col) form. Returns an empty vec for an empty region; interior
/// holes are not traced, only the loop reachable from the leftmost vertex.
pub fn extract_contour(tiles: &TileSet) -> Vec<(i32, i32)> {
    if tiles.is_empty() {
        return Vec::new();
    }

    // Directed edges along exposed sides, clockwise around the region.
    let mut edge_map: HashMap<(i32, i32), Vec<(i32, i32)>> = HashMap::new();
    let mut add_edge = |from: (i32, i32), to: (i32, i32)| {
        edge_map.entry(from).or_default().push(to);
    };

    for &(ty, tx) in tiles {
        if !tiles.contains(&(ty - 1, tx)) {
            add_edge((ty, tx), (ty, tx + 1));
        }
        if !tiles.contains(&(ty, tx + 1)) {
            add_edge((ty, tx + 1), (ty + 1, tx + 1));
        }
        if !tiles.contains(&(ty + 1, tx)) {
            add_edge((ty + 1, tx + 1), (ty + 1, tx));
        }
        if !tiles.contains(&(ty, tx - 1)) {
            add_edge((ty + 1, tx), (ty, tx));
        }
    }

    if edge_map.is_empty() {
        return Vec::new();
    }

    // Start at the lexicographically smallest (x, y) vertex and follow
    // unused edges until the loop closes.
    let start = *edge_map.keys().min_by_key(|&&(y, x)| (x, y)).unwrap();
    let mut contour = vec![start];
    let mut current = start;
    let mut used: HashSet<((i32, i32), (i32, i32))> = HashSet::new();

    for _ in 0..tiles.len() * 4 + 100 {
        let Some(candidates) = edge_map.get(&current) else { break };
        let mut advanced = false;
        for &next in candidates {
            if used.insert((current, next)) {
                current = next;
                if current == start {
                    return contour;
                }
                contour.push(current);
                advanced = true;
                break;
            }
        }
        if !advanced {
            break;
        }
    }

    contour
}

/// Drop collinear vertices: a vertex stays only when the step into it
/// differs from the step out of it. Contours of three or fewer vertices
/// pass through unchanged.
pub fn simplify_contour(contour: &[(i32, i32)]) -> Vec<(i32, i32)> {
    if contour.len() <= 3 {
        return contour.to_vec();
    }

    let mut simplified = vec![contour[0]];
    for i in 1..contour.len() - 1 {
        let (py, px) = contour[i - 1];
        let (cy, cx) = contour[i];
        let (ny, nx) = contour[i + 1];
        if (cy - py, cx - px) != (ny - cy, nx - cx) {
            simplified.push(contour[i]);
        }
    }
    simplified.push(contour[contour.len() - 1]);

    if simplified.len() > 1 && simplified[0] == simplified[simplified.len() - 1] {
        simplified.pop();
    }
    simplified
}

/// Bisect an oversized corridor region along its longer bounding-box axis,
/// recursively, until every piece is 60 tiles or fewer. Pieces under 4
/// tiles are dropped.
pub fn split_long_corridor(tiles: &TileSet) -> Vec<TileSet> {
    if tiles.len() <= 60 {
        return vec![tiles.clone()];
    }

    let min_y = tiles.iter().map(|t| t.0).min().unwrap();
    let max_y = tiles.iter().map(|t| t.0).max().unwrap();
    let min_x = tiles.iter().map(|t| t.1).min().unwrap();
    let max_x = tiles.iter().map(|t| t.1).max().unwrap();

    let (region1, region2): (TileSet, TileSet) = if max_y - min_y > max_x - min_x {
        let mid_y = (min_y + max_y) / 2;
        tiles.iter().partition(|t| t.0 <= mid_y)
    } else {
        let mid_x = (min_x + max_x) / 2;
        tiles.iter().partition(|t| t.1 <= mid_x)
    };

    let mut result = Vec::new();
    for region in [region1, region2] {
        if region.len() > 60 {
            result.extend(split_long_corridor(&region));
        } else if region.len() >= 4 {
            result.push(region);
        }
    }

    if result.is_empty() {
        vec![tiles.clone()]
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(y0: i32, x0: i32, h: i32, w: i32) -> TileSet {
        let mut tiles = TileSet::new();
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                tiles.insert((y, x));
            }
        }
        tiles
    }

    #[test]
    fn test_rectangle_contour_simplifies_to_corners() {
        let tiles = rect(2, 3, 4, 5);
        let contour = extract_contour(&tiles);
        let simplified = simplify_contour(&contour);
        assert_eq!(simplified.len(), 4);
        for corner in [(2, 3), (2, 8), (6, 8), (6, 3)] {
            assert!(simplified.contains(&corner), "missing corner {corner:?}");
        }
    }

    #[test]
    fn test_l_shape_contour_has_six_corners() {
        let mut tiles = rect(0, 0, 2, 4);
        tiles.extend(rect(2, 0, 2, 2));
        let contour = extract_contour(&tiles);
        let simplified = simplify_contour(&contour);
        assert_eq!(simplified.len(), 6);
    }

    #[test]
    fn test_contour_is_deterministic() {
        let mut tiles = rect(5, 5, 3, 9);
        tiles.extend(rect(8, 10, 4, 3));
        assert_eq!(extract_contour(&tiles), extract_contour(&tiles.clone()));
    }

    #[test]
    fn test_split_small_region_untouched() {
        let tiles = rect(0, 0, 5, 5);
        let parts = split_long_corridor(&tiles);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 25);
    }

    #[test]
    fn test_split_long_region_bisects_long_axis() {
        // 4x40 strip splits along x
        let tiles = rect(0, 0, 4, 40);
        let parts = split_long_corridor(&tiles);
        assert!(parts.len() >= 2);
        assert!(parts.iter().all(|p| p.len() <= 60 && p.len() >= 4));
        let total: usize = parts.iter().map(|p| p.len()).sum();
        assert_eq!(total, 160);
    }
}
