//! Property tests for the contour and coverage primitives

use levelforge::geometry::contour::{
    extract_contour, simplify_contour, split_long_corridor, TileSet,
};
use levelforge::geometry::coverage::point_in_polygon;
use proptest::prelude::*;

fn rect_tiles(x: i32, y: i32, w: i32, h: i32) -> TileSet {
    let mut tiles = TileSet::new();
    for ty in y..y + h {
        for tx in x..x + w {
            tiles.insert((ty, tx));
        }
    }
    tiles
}

proptest! {
    #[test]
    fn rect_contour_keeps_all_corners(
        x in 0i32..40, y in 0i32..40, w in 2i32..12, h in 2i32..12,
    ) {
        let tiles = rect_tiles(x, y, w, h);
        let contour = extract_contour(&tiles);
        // Full lattice perimeter
        prop_assert_eq!(contour.len() as i32, 2 * (w + h));

        // Simplification keeps the four corners plus at most the walk's
        // final (collinear) vertex
        let simplified = simplify_contour(&contour);
        prop_assert!(simplified.len() == 4 || simplified.len() == 5);
        for corner in [(y, x), (y, x + w), (y + h, x + w), (y + h, x)] {
            prop_assert!(simplified.contains(&corner));
        }
    }

    #[test]
    fn simplified_contour_is_subset(
        x in 0i32..30, y in 0i32..30, w in 2i32..10, h in 2i32..10, notch in 0i32..4,
    ) {
        // Rectangle with a notch bitten out of one corner
        let mut tiles = rect_tiles(x, y, w, h);
        for d in 0..notch.min(w - 1).min(h - 1) {
            tiles.remove(&(y + d, x + d));
        }
        if tiles.len() < 4 {
            return Ok(());
        }
        let contour = extract_contour(&tiles);
        if contour.len() < 3 {
            return Ok(());
        }
        let simplified = simplify_contour(&contour);
        for v in &simplified {
            prop_assert!(contour.contains(v));
        }
        prop_assert!(simplified.len() <= contour.len());
    }

    #[test]
    fn simplification_is_idempotent(
        x in 0i32..30, y in 0i32..30, w in 2i32..10, h in 2i32..10,
    ) {
        let contour = extract_contour(&rect_tiles(x, y, w, h));
        let once = simplify_contour(&contour);
        let twice = simplify_contour(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn split_pieces_partition_the_region(
        len in 61i32..200, width in 1i32..4,
    ) {
        let tiles = rect_tiles(0, 0, len, width);
        let pieces = split_long_corridor(&tiles);
        prop_assert!(pieces.len() >= 2);

        // Halving a >60-tile strip never produces a droppable (<4 tile)
        // piece, so the pieces partition the region exactly
        let total: usize = pieces.iter().map(|p| p.len()).sum();
        prop_assert_eq!(total, tiles.len());
        for piece in &pieces {
            prop_assert!(piece.len() <= 60);
            prop_assert!(piece.is_subset(&tiles));
        }
    }

    #[test]
    fn polygon_center_inside_corners_outside(
        x in -100.0f64..100.0, y in -100.0f64..100.0, side in 1.0f64..50.0,
    ) {
        let polygon = vec![
            (x, y),
            (x + side, y),
            (x + side, y + side),
            (x, y + side),
        ];
        prop_assert!(point_in_polygon(x + side / 2.0, y + side / 2.0, &polygon));
        prop_assert!(!point_in_polygon(x - 1.0, y - 1.0, &polygon));
        prop_assert!(!point_in_polygon(x + side + 1.0, y + side + 1.0, &polygon));
    }
}
