//! Map generation entry point shared by the HTTP handlers and tests

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::api::types::{GenerateOptions, MapResponse};
use crate::core::error::{LevelError, Result};
use crate::core::types::Bounds;
use crate::geometry::convert::LevelConverter;
use crate::geometry::coverage::compute_polyfloor_coverage;
use crate::geometry::walls::{fill_polyfloor_gaps, generate_perimeter_walls};
use crate::geometry::METER;
use crate::layout::{grid_rules, organic, vector, Algorithm};
use crate::rules::DesignRules;

pub fn generate_map(bounds: Bounds, options: &GenerateOptions) -> Result<MapResponse> {
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return Err(LevelError::DegenerateBounds { width: bounds.width, height: bounds.height });
    }
    if !(1..=3).contains(&options.site_count) {
        return Err(LevelError::InvalidSiteCount(options.site_count));
    }

    let algorithm: Algorithm = options.algorithm.as_deref().unwrap_or("v2").parse()?;
    let seed = options.seed.unwrap_or_else(|| rand::thread_rng().gen_range(0..1_000_000));
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let grid_size = options.grid_size;
    let target_size = bounds.width.min(bounds.height);
    let scale_factor = target_size / (grid_size as f64 * METER);
    let (offset_x, offset_y) = bounds.center_offset();

    tracing::debug!(seed, %algorithm, site_count = options.site_count, "generating map");

    if algorithm == Algorithm::Vector {
        let mut rules = DesignRules::vector();
        if let Some(over) = &options.rules {
            rules.apply_flat_override(over);
        }
        let mut objects = vector::generate(&mut rng, &rules);

        // Vector output is centered in its own meter space; rescale into
        // the requested bounds.
        let half_extent = grid_size as f64 * METER / 2.0;
        let shift_x = offset_x - half_extent * scale_factor;
        let shift_y = offset_y - half_extent * scale_factor;
        for obj in &mut objects {
            if let Some(x) = &mut obj.x {
                *x = *x * scale_factor + shift_x;
            }
            if let Some(y) = &mut obj.y {
                *y = *y * scale_factor + shift_y;
            }
            if let Some(w) = &mut obj.width {
                *w *= scale_factor;
            }
            if let Some(h) = &mut obj.height {
                *h *= scale_factor;
            }
            if let Some(points) = &mut obj.points {
                for pt in points {
                    pt.x = pt.x * scale_factor + shift_x;
                    pt.y = pt.y * scale_factor + shift_y;
                }
            }
        }

        return Ok(MapResponse { objects, bounds, seed, algorithm: Some("v4".to_string()) });
    }

    let (grid, rooms) = match algorithm {
        Algorithm::Organic => {
            let mut rules = DesignRules::organic();
            if let Some(over) = &options.rules {
                rules.apply_override(over);
            }
            organic::generate(&mut rng, &rules, grid_size)
        }
        _ => {
            let mut rules = DesignRules::grid_rules();
            if let Some(over) = &options.rules {
                rules.apply_override(over);
            }
            grid_rules::generate(
                &mut rng,
                &rules,
                grid_size,
                options.site_count,
                options.layout.as_ref(),
            )
        }
    };

    let mut objects = LevelConverter::new(&grid, &rooms, scale_factor).convert();

    for obj in &mut objects {
        if let Some(x) = &mut obj.x {
            *x += offset_x;
        }
        if let Some(y) = &mut obj.y {
            *y += offset_y;
        }
        if let Some(points) = &mut obj.points {
            for pt in points {
                pt.x += offset_x;
                pt.y += offset_y;
            }
        }
    }

    let covered = compute_polyfloor_coverage(&objects, grid_size, scale_factor, offset_x, offset_y);
    let floor_tiles = grid
        .iter_cells()
        .filter(|&(_, _, t)| t != crate::grid::Tile::Void)
        .count();
    tracing::debug!(covered = covered.count(), floor_tiles, "polyfloor coverage");

    if options.walls.perimeter {
        let walls = generate_perimeter_walls(
            &covered,
            scale_factor,
            offset_x,
            offset_y,
            32.0 * scale_factor,
            128.0 * scale_factor,
        );
        objects.extend(walls);
    }
    if options.walls.gaps {
        let gap_walls = fill_polyfloor_gaps(
            &objects,
            &grid,
            scale_factor,
            offset_x,
            offset_y,
            128.0 * scale_factor,
        );
        objects.extend(gap_walls);
    }

    Ok(MapResponse { objects, bounds, seed, algorithm: None })
}
