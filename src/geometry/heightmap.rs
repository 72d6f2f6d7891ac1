//! Post-processing of existing levels: outline walls and cliff edges
//!
//! Both passes rasterize every floor-like object (polyfloors plus the
//! rectangular spawn/objective markers) onto a 1m grid spanning the level
//! bounds, then walk cell boundaries. Each cell is tested at five points
//! (center plus four inset corners); the first point that lands in any
//! floor decides the cell.

use std::collections::BTreeMap;

use crate::geometry::coverage::point_in_polygon;
use crate::geometry::object::{GeometryObject, ObjectKind, PointXY};
use crate::geometry::METER;

const WALL_ID_BASE: u64 = 90_000;
const CLIFF_ID_BASE: u64 = 95_000;

/// Options for the wall pass.
#[derive(Debug, Clone, Copy)]
pub struct WallOptions {
    /// Wall height in meters.
    pub wall_height: f64,
    /// Wall thickness in meters.
    pub wall_thickness: f64,
}

impl Default for WallOptions {
    fn default() -> Self {
        Self { wall_height: 4.0, wall_thickness: 1.0 }
    }
}

/// Options for the cliff pass.
#[derive(Debug, Clone, Copy)]
pub struct CliffOptions {
    /// Drop in meters where a floor borders the void.
    pub default_depth: f64,
    /// Minimum floor height difference (meters) that counts as a cliff.
    pub min_height_diff: f64,
}

impl Default for CliffOptions {
    fn default() -> Self {
        Self { default_depth: 8.0, min_height_diff: 0.1 }
    }
}

/// Rasterized height field over the level bounds. `None` cells are void.
struct HeightGrid {
    min_x: f64,
    min_y: f64,
    width: usize,
    height: usize,
    cells: Vec<Option<f64>>,
}

impl HeightGrid {
    fn get(&self, gy: i32, gx: i32) -> Option<f64> {
        if gy < 0 || gx < 0 || gy as usize >= self.height || gx as usize >= self.width {
            None
        } else {
            self.cells[gy as usize * self.width + gx as usize]
        }
    }

    /// Pixel x of a vertical lattice line.
    fn line_x(&self, gx: i32) -> f64 {
        self.min_x + gx as f64 * METER
    }

    fn line_y(&self, gy: i32) -> f64 {
        self.min_y + gy as f64 * METER
    }
}

/// Whether the point lands inside the object's floor area.
fn object_contains(obj: &GeometryObject, px: f64, py: f64) -> bool {
    let points = obj.points();
    if points.len() >= 3 {
        let polygon: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
        point_in_polygon(px, py, &polygon)
    } else {
        // Markers are rectangles anchored at their top-left corner
        let ox = obj.x.unwrap_or(0.0);
        let oy = obj.y.unwrap_or(0.0);
        let ow = obj.width.unwrap_or(64.0);
        let oh = obj.height.unwrap_or(64.0);
        (ox..=ox + ow).contains(&px) && (oy..=oy + oh).contains(&py)
    }
}

fn rasterize(floors: &[&GeometryObject]) -> Option<HeightGrid> {
    let mut all_x: Vec<f64> = Vec::new();
    let mut all_y: Vec<f64> = Vec::new();
    for obj in floors {
        let points = obj.points();
        if !points.is_empty() {
            for p in points {
                all_x.push(p.x);
                all_y.push(p.y);
            }
        } else {
            let x = obj.x.unwrap_or(0.0);
            let y = obj.y.unwrap_or(0.0);
            let w = obj.width.unwrap_or(64.0);
            let h = obj.height.unwrap_or(64.0);
            all_x.extend([x, x + w]);
            all_y.extend([y, y + h]);
        }
    }
    if all_x.is_empty() {
        return None;
    }

    let min_x = all_x.iter().copied().fold(f64::INFINITY, f64::min);
    let max_x = all_x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_y = all_y.iter().copied().fold(f64::INFINITY, f64::min);
    let max_y = all_y.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let width = ((max_x - min_x) / METER) as usize + 2;
    let height = ((max_y - min_y) / METER) as usize + 2;
    let mut grid = HeightGrid { min_x, min_y, width, height, cells: vec![None; width * height] };

    for gy in 0..height {
        for gx in 0..width {
            let (gxf, gyf) = (gx as f64, gy as f64);
            let check_points = [
                (min_x + (gxf + 0.5) * METER, min_y + (gyf + 0.5) * METER),
                (min_x + gxf * METER + 1.0, min_y + gyf * METER + 1.0),
                (min_x + (gxf + 1.0) * METER - 1.0, min_y + gyf * METER + 1.0),
                (min_x + gxf * METER + 1.0, min_y + (gyf + 1.0) * METER - 1.0),
                (min_x + (gxf + 1.0) * METER - 1.0, min_y + (gyf + 1.0) * METER - 1.0),
            ];

            'cell: for (cx, cy) in check_points {
                for obj in floors {
                    if object_contains(obj, cx, cy) {
                        grid.cells[gy * width + gx] = Some(obj.floor_height_or_zero());
                        break 'cell;
                    }
                }
            }
        }
    }

    Some(grid)
}

/// Segment on a lattice line, tagged with its wall/cliff parameters.
/// Grouping by line index plus tag keeps runs with different heights apart.
type LineRuns = BTreeMap<(i32, u64), Vec<(i32, i32, f64, f64)>>;

fn tag(from_height: f64, depth: f64) -> u64 {
    // Heights come out of the same arithmetic on both sides of a merge, so
    // bit-exact equality is the right grouping key.
    (from_height.to_bits() >> 1) ^ depth.to_bits()
}

fn merge_line_runs(lines: LineRuns) -> Vec<(i32, i32, i32, f64, f64)> {
    let mut merged = Vec::new();
    for ((line, _), mut segments) in lines {
        segments.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        let mut iter = segments.into_iter();
        let Some((mut start, mut end, from_h, depth)) = iter.next() else { continue };
        for (s, e, fh, d) in iter {
            if s <= end && fh == from_h && d == depth {
                end = end.max(e);
            } else {
                merged.push((line, start, end, from_h, depth));
                start = s;
                end = e;
            }
        }
        merged.push((line, start, end, from_h, depth));
    }
    merged
}

/// Outline walls for an existing level: a wall segment on every boundary
/// between rasterized floor and void. Walls always rise from ground level.
pub fn generate_walls_from_polygon_edges(
    objects: &[GeometryObject],
    options: WallOptions,
) -> Vec<GeometryObject> {
    let floors: Vec<&GeometryObject> =
        objects.iter().filter(|o| o.kind.is_floor_like()).collect();
    let Some(grid) = rasterize(&floors) else { return Vec::new() };

    let mut h_lines: LineRuns = BTreeMap::new();
    let mut v_lines: LineRuns = BTreeMap::new();
    let mut edge_count = 0usize;

    for gy in 0..grid.height as i32 {
        for gx in 0..grid.width as i32 {
            if grid.get(gy, gx).is_none() {
                continue;
            }
            let mut add = |lines: &mut LineRuns, line: i32, start: i32| {
                lines.entry((line, 0)).or_default().push((start, start + 1, 0.0, 0.0));
                edge_count += 1;
            };
            if grid.get(gy - 1, gx).is_none() {
                add(&mut h_lines, gy, gx);
            }
            if grid.get(gy + 1, gx).is_none() {
                add(&mut h_lines, gy + 1, gx);
            }
            if grid.get(gy, gx - 1).is_none() {
                add(&mut v_lines, gx, gy);
            }
            if grid.get(gy, gx + 1).is_none() {
                add(&mut v_lines, gx + 1, gy);
            }
        }
    }

    let mut walls = Vec::new();
    let mut wall_id = WALL_ID_BASE;
    let push = |p1: PointXY, p2: PointXY, id: &mut u64, out: &mut Vec<GeometryObject>| {
        let mut obj = GeometryObject::new(ObjectKind::Polywall);
        obj.id = Some(*id);
        *id += 1;
        obj.category = Some("walls".into());
        obj.floor = Some(0);
        obj.color = Some("#2a3540".into());
        obj.points = Some(vec![p1, p2]);
        obj.thickness = Some(options.wall_thickness * METER);
        obj.height = Some(options.wall_height * METER);
        obj.from_height = Some(0.0);
        obj.label = Some(String::new());
        out.push(obj);
    };

    for (gy, x1, x2, _, _) in merge_line_runs(h_lines) {
        let py = grid.line_y(gy);
        push(
            PointXY::new(grid.line_x(x1), py),
            PointXY::new(grid.line_x(x2), py),
            &mut wall_id,
            &mut walls,
        );
    }
    for (gx, y1, y2, _, _) in merge_line_runs(v_lines) {
        let px = grid.line_x(gx);
        push(
            PointXY::new(px, grid.line_y(y1)),
            PointXY::new(px, grid.line_y(y2)),
            &mut wall_id,
            &mut walls,
        );
    }

    tracing::debug!(walls = walls.len(), edges = edge_count, "post-process walls");
    walls
}

/// Cliff edges for an existing level: floor/void boundaries drop by the
/// default depth, and boundaries between floors of different heights drop
/// by the difference, emitted from the higher side only.
pub fn generate_cliffs_from_polygon_edges(
    objects: &[GeometryObject],
    options: CliffOptions,
) -> Vec<GeometryObject> {
    let floors: Vec<&GeometryObject> =
        objects.iter().filter(|o| o.kind.is_floor_like()).collect();
    let Some(grid) = rasterize(&floors) else { return Vec::new() };

    let mut h_lines: LineRuns = BTreeMap::new();
    let mut v_lines: LineRuns = BTreeMap::new();
    let mut edge_count = 0usize;

    for gy in 0..grid.height as i32 {
        for gx in 0..grid.width as i32 {
            let Some(h) = grid.get(gy, gx) else { continue };

            let classify = |neighbor: Option<f64>| -> Option<(f64, f64)> {
                match neighbor {
                    None => Some((h, options.default_depth)),
                    Some(nh) if (h - nh).abs() >= options.min_height_diff && h > nh => {
                        Some((h, h - nh))
                    }
                    Some(_) => None,
                }
            };

            let sides = [
                (grid.get(gy - 1, gx), true, gy, gx),
                (grid.get(gy + 1, gx), true, gy + 1, gx),
                (grid.get(gy, gx - 1), false, gx, gy),
                (grid.get(gy, gx + 1), false, gx + 1, gy),
            ];
            for (neighbor, horizontal, line, start) in sides {
                if let Some((from_h, depth)) = classify(neighbor) {
                    let lines = if horizontal { &mut h_lines } else { &mut v_lines };
                    lines
                        .entry((line, tag(from_h, depth)))
                        .or_default()
                        .push((start, start + 1, from_h, depth));
                    edge_count += 1;
                }
            }
        }
    }

    let mut cliffs = Vec::new();
    let mut cliff_id = CLIFF_ID_BASE;
    let push = |p1: PointXY, p2: PointXY, from_h: f64, depth: f64, id: &mut u64, out: &mut Vec<GeometryObject>| {
        let mut obj = GeometryObject::new(ObjectKind::Polycliff);
        obj.id = Some(*id);
        *id += 1;
        obj.category = Some("cliffs".into());
        obj.floor = Some(0);
        obj.color = Some("#1a2530".into());
        obj.points = Some(vec![p1, p2]);
        obj.depth = Some(depth * METER);
        obj.from_height = Some(from_h * METER);
        obj.label = Some(String::new());
        out.push(obj);
    };

    for (gy, x1, x2, from_h, depth) in merge_line_runs(h_lines) {
        let py = grid.line_y(gy);
        push(
            PointXY::new(grid.line_x(x1), py),
            PointXY::new(grid.line_x(x2), py),
            from_h,
            depth,
            &mut cliff_id,
            &mut cliffs,
        );
    }
    for (gx, y1, y2, from_h, depth) in merge_line_runs(v_lines) {
        let px = grid.line_x(gx);
        push(
            PointXY::new(px, grid.line_y(y1)),
            PointXY::new(px, grid.line_y(y2)),
            from_h,
            depth,
            &mut cliff_id,
            &mut cliffs,
        );
    }

    tracing::debug!(cliffs = cliffs.len(), edges = edge_count, "post-process cliffs");
    cliffs
}
