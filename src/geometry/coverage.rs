//! Polygon rasterization against the tile lattice

use crate::geometry::object::{GeometryObject, ObjectKind};

/// Row-major boolean mask over the tile grid.
#[derive(Debug, Clone)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    bits: Vec<bool>,
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, bits: vec![false; width * height] }
    }

    pub fn get(&self, y: usize, x: usize) -> bool {
        y < self.height && x < self.width && self.bits[y * self.width + x]
    }

    pub fn set(&mut self, y: usize, x: usize, value: bool) {
        if y < self.height && x < self.width {
            self.bits[y * self.width + x] = value;
        }
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Even-odd ray-cast point-in-polygon test.
pub fn point_in_polygon(x: f64, y: f64, polygon: &[(f64, f64)]) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Mark every tile whose center falls inside any polyfloor. World points
/// are mapped back to tile coordinates with the same scale and offset used
/// when the objects were emitted.
pub fn compute_polyfloor_coverage(
    objects: &[GeometryObject],
    grid_size: usize,
    scale_factor: f64,
    offset_x: f64,
    offset_y: f64,
) -> Mask {
    let tile_size = 32.0 * scale_factor;
    let map_center = grid_size as f64 * tile_size / 2.0;
    let mut covered = Mask::new(grid_size, grid_size);

    for obj in objects {
        if obj.kind != ObjectKind::Polyfloor {
            continue;
        }
        let points = obj.points();
        if points.len() < 3 {
            continue;
        }

        let tile_points: Vec<(f64, f64)> = points
            .iter()
            .map(|p| {
                (
                    (p.x - offset_x + map_center) / tile_size,
                    (p.y - offset_y + map_center) / tile_size,
                )
            })
            .collect();

        let min_x = tile_points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let max_x = tile_points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = tile_points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = tile_points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

        let x0 = (min_x as i64).max(0) as usize;
        let x1 = ((max_x as i64) + 1).clamp(0, grid_size as i64) as usize;
        let y0 = (min_y as i64).max(0) as usize;
        let y1 = ((max_y as i64) + 1).clamp(0, grid_size as i64) as usize;

        for ty in y0..y1 {
            for tx in x0..x1 {
                if point_in_polygon(tx as f64 + 0.5, ty as f64 + 0.5, &tile_points) {
                    covered.set(ty, tx, true);
                }
            }
        }
    }

    covered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::object::PointXY;

    #[test]
    fn test_point_in_square() {
        let square = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!(point_in_polygon(5.0, 5.0, &square));
        assert!(!point_in_polygon(15.0, 5.0, &square));
        assert!(!point_in_polygon(-1.0, -1.0, &square));
    }

    #[test]
    fn test_point_in_l_shape() {
        let l_shape = [
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 4.0),
            (0.0, 4.0),
        ];
        assert!(point_in_polygon(1.0, 3.0, &l_shape));
        assert!(!point_in_polygon(3.0, 3.0, &l_shape));
    }

    #[test]
    fn test_coverage_marks_square_floor() {
        // A 4x4 tile polyfloor at tile (10,10), unit scale, centered offsets
        let tile = 32.0;
        let center = 150.0 * tile / 2.0;
        let to_world = |t: f64| t * tile - center;
        let mut obj = GeometryObject::new(ObjectKind::Polyfloor);
        obj.points = Some(vec![
            PointXY::new(to_world(10.0), to_world(10.0)),
            PointXY::new(to_world(14.0), to_world(10.0)),
            PointXY::new(to_world(14.0), to_world(14.0)),
            PointXY::new(to_world(10.0), to_world(14.0)),
        ]);
        let mask = compute_polyfloor_coverage(&[obj], 150, 1.0, 0.0, 0.0);
        assert_eq!(mask.count(), 16);
        assert!(mask.get(12, 12));
        assert!(!mask.get(9, 12));
    }
}
