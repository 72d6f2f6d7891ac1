//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Rectangular world-space bounds of a generation request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "Bounds::default_extent")]
    pub width: f64,
    #[serde(default = "Bounds::default_extent")]
    pub height: f64,
}

impl Bounds {
    fn default_extent() -> f64 {
        4800.0
    }

    /// World offset that places the map center at the bounds center
    pub fn center_offset(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, width: 4800.0, height: 4800.0 }
    }
}

/// 2D world-space point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Tile-grid cell position (row, col)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub row: i32,
    pub col: i32,
}

impl GridPos {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// 4-connected neighbors (up, down, left, right)
    pub fn neighbors4(&self) -> [GridPos; 4] {
        [
            GridPos::new(self.row - 1, self.col),
            GridPos::new(self.row + 1, self.col),
            GridPos::new(self.row, self.col - 1),
            GridPos::new(self.row, self.col + 1),
        ]
    }

    /// Chebyshev distance (max of axis distances)
    pub fn chebyshev(&self, other: &GridPos) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    pub fn manhattan(&self, other: &GridPos) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_center_offset() {
        let b = Bounds { x: 100.0, y: -200.0, width: 4800.0, height: 4800.0 };
        assert_eq!(b.center_offset(), (2500.0, 2200.0));
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = GridPos::new(0, 0);
        let b = GridPos::new(3, -7);
        assert_eq!(a.chebyshev(&b), 7);
        assert_eq!(a.manhattan(&b), 10);
    }
}
