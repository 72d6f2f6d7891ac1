//! Tile types and the square tile grid
//!
//! One tile is one meter. The grid starts all-void; layout strategies carve
//! floors and markers into it, then walls are stamped around the walkable
//! area as a final pass.

/// Cell classification on the layout grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tile {
    Void = 0,
    Floor = 1,
    Wall = 2,
    CoverHalf = 3,
    CoverFull = 4,
    Box = 5,
    SiteA = 6,
    SiteB = 7,
    SpawnAttack = 8,
    SpawnDefense = 9,
    Ramp = 10,
    Pillar = 11,
}

impl Tile {
    /// Everything a player can stand on, markers included.
    pub fn is_walkable(self) -> bool {
        !matches!(self, Tile::Void | Tile::Wall)
    }

    /// Plain floor area: floor plus cover props sitting on floor. Marker
    /// tiles are excluded so site and spawn zones convert to their own
    /// regions.
    pub fn is_open_floor(self) -> bool {
        matches!(self, Tile::Floor | Tile::CoverHalf | Tile::CoverFull | Tile::Box)
    }

    /// Tiles a route-check may traverse: floor and the zone markers, but
    /// not cover (a path blocked by cover on all sides is not a route).
    pub fn is_route(self) -> bool {
        matches!(
            self,
            Tile::Floor | Tile::SiteA | Tile::SiteB | Tile::SpawnAttack | Tile::SpawnDefense
        )
    }
}

/// Square grid of tiles, row-major.
#[derive(Debug, Clone)]
pub struct TileGrid {
    size: usize,
    cells: Vec<Tile>,
}

impl TileGrid {
    pub fn new(size: usize) -> Self {
        Self { size, cells: vec![Tile::Void; size * size] }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.size && (col as usize) < self.size
    }

    /// Tile at (row, col); out-of-bounds reads as void.
    pub fn get(&self, row: i32, col: i32) -> Tile {
        if self.in_bounds(row, col) {
            self.cells[row as usize * self.size + col as usize]
        } else {
            Tile::Void
        }
    }

    /// Set a tile; out-of-bounds writes are dropped.
    pub fn set(&mut self, row: i32, col: i32, tile: Tile) {
        if self.in_bounds(row, col) {
            self.cells[row as usize * self.size + col as usize] = tile;
        }
    }

    /// Carve a tile only if the cell is currently void. Corridors use this
    /// so they never punch through rooms or cover.
    pub fn carve(&mut self, row: i32, col: i32, tile: Tile) {
        if self.in_bounds(row, col) && self.get(row, col) == Tile::Void {
            self.set(row, col, tile);
        }
    }

    /// Row-major iteration over all cells.
    pub fn iter_cells(&self) -> impl Iterator<Item = (i32, i32, Tile)> + '_ {
        let size = self.size as i32;
        (0..size).flat_map(move |row| (0..size).map(move |col| (row, col, self.get(row, col))))
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.cells.iter().filter(|&&t| t == tile).count()
    }
}
