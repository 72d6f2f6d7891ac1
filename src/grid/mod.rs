//! Tile grid primitives and carving operations

pub mod ops;
pub mod room;
pub mod tile;

pub use room::{Room, RoomTable};
pub use tile::{Tile, TileGrid};
