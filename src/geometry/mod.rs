//! Geometry synthesis: tile maps and room graphs become editor objects

pub mod contour;
pub mod convert;
pub mod coverage;
pub mod heightmap;
pub mod object;
pub mod walls;

pub use convert::LevelConverter;
pub use object::{GeometryObject, ObjectKind, PointXY};

/// World-space pixels per meter.
pub const METER: f64 = 32.0;
