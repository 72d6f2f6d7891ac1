//! LevelForge - Procedural tactical level layout synthesis

pub mod api;
pub mod core;
pub mod geometry;
pub mod grid;
pub mod layout;
pub mod rules;
pub mod server;
