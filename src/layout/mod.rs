//! Layout strategies
//!
//! Three ways to lay out a map: `grid_rules` carves rectangular rooms and
//! orthogonal corridors from a design-rule table, `organic` partitions the
//! grid with a noisy Voronoi diagram and grows irregular rooms, and
//! `vector` skips the tile grid entirely and emits star polygons directly.

pub mod grid_rules;
pub mod organic;
pub mod vector;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::core::error::LevelError;

/// Which layout strategy to run. The wire names are versioned short codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Rule-driven rectangular rooms and corridors (wire name `v2`).
    #[default]
    GridRules,
    /// Noisy Voronoi partitioning with frontier-grown rooms (`v3`).
    Organic,
    /// Grid-free star polygons (`v4`).
    Vector,
}

impl FromStr for Algorithm {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v2" => Ok(Algorithm::GridRules),
            "v3" => Ok(Algorithm::Organic),
            "v4" => Ok(Algorithm::Vector),
            other => Err(LevelError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::GridRules => "v2",
            Algorithm::Organic => "v3",
            Algorithm::Vector => "v4",
        })
    }
}

/// Normalized (0..1) node position from the layout preview.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NormPoint {
    pub x: f64,
    pub y: f64,
}

/// User-pinned node positions keyed by node name (`atk`, `def`, `mid`,
/// `siteA`..`siteC`, `sideA`, `lobbyA`, `mainA`, `chokeA`, `heavenA`,
/// `midTop`, `midEntrance`, and the B variants).
pub type UserLayout = HashMap<String, NormPoint>;
