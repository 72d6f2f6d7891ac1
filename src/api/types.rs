//! Wire types for the HTTP surface

use serde::{Deserialize, Serialize};

use crate::core::types::{Bounds, WorldPoint};
use crate::geometry::object::GeometryObject;
use crate::layout::UserLayout;
use crate::rules::RulesOverride;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default)]
    pub options: GenerateOptions,
}

#[derive(Debug, Deserialize)]
pub struct GenerateOptions {
    /// Absent means a fresh random seed; the response echoes whichever was
    /// used.
    pub seed: Option<u64>,
    pub rules: Option<RulesOverride>,
    pub algorithm: Option<String>,
    #[serde(default = "GenerateOptions::default_site_count")]
    pub site_count: u8,
    #[serde(default = "GenerateOptions::default_grid_size")]
    pub grid_size: usize,
    pub layout: Option<UserLayout>,
    #[serde(default)]
    pub walls: WallsToggle,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: None,
            rules: None,
            algorithm: None,
            site_count: Self::default_site_count(),
            grid_size: Self::default_grid_size(),
            layout: None,
            walls: WallsToggle::default(),
        }
    }
}

impl GenerateOptions {
    fn default_site_count() -> u8 {
        2
    }

    fn default_grid_size() -> usize {
        150
    }
}

/// Wall passes are off by default; the editor triggers them manually.
#[derive(Debug, Default, Deserialize)]
pub struct WallsToggle {
    #[serde(default)]
    pub perimeter: bool,
    #[serde(default)]
    pub gaps: bool,
}

#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub objects: Vec<GeometryObject>,
    pub bounds: Bounds,
    pub seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    #[serde(default)]
    pub start: WorldPoint,
    #[serde(default = "ConnectRequest::default_end")]
    pub end: WorldPoint,
    #[serde(default)]
    pub options: ConnectOptions,
}

impl ConnectRequest {
    fn default_end() -> WorldPoint {
        WorldPoint::new(100.0, 100.0)
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectOptions {
    /// Corridor width in meters.
    #[serde(default = "ConnectOptions::default_width")]
    pub width: f64,
    pub seed: Option<u64>,
    /// Accepted for obstacle-aware routing; the current router does not
    /// consult it.
    #[serde(default)]
    pub existing_objects: Vec<GeometryObject>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self { width: Self::default_width(), seed: None, existing_objects: Vec::new() }
    }
}

impl ConnectOptions {
    fn default_width() -> f64 {
        5.0
    }
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub objects: Vec<GeometryObject>,
    pub start: WorldPoint,
    pub end: WorldPoint,
}

#[derive(Debug, Deserialize)]
pub struct WallPassRequest {
    #[serde(default)]
    pub objects: Vec<GeometryObject>,
    #[serde(default)]
    pub options: WallPassOptions,
}

#[derive(Debug, Deserialize)]
pub struct WallPassOptions {
    #[serde(default = "WallPassOptions::default_height")]
    pub wall_height: f64,
    #[serde(default = "WallPassOptions::default_thickness")]
    pub wall_thickness: f64,
}

impl Default for WallPassOptions {
    fn default() -> Self {
        Self { wall_height: Self::default_height(), wall_thickness: Self::default_thickness() }
    }
}

impl WallPassOptions {
    fn default_height() -> f64 {
        4.0
    }

    fn default_thickness() -> f64 {
        1.0
    }
}

#[derive(Debug, Serialize)]
pub struct WallPassResponse {
    pub walls: Vec<GeometryObject>,
}

#[derive(Debug, Deserialize)]
pub struct CliffPassRequest {
    #[serde(default)]
    pub objects: Vec<GeometryObject>,
    #[serde(default)]
    pub options: CliffPassOptions,
}

#[derive(Debug, Deserialize)]
pub struct CliffPassOptions {
    #[serde(default = "CliffPassOptions::default_depth")]
    pub default_depth: f64,
    #[serde(default = "CliffPassOptions::default_min_diff")]
    pub min_height_diff: f64,
}

impl Default for CliffPassOptions {
    fn default() -> Self {
        Self { default_depth: Self::default_depth(), min_height_diff: Self::default_min_diff() }
    }
}

impl CliffPassOptions {
    fn default_depth() -> f64 {
        8.0
    }

    fn default_min_diff() -> f64 {
        0.1
    }
}

#[derive(Debug, Serialize)]
pub struct CliffPassResponse {
    pub cliffs: Vec<GeometryObject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_defaults() {
        let req: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.bounds.width, 4800.0);
        assert_eq!(req.options.site_count, 2);
        assert_eq!(req.options.grid_size, 150);
        assert!(!req.options.walls.perimeter);
        assert!(req.options.seed.is_none());
    }

    #[test]
    fn test_generate_request_full() {
        let req: GenerateRequest = serde_json::from_str(
            r#"{
                "bounds": {"x": 100, "y": 200, "width": 3200, "height": 3200},
                "options": {
                    "seed": 7,
                    "algorithm": "v3",
                    "site_count": 3,
                    "layout": {"siteA": {"x": 0.25, "y": 0.7}},
                    "walls": {"perimeter": true}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(req.options.seed, Some(7));
        assert_eq!(req.options.algorithm.as_deref(), Some("v3"));
        assert!(req.options.walls.perimeter);
        assert!(!req.options.walls.gaps);
        assert!(req.options.layout.unwrap().contains_key("siteA"));
    }

    #[test]
    fn test_cliff_options_defaults() {
        let req: CliffPassRequest = serde_json::from_str(r#"{"objects": []}"#).unwrap();
        assert_eq!(req.options.default_depth, 8.0);
        assert_eq!(req.options.min_height_diff, 0.1);
    }
}
