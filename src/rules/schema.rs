//! Rule schema document served to editor frontends

use serde_json::{json, Value};

/// Schema describing the tunable rule categories, with a worked example
/// override payload.
pub fn rules_schema() -> Value {
    json!({
        "schema": {
            "timing": {
                "label": "Timing balance",
                "params": {
                    "atk_to_site": {"label": "Attack to site", "type": "range", "default": [60, 90], "unit": "tiles"},
                    "def_to_site": {"label": "Defense to site", "type": "range", "default": [40, 70], "unit": "tiles"},
                    "rotation": {"label": "Rotation", "type": "range", "default": [50, 80], "unit": "tiles"},
                }
            },
            "entries": {
                "label": "Entries",
                "params": {
                    "per_site": {"label": "Entries per site", "type": "range", "default": [1, 2], "unit": "count"},
                    "chokes_per_site": {"label": "Chokes per site", "type": "range", "default": [1, 2], "unit": "count"},
                }
            },
            "sightlines": {
                "label": "Sightlines",
                "params": {
                    "max_length": {"label": "Max sightline", "type": "number", "default": 50, "unit": "m"},
                    "to_site": {"label": "Sightline into site", "type": "range", "default": [15, 35], "unit": "m"},
                }
            },
            "cover": {
                "label": "Cover",
                "params": {
                    "spacing": {"label": "Cover spacing", "type": "range", "default": [8, 15], "unit": "m"},
                    "exposed_max": {"label": "Max exposed run", "type": "number", "default": 12, "unit": "m"},
                }
            },
            "corridors": {
                "label": "Corridors",
                "params": {
                    "max_straight": {"label": "Max straight run", "type": "number", "default": 25, "unit": "m"},
                    "width": {"label": "Corridor width", "type": "range", "default": [4, 7], "unit": "m"},
                }
            },
            "angles": {
                "label": "Angles",
                "params": {
                    "per_site": {"label": "Angles per site", "type": "range", "default": [3, 5], "unit": "count"},
                }
            }
        },
        "example": {
            "timing": {
                "atk_to_site": [50, 80],
                "def_to_site": [30, 60],
                "rotation": [40, 70]
            },
            "entries": {
                "per_site": [2, 3],
                "chokes_per_site": [1, 2]
            },
            "sightlines": {
                "max_length": 40,
                "to_site": [15, 30]
            },
            "cover": {
                "spacing": [6, 12],
                "exposed_max": 10
            },
            "corridors": {
                "max_straight": 20,
                "width": [4, 6]
            },
            "angles": {
                "per_site": [2, 4]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_all_categories() {
        let doc = rules_schema();
        let schema = doc.get("schema").unwrap();
        for category in ["timing", "entries", "sightlines", "cover", "corridors", "angles"] {
            assert!(schema.get(category).is_some(), "missing category {category}");
        }
        assert!(doc.get("example").is_some());
    }
}
