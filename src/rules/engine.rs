//! Design-rule engine
//!
//! Every placement and routing routine draws its dimensions and offsets from
//! a [`DesignRules`] table rather than hardcoded constants. Each layout
//! strategy ships its own defaults; caller overrides arrive keyed by category
//! (timing, entries, sightlines, cover, corridors, angles, sizes) and are
//! merged over the defaults. Unrecognized keys are ignored.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// A single named rule: either a scalar or a (low, high) draw range.
///
/// Ranges follow inclusive-low / exclusive-high draw semantics, so a
/// two-element override `[a, b]` is stored as `Range(a, b + 1)` to keep `b`
/// drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleValue {
    Scalar(f64),
    Range(f64, f64),
}

/// Caller-supplied rule overrides: category -> parameter -> value.
pub type RulesOverride = HashMap<String, HashMap<String, serde_json::Value>>;

/// Mapping from (category, key) in an override payload to the internal rule
/// name it targets.
type RuleMapping = &'static [(&'static str, &'static str, &'static str)];

const GRID_RULES_MAPPING: RuleMapping = &[
    ("timing", "atk_to_site", "atk_to_site_time"),
    ("timing", "def_to_site", "def_to_site_time"),
    ("timing", "rotation", "rotation_time"),
    ("entries", "per_site", "chokes_per_site"),
    ("entries", "chokes_per_site", "chokes_per_site"),
    ("sightlines", "max_length", "max_sightline"),
    ("sightlines", "to_site", "sightline_to_site"),
    ("cover", "spacing", "cover_spacing"),
    ("cover", "exposed_max", "exposed_max"),
    ("corridors", "max_straight", "max_straight_corridor"),
    ("corridors", "width", "corridor_width"),
    ("corridors", "min_width", "corridor_min_width"),
    ("corridors", "max_width", "corridor_max_width"),
    ("angles", "per_site", "angles_per_site"),
    ("sizes", "site", "site_size"),
    ("sizes", "spawn", "spawn_size"),
    ("sizes", "room", "room_size"),
];

const ORGANIC_MAPPING: RuleMapping = &[
    ("timing", "atk_to_site", "atk_to_site_time"),
    ("corridors", "max_straight", "max_straight_corridor"),
    ("corridors", "width", "corridor_width"),
    ("organic", "level", "organic_level"),
    ("organic", "diagonal", "diagonal_ratio"),
    ("organic", "noise", "corner_noise"),
    ("organic", "irregularity", "room_irregularity"),
    ("complexity", "paths", "path_complexity"),
    ("complexity", "loops", "loop_count"),
    ("complexity", "flanks", "flank_routes"),
];

/// Flat rule-name -> value table for one generation call.
#[derive(Debug, Clone)]
pub struct DesignRules {
    values: HashMap<String, RuleValue>,
    mapping: RuleMapping,
    /// Whether list overrides widen the high bound by one to keep it
    /// drawable under exclusive-high semantics.
    exclusive_high_lists: bool,
}

impl DesignRules {
    /// Defaults for the grid-rules (v2) strategy.
    pub fn grid_rules() -> Self {
        let mut values = HashMap::new();
        let defaults = [
            // Base sizes (tiles; 1 tile = 1m)
            ("site_size", RuleValue::Range(24.0, 32.0)),
            ("spawn_size", RuleValue::Range(20.0, 28.0)),
            ("room_size", RuleValue::Range(12.0, 22.0)),
            ("corridor_width", RuleValue::Range(4.0, 7.0)),
            // Timing balance (tiles, ~5m/s movement)
            ("atk_to_site_time", RuleValue::Range(60.0, 90.0)),
            ("def_to_site_time", RuleValue::Range(40.0, 70.0)),
            ("rotation_time", RuleValue::Range(50.0, 80.0)),
            // Sightlines
            ("max_sightline", RuleValue::Scalar(50.0)),
            ("min_sightline", RuleValue::Scalar(8.0)),
            ("sightline_to_site", RuleValue::Range(15.0, 35.0)),
            // Chokepoints
            ("choke_width", RuleValue::Range(3.0, 6.0)),
            ("chokes_per_site", RuleValue::Range(1.0, 2.0)),
            // Cover
            ("cover_spacing", RuleValue::Range(8.0, 15.0)),
            ("exposed_max", RuleValue::Scalar(12.0)),
            // Angles
            ("angles_per_site", RuleValue::Range(3.0, 5.0)),
            // Boredom guards
            ("max_straight_corridor", RuleValue::Scalar(15.0)),
            ("corridor_turn_interval", RuleValue::Range(8.0, 15.0)),
            // Corridor width clamps
            ("corridor_min_width", RuleValue::Scalar(4.0)),
            ("corridor_max_width", RuleValue::Scalar(8.0)),
        ];
        for (name, value) in defaults {
            values.insert(name.to_string(), value);
        }
        Self { values, mapping: GRID_RULES_MAPPING, exclusive_high_lists: true }
    }

    /// Defaults for the organic (v3) strategy.
    pub fn organic() -> Self {
        let mut values = HashMap::new();
        let defaults = [
            ("site_size", RuleValue::Range(20.0, 35.0)),
            ("spawn_size", RuleValue::Range(18.0, 28.0)),
            ("room_size", RuleValue::Range(8.0, 25.0)),
            ("corridor_width", RuleValue::Range(4.0, 8.0)),
            // Organic shaping
            ("organic_level", RuleValue::Scalar(0.5)),
            ("diagonal_ratio", RuleValue::Scalar(0.3)),
            ("corner_noise", RuleValue::Scalar(0.2)),
            ("room_irregularity", RuleValue::Scalar(0.4)),
            // Connection complexity
            ("path_complexity", RuleValue::Scalar(3.0)),
            ("loop_count", RuleValue::Scalar(2.0)),
            ("flank_routes", RuleValue::Scalar(2.0)),
            // Timing
            ("max_straight_corridor", RuleValue::Scalar(20.0)),
            ("corridor_min_width", RuleValue::Scalar(4.0)),
            ("corridor_max_width", RuleValue::Scalar(8.0)),
        ];
        for (name, value) in defaults {
            values.insert(name.to_string(), value);
        }
        Self { values, mapping: ORGANIC_MAPPING, exclusive_high_lists: false }
    }

    /// Defaults for the vector (v4) strategy.
    ///
    /// Vector overrides are flattened `category_key` names rather than a
    /// mapping table, so the mapping here is empty.
    pub fn vector() -> Self {
        let mut values = HashMap::new();
        let defaults = [
            ("map_size", RuleValue::Scalar(150.0)),
            ("site_size", RuleValue::Range(25.0, 35.0)),
            ("spawn_size", RuleValue::Range(20.0, 28.0)),
            ("room_size", RuleValue::Range(12.0, 25.0)),
            ("corridor_width", RuleValue::Range(4.0, 7.0)),
            ("organic_level", RuleValue::Scalar(0.6)),
            ("vertex_noise", RuleValue::Scalar(8.0)),
            ("min_vertices", RuleValue::Scalar(5.0)),
            ("max_vertices", RuleValue::Scalar(8.0)),
            ("diagonal_probability", RuleValue::Scalar(0.4)),
            ("angle_variation", RuleValue::Scalar(15.0)),
        ];
        for (name, value) in defaults {
            values.insert(name.to_string(), value);
        }
        Self { values, mapping: &[], exclusive_high_lists: false }
    }

    /// Merge a caller override into this rule table.
    ///
    /// Recognized (category, key) pairs overwrite their target rule;
    /// everything else is ignored.
    pub fn apply_override(&mut self, over: &RulesOverride) {
        for &(category, key, target) in self.mapping {
            let Some(params) = over.get(category) else { continue };
            let Some(value) = params.get(key) else { continue };
            if let Some(rule) = Self::parse_value(value, self.exclusive_high_lists) {
                tracing::debug!(rule = target, ?rule, "rule override");
                self.values.insert(target.to_string(), rule);
            }
        }
    }

    /// Merge a flat override (vector strategy): `category.key` becomes
    /// `category_key`, applied only when that rule already exists; top-level
    /// scalars matching an existing rule name apply directly.
    pub fn apply_flat_override(&mut self, over: &RulesOverride) {
        for (category, params) in over {
            for (key, value) in params {
                let flat = format!("{}_{}", category, key);
                if self.values.contains_key(&flat) {
                    if let Some(rule) = Self::parse_value(value, false) {
                        self.values.insert(flat, rule);
                    }
                } else if self.values.contains_key(category.as_str()) {
                    if let Some(rule) = Self::parse_value(value, false) {
                        self.values.insert(category.clone(), rule);
                    }
                }
            }
        }
    }

    fn parse_value(value: &serde_json::Value, exclusive_high: bool) -> Option<RuleValue> {
        if let Some(n) = value.as_f64() {
            return Some(RuleValue::Scalar(n));
        }
        if let Some(arr) = value.as_array() {
            if arr.len() == 2 {
                let lo = arr[0].as_f64()?;
                let hi = arr[1].as_f64()?;
                let hi = if exclusive_high { hi + 1.0 } else { hi };
                return Some(RuleValue::Range(lo, hi));
            }
        }
        None
    }

    pub fn value(&self, name: &str) -> RuleValue {
        self.values.get(name).copied().unwrap_or(RuleValue::Scalar(0.0))
    }

    /// Scalar view of a rule (a range collapses to its low bound).
    pub fn scalar(&self, name: &str) -> f64 {
        match self.value(name) {
            RuleValue::Scalar(v) => v,
            RuleValue::Range(lo, _) => lo,
        }
    }

    pub fn range(&self, name: &str) -> (f64, f64) {
        match self.value(name) {
            RuleValue::Scalar(v) => (v, v),
            RuleValue::Range(lo, hi) => (lo, hi),
        }
    }

    /// Draw an integer from a rule range (inclusive-low, exclusive-high).
    pub fn draw_int(&self, rng: &mut ChaCha8Rng, name: &str) -> i32 {
        let (lo, hi) = self.range(name);
        let (lo, hi) = (lo as i32, hi as i32);
        if hi > lo {
            rng.gen_range(lo..hi)
        } else {
            lo
        }
    }

    /// Draw a float uniformly from a rule range.
    pub fn draw_f64(&self, rng: &mut ChaCha8Rng, name: &str) -> f64 {
        let (lo, hi) = self.range(name);
        if hi > lo {
            rng.gen_range(lo..hi)
        } else {
            lo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn override_with(category: &str, key: &str, value: serde_json::Value) -> RulesOverride {
        let mut params = HashMap::new();
        params.insert(key.to_string(), value);
        let mut over = HashMap::new();
        over.insert(category.to_string(), params);
        over
    }

    #[test]
    fn test_list_override_widens_high_bound() {
        let mut rules = DesignRules::grid_rules();
        rules.apply_override(&override_with("sizes", "site", serde_json::json!([10, 14])));
        assert_eq!(rules.value("site_size"), RuleValue::Range(10.0, 15.0));
    }

    #[test]
    fn test_scalar_override() {
        let mut rules = DesignRules::grid_rules();
        rules.apply_override(&override_with("corridors", "max_straight", serde_json::json!(25)));
        assert_eq!(rules.scalar("max_straight_corridor"), 25.0);
    }

    #[test]
    fn test_unrecognized_keys_ignored() {
        let mut rules = DesignRules::grid_rules();
        let before = rules.value("site_size");
        rules.apply_override(&override_with("nonsense", "site", serde_json::json!([1, 2])));
        rules.apply_override(&override_with("sizes", "nonsense", serde_json::json!(99)));
        assert_eq!(rules.value("site_size"), before);
        assert_eq!(rules.value("nonsense"), RuleValue::Scalar(0.0));
    }

    #[test]
    fn test_draw_int_stays_in_bounds() {
        let rules = DesignRules::grid_rules();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let v = rules.draw_int(&mut rng, "site_size");
            assert!((24..32).contains(&v));
        }
    }

    #[test]
    fn test_draw_from_scalar_is_constant() {
        let rules = DesignRules::grid_rules();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(rules.draw_int(&mut rng, "max_sightline"), 50);
    }

    #[test]
    fn test_vector_flat_override() {
        let mut rules = DesignRules::vector();
        rules.apply_flat_override(&override_with("organic", "level", serde_json::json!(0.9)));
        assert_eq!(rules.scalar("organic_level"), 0.9);
    }
}
