pub mod engine;
pub mod schema;

pub use engine::{DesignRules, RuleValue, RulesOverride};
