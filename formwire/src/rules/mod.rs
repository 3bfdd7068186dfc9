//! Declarative rules that drive visibility, requiredness and enablement.

mod engine;
mod rule;

pub use engine::{RuleBinding, RuleEngine};
pub use rule::{Condition, FieldRule, RuleAction, RuleSet};
