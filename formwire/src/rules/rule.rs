//! Declarative field rules.

use std::fmt;
use std::sync::Arc;

use crate::error::RuleError;
use crate::value::FormSnapshot;

/// Side effect a rule applies to its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleAction {
    /// Show (and enable) the fields when matched; hide and disable otherwise.
    Visible,
    /// Attach the `required` validator when matched; detach otherwise.
    Required,
    /// Enable the fields when matched; disable otherwise.
    Enable,
}

/// Type alias for rule conditions.
pub type Condition = Arc<dyn Fn(&FormSnapshot) -> bool + Send + Sync>;

/// A condition over the whole form plus the action applied to some fields.
///
/// Conditions must be pure: same snapshot, same answer, no side effects.
#[derive(Clone)]
pub struct FieldRule {
    action: RuleAction,
    condition: Condition,
    fields: Vec<String>,
}

impl FieldRule {
    pub fn new<I, K, F>(action: RuleAction, fields: I, condition: F) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: Fn(&FormSnapshot) -> bool + Send + Sync + 'static,
    {
        let mut keys: Vec<String> = Vec::new();
        for key in fields {
            let key = key.into();
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Self {
            action,
            condition: Arc::new(condition),
            fields: keys,
        }
    }

    pub fn visible<I, K, F>(fields: I, condition: F) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: Fn(&FormSnapshot) -> bool + Send + Sync + 'static,
    {
        Self::new(RuleAction::Visible, fields, condition)
    }

    pub fn required<I, K, F>(fields: I, condition: F) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: Fn(&FormSnapshot) -> bool + Send + Sync + 'static,
    {
        Self::new(RuleAction::Required, fields, condition)
    }

    pub fn enable<I, K, F>(fields: I, condition: F) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: Fn(&FormSnapshot) -> bool + Send + Sync + 'static,
    {
        Self::new(RuleAction::Enable, fields, condition)
    }

    pub fn action(&self) -> RuleAction {
        self.action
    }

    /// Target fields, deduplicated, in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Evaluate the condition.
    pub fn matches(&self, snapshot: &FormSnapshot) -> bool {
        (self.condition)(snapshot)
    }

    fn check(&self, index: usize) -> Result<(), RuleError> {
        if self.fields.is_empty() {
            return Err(RuleError::EmptyFields {
                index,
                action: self.action,
            });
        }
        if self.fields.iter().any(|key| key.trim().is_empty()) {
            return Err(RuleError::BlankField {
                index,
                action: self.action,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("action", &self.action)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Ordered, validated rules.
///
/// Order matters only within one evaluation pass: for the same field and
/// action, the later rule's outcome wins.
///
/// # Example
///
/// ```
/// use formwire::rules::{FieldRule, RuleSet};
///
/// let rules = RuleSet::new([
///     FieldRule::visible(["fixedAmount"], |v| v["isFixedPremium"] == true),
///     FieldRule::required(["fixedAmount"], |v| v["isFixedPremium"] == true),
/// ])
/// .unwrap();
/// assert_eq!(rules.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<FieldRule>,
}

impl RuleSet {
    /// Build a set, rejecting rules without (or with blank) target fields.
    pub fn new(rules: impl IntoIterator<Item = FieldRule>) -> Result<Self, RuleError> {
        let mut set = Self::default();
        for rule in rules {
            set.push(rule)?;
        }
        Ok(set)
    }

    /// Append a rule after validating it.
    pub fn push(&mut self, rule: FieldRule) -> Result<(), RuleError> {
        rule.check(self.rules.len())?;
        self.rules.push(rule);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a FieldRule;
    type IntoIter = std::slice::Iter<'a, FieldRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_rejected_at_construction() {
        let result = RuleSet::new([
            FieldRule::visible(["a"], |_| true),
            FieldRule::enable(Vec::<String>::new(), |_| true),
        ]);
        assert_eq!(
            result.unwrap_err(),
            RuleError::EmptyFields {
                index: 1,
                action: RuleAction::Enable
            }
        );
    }

    #[test]
    fn test_blank_field_rejected() {
        let result = RuleSet::new([FieldRule::required(["a", " "], |_| true)]);
        assert!(matches!(result, Err(RuleError::BlankField { index: 0, .. })));
    }

    #[test]
    fn test_fields_deduplicated() {
        let rule = FieldRule::visible(["a", "b", "a"], |_| true);
        assert_eq!(rule.fields(), ["a", "b"]);
    }

    #[test]
    fn test_matches_reads_snapshot() {
        let rule = FieldRule::visible(["a"], |v| v["flag"] == false);
        let off: FormSnapshot = [("flag", false)].into_iter().collect();
        let on: FormSnapshot = [("flag", true)].into_iter().collect();
        assert!(rule.matches(&off));
        assert!(!rule.matches(&on));
    }
}
