//! Validation failure maps.

use std::collections::BTreeMap;

use crate::value::Value;

/// Parameters describing one failure, e.g. `requiredLength` for `minlength`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorDetail {
    params: BTreeMap<String, Value>,
}

impl ErrorDetail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Failures of one value, keyed by error kind in the order they were raised.
///
/// Inserting an existing kind replaces its detail in place, so merging the
/// output of several validators keeps the first-raised order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    entries: Vec<(String, ErrorDetail)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding a single kind.
    pub fn single(kind: impl Into<String>, detail: ErrorDetail) -> Self {
        let mut errors = Self::new();
        errors.insert(kind, detail);
        errors
    }

    pub fn insert(&mut self, kind: impl Into<String>, detail: ErrorDetail) {
        let kind = kind.into();
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = detail,
            None => self.entries.push((kind, detail)),
        }
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (kind, detail) in other.entries {
            self.insert(kind, detail);
        }
    }

    pub fn remove(&mut self, kind: &str) -> Option<ErrorDetail> {
        let index = self.entries.iter().position(|(k, _)| k == kind)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == kind)
    }

    pub fn get(&self, kind: &str) -> Option<&ErrorDetail> {
        self.entries
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, detail)| detail)
    }

    /// The first raised error.
    pub fn first(&self) -> Option<(&str, &ErrorDetail)> {
        self.entries
            .first()
            .map(|(kind, detail)| (kind.as_str(), detail))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(kind, _)| kind.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `None` when nothing failed.
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut errors = ValidationErrors::new();
        errors.insert("required", ErrorDetail::new());
        errors.insert("pattern", ErrorDetail::new().with("actualValue", "a"));
        errors.insert("required", ErrorDetail::new().with("again", true));

        assert_eq!(errors.kinds().collect::<Vec<_>>(), vec!["required", "pattern"]);
        assert_eq!(
            errors.get("required").and_then(|d| d.param("again")),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn test_into_option() {
        assert!(ValidationErrors::new().into_option().is_none());
        assert!(
            ValidationErrors::single("min", ErrorDetail::new())
                .into_option()
                .is_some()
        );
    }
}
