//! Validator synthesis from declarative field configuration.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::strength::SPECIAL_CHARACTERS_CLASS;
use super::validator::{Pattern, Validator};

static POSITIVE_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[1-9][0-9]*$").expect("static regex"));

static NON_ZERO_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[1-9]").expect("static regex"));

static PASSWORD_CHECKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        "[a-z]".to_string(),
        "[A-Z]".to_string(),
        "[0-9]".to_string(),
        SPECIAL_CHARACTERS_CLASS.to_string(),
        "^.{8,}$".to_string(),
    ]
    .iter()
    .map(|source| Regex::new(source).expect("static regex"))
    .collect()
});

/// How a field's value is interpreted for validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Text,
    /// Numeric entry; fractional digits allowed when `decimal_places > 0`.
    #[serde(alias = "int")]
    Integer,
}

/// Declarative validation intent for one field.
///
/// Bounds use `-1` for "unbounded". `min` only applies when strictly positive,
/// while `max` applies from `0` upwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
    pub value_type: ValueType,
    pub decimal_places: u32,
    pub min: f64,
    pub max: f64,
    pub min_length: i64,
    pub max_length: i64,
    pub require_password_strength: bool,
    pub required: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            value_type: ValueType::Text,
            decimal_places: 0,
            min: -1.0,
            max: -1.0,
            min_length: -1,
            max_length: -1,
            require_password_strength: false,
            required: false,
        }
    }
}

impl FieldConfig {
    /// Config for a free-text field.
    pub fn text() -> Self {
        Self::default()
    }

    /// Config for a numeric field.
    pub fn integer() -> Self {
        Self {
            value_type: ValueType::Integer,
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = places;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = min;
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }

    pub fn min_length(mut self, min: i64) -> Self {
        self.min_length = min;
        self
    }

    pub fn max_length(mut self, max: i64) -> Self {
        self.max_length = max;
        self
    }

    pub fn password_strength(mut self) -> Self {
        self.require_password_strength = true;
        self
    }
}

/// Derive the ordered validator list for a field.
///
/// The result is meant to replace whatever list the control carried before.
/// Contradictory bounds (`min > max`) are not rejected; the field simply can
/// never be valid.
pub fn synthesize(config: &FieldConfig) -> Vec<Validator> {
    let mut validators = Vec::new();
    let integer = config.value_type == ValueType::Integer;

    if config.required {
        validators.push(Validator::Required);
    }

    if integer && config.decimal_places == 0 && config.required {
        validators.push(Validator::Pattern(Pattern::all(
            "^[1-9][0-9]*$",
            vec![POSITIVE_INTEGER.clone()],
        )));
    }

    if integer && config.decimal_places > 0 {
        match decimal_pattern(config.decimal_places) {
            Ok(pattern) => validators.push(Validator::Pattern(pattern)),
            Err(err) => log::warn!(
                "Skipping decimal pattern for {} places: {}",
                config.decimal_places,
                err
            ),
        }
    }

    if config.min > 0.0 {
        validators.push(Validator::Min(config.min));
    }
    if config.max > -1.0 {
        validators.push(Validator::Max(config.max));
    }
    if config.min_length > -1 {
        validators.push(Validator::MinLength(config.min_length as usize));
    }
    if config.max_length > -1 {
        validators.push(Validator::MaxLength(config.max_length as usize));
    }

    if config.require_password_strength {
        validators.push(Validator::Pattern(Pattern::all(
            format!(
                "^(?=.*[a-z])(?=.*[A-Z])(?=.*\\d)(?=.*{}).{{8,}}$",
                SPECIAL_CHARACTERS_CLASS
            ),
            PASSWORD_CHECKS.clone(),
        )));
    }

    validators
}

/// Digits with up to `places` fractional digits and at least one non-zero digit.
fn decimal_pattern(places: u32) -> Result<Pattern, regex::Error> {
    let shape = Regex::new(&format!(r"^\s*[0-9]*(?:\.[0-9]{{1,{}}})?\s*$", places))?;
    Ok(Pattern::all(
        format!(r"^\s*(?=.*[1-9])\d*(?:\.\d{{1,{}}})?\s*$", places),
        vec![shape, NON_ZERO_DIGIT.clone()],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_synthesizes_nothing() {
        assert!(synthesize(&FieldConfig::default()).is_empty());
    }

    #[test]
    fn test_rule_order() {
        let config = FieldConfig::integer()
            .required()
            .min(1.0)
            .max(10.0)
            .min_length(1)
            .max_length(2);
        let kinds: Vec<String> = synthesize(&config)
            .iter()
            .map(|v| v.kind().to_string())
            .collect();
        assert_eq!(
            kinds,
            vec!["required", "pattern", "min", "max", "minlength", "maxlength"]
        );
    }

    #[test]
    fn test_min_zero_is_unbounded_but_max_zero_is_a_bound() {
        let validators = synthesize(&FieldConfig::integer().min(0.0).max(0.0));
        assert_eq!(validators, vec![Validator::Max(0.0)]);
    }

    #[test]
    fn test_config_from_json() {
        let config: FieldConfig =
            serde_json::from_str(r#"{"valueType": "int", "decimalPlaces": 2, "required": true}"#)
                .unwrap();
        assert_eq!(config.value_type, ValueType::Integer);
        assert_eq!(config.decimal_places, 2);
        assert_eq!(config.max, -1.0);
        assert!(config.required);
    }
}
