//! Field validators.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use regex::Regex;

use super::errors::{ErrorDetail, ValidationErrors};
use crate::error::FormError;
use crate::value::Value;

/// Type alias for boxed futures used in async validation.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type alias for sync validation closures.
type CheckFn = dyn Fn(&Value) -> Option<ValidationErrors> + Send + Sync;

/// Type alias for async validation closures.
type AsyncCheckFn = dyn Fn(Value) -> BoxFuture<'static, Option<ValidationErrors>> + Send + Sync;

/// A predicate classifying a field value as valid or failing with a reason.
///
/// Every check except [`Validator::Required`] passes on empty values, so
/// optional fields are only checked once something has been entered.
#[derive(Clone)]
pub enum Validator {
    /// Rejects `Null`, empty text and empty lists.
    Required,
    /// All of the pattern's checks must match the value's text form.
    Pattern(Pattern),
    /// Numeric lower bound (inclusive).
    Min(f64),
    /// Numeric upper bound (inclusive).
    Max(f64),
    /// Minimum length in chars (or list elements).
    MinLength(usize),
    /// Maximum length in chars (or list elements).
    MaxLength(usize),
    /// Syntactically valid email address.
    Email,
    /// Host-provided check.
    Custom(CustomValidator),
}

impl Validator {
    /// Build a pattern validator from a regex source.
    pub fn pattern(source: &str) -> Result<Self, FormError> {
        Pattern::new(source).map(Self::Pattern)
    }

    /// Build a custom validator. The closure returns `true` for valid values.
    pub fn custom<F>(kind: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Custom(CustomValidator::new(kind, check))
    }

    /// The error key this validator reports under.
    pub fn kind(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Pattern(_) => "pattern",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::MinLength(_) => "minlength",
            Self::MaxLength(_) => "maxlength",
            Self::Email => "email",
            Self::Custom(custom) => &custom.kind,
        }
    }

    /// Run the check against a value.
    pub fn validate(&self, value: &Value) -> Option<ValidationErrors> {
        let detail = match self {
            Self::Required => value.is_empty().then(ErrorDetail::new),
            Self::Custom(custom) => return (custom.check)(value),
            _ if value.is_empty() => None,
            Self::Pattern(pattern) => {
                let text = value.to_string();
                (!pattern.is_match(&text)).then(|| {
                    ErrorDetail::new()
                        .with("requiredPattern", pattern.source())
                        .with("actualValue", text)
                })
            }
            Self::Min(min) => value
                .as_f64()
                .filter(|actual| actual < min)
                .map(|actual| ErrorDetail::new().with("min", *min).with("actual", actual)),
            Self::Max(max) => value
                .as_f64()
                .filter(|actual| actual > max)
                .map(|actual| ErrorDetail::new().with("max", *max).with("actual", actual)),
            Self::MinLength(min) => value
                .length()
                .filter(|actual| actual < min)
                .map(|actual| length_detail(*min, actual)),
            Self::MaxLength(max) => value
                .length()
                .filter(|actual| actual > max)
                .map(|actual| length_detail(*max, actual)),
            Self::Email => {
                let text = value.to_string();
                (!email_address::EmailAddress::is_valid(&text)).then(ErrorDetail::new)
            }
        };
        detail.map(|detail| ValidationErrors::single(self.kind(), detail))
    }
}

fn length_detail(required: usize, actual: usize) -> ErrorDetail {
    ErrorDetail::new()
        .with("requiredLength", required as i64)
        .with("actualLength", actual as i64)
}

/// Run every validator and merge their failures.
pub fn validate_all(validators: &[Validator], value: &Value) -> Option<ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for validator in validators {
        if let Some(failed) = validator.validate(value) {
            errors.merge(failed);
        }
    }
    errors.into_option()
}

impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Required, Self::Required) | (Self::Email, Self::Email) => true,
            (Self::Pattern(a), Self::Pattern(b)) => a.source == b.source,
            (Self::Min(a), Self::Min(b)) | (Self::Max(a), Self::Max(b)) => a == b,
            (Self::MinLength(a), Self::MinLength(b)) | (Self::MaxLength(a), Self::MaxLength(b)) => {
                a == b
            }
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(&a.check, &b.check),
            _ => false,
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("Required"),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.source).finish(),
            Self::Min(min) => f.debug_tuple("Min").field(min).finish(),
            Self::Max(max) => f.debug_tuple("Max").field(max).finish(),
            Self::MinLength(min) => f.debug_tuple("MinLength").field(min).finish(),
            Self::MaxLength(max) => f.debug_tuple("MaxLength").field(max).finish(),
            Self::Email => f.write_str("Email"),
            Self::Custom(custom) => f.debug_tuple("Custom").field(&custom.kind).finish(),
        }
    }
}

/// A text pattern made of one or more regexes that must all match.
///
/// Conjunctions stand in for look-ahead assertions (`(?=.*[a-z])`), which the
/// `regex` crate does not support. `source` is the single-expression form
/// reported as `requiredPattern`.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    checks: Vec<Regex>,
}

impl Pattern {
    /// A pattern from one regex source.
    pub fn new(source: &str) -> Result<Self, FormError> {
        let regex = Regex::new(source).map_err(|source_err| FormError::InvalidPattern {
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Self {
            source: source.to_string(),
            checks: vec![regex],
        })
    }

    /// A pattern that matches when every check matches.
    pub fn all(source: impl Into<String>, checks: Vec<Regex>) -> Self {
        Self {
            source: source.into(),
            checks,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.checks.iter().all(|check| check.is_match(text))
    }
}

/// A named, host-provided check.
#[derive(Clone)]
pub struct CustomValidator {
    kind: String,
    check: Arc<CheckFn>,
}

impl CustomValidator {
    pub fn new<F>(kind: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let kind = kind.into();
        let error_kind = kind.clone();
        Self {
            kind,
            check: Arc::new(move |value: &Value| {
                (!check(value)).then(|| ValidationErrors::single(error_kind.clone(), ErrorDetail::new()))
            }),
        }
    }
}

/// A check that completes later, e.g. a server-side uniqueness lookup.
///
/// While one runs the owning control reports `pending`.
#[derive(Clone)]
pub struct AsyncValidator {
    kind: String,
    check: Arc<AsyncCheckFn>,
}

impl AsyncValidator {
    /// Build an async validator. The future resolves to `true` for valid values.
    pub fn new<F, Fut>(kind: impl Into<String>, check: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let kind = kind.into();
        let error_kind = kind.clone();
        Self {
            kind,
            check: Arc::new(move |value: Value| -> BoxFuture<'static, Option<ValidationErrors>> {
                let fut = check(value);
                let error_kind = error_kind.clone();
                Box::pin(async move {
                    if fut.await {
                        None
                    } else {
                        Some(ValidationErrors::single(error_kind, ErrorDetail::new()))
                    }
                })
            }),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn validate(&self, value: Value) -> BoxFuture<'static, Option<ValidationErrors>> {
        (self.check)(value)
    }
}

impl fmt::Debug for AsyncValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AsyncValidator").field(&self.kind).finish()
    }
}
