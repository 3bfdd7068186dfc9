//! Human-readable messages for validation errors.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::errors::{ErrorDetail, ValidationErrors};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("static regex"));

/// Message used when no template exists for an error kind.
pub const FALLBACK_MESSAGE: &str = "Invalid field";

/// Message templates keyed by error kind.
///
/// Templates may reference error parameters as `{{name}}`; unknown names
/// render as empty.
#[derive(Debug, Clone)]
pub struct ErrorMessages {
    templates: HashMap<String, String>,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        let templates = [
            ("required", "This field is required"),
            ("email", "Enter a valid email address"),
            ("minlength", "Minimum {{requiredLength}} characters required"),
            ("maxlength", "Maximum {{requiredLength}} characters allowed"),
            ("min", "Minimum value is {{min}}"),
            ("max", "Maximum value is {{max}}"),
            ("pattern", "Invalid format"),
            ("passwordMismatch", "Passwords do not match"),
            (
                "passwordStrength",
                "Password must contain uppercase, lowercase, number and special character",
            ),
        ];
        Self {
            templates: templates
                .into_iter()
                .map(|(kind, template)| (kind.to_string(), template.to_string()))
                .collect(),
        }
    }
}

impl ErrorMessages {
    /// An empty catalogue; every error renders as the fallback.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Add or replace a template.
    pub fn with(mut self, kind: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(kind.into(), template.into());
        self
    }

    pub fn template(&self, kind: &str) -> Option<&str> {
        self.templates.get(kind).map(String::as_str)
    }

    /// Render one error.
    pub fn render(&self, kind: &str, detail: &ErrorDetail) -> String {
        let template = self.template(kind).unwrap_or(FALLBACK_MESSAGE);
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| {
                detail
                    .param(&caps[1])
                    .map(ToString::to_string)
                    .unwrap_or_default()
            })
            .into_owned()
    }

    /// Render the first error, or an empty string when there is none.
    pub fn first_message(&self, errors: &ValidationErrors) -> String {
        errors
            .first()
            .map(|(kind, detail)| self.render(kind, detail))
            .unwrap_or_default()
    }
}
