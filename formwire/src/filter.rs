//! Per-keystroke input sanitizing.
//!
//! An [`InputFilter`] rewrites the raw text of an input before it is committed:
//! it drops a lone blank, applies a case transform, keeps numeric fields
//! numeric and clamps the length. It is stateless; every call starts from the
//! raw text alone.

use serde::{Deserialize, Serialize};

use crate::value::format_number;

/// Case transform applied to every keystroke.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    /// Uppercase the first character of every word.
    Capitalize,
}

impl CaseTransform {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Capitalize => capitalize(text),
        }
    }
}

/// Word characters in the ASCII sense (`[A-Za-z0-9_]`).
fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn capitalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_word = false;
    for c in text.chars() {
        let word = is_word(c);
        if word && !prev_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_word = word;
    }
    out
}

/// What kind of text an input accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Number,
}

/// Sanitizer configuration for one input.
///
/// `max_length` and `max` use `-1` (or any non-positive value) for "no limit".
///
/// # Example
///
/// ```
/// use formwire::InputFilter;
///
/// let filter = InputFilter::number().with_decimal_places(2).with_max(50.0);
/// assert_eq!(filter.apply(" -12.999"), "12.99");
/// assert_eq!(filter.apply("75"), "50");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputFilter {
    #[serde(rename = "type")]
    pub kind: InputKind,
    pub case: CaseTransform,
    pub decimal_places: u32,
    pub negative: bool,
    pub max_length: i64,
    pub max: f64,
}

impl Default for InputFilter {
    fn default() -> Self {
        Self {
            kind: InputKind::Text,
            case: CaseTransform::None,
            decimal_places: 0,
            negative: false,
            max_length: -1,
            max: -1.0,
        }
    }
}

impl InputFilter {
    /// Filter for free text.
    pub fn text() -> Self {
        Self::default()
    }

    /// Filter for numeric entry.
    pub fn number() -> Self {
        Self {
            kind: InputKind::Number,
            ..Default::default()
        }
    }

    pub fn with_case(mut self, case: CaseTransform) -> Self {
        self.case = case;
        self
    }

    pub fn with_decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = places;
        self
    }

    /// Allow a single leading minus sign.
    pub fn allow_negative(mut self) -> Self {
        self.negative = true;
        self
    }

    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }

    /// Rewrite raw input.
    pub fn apply(&self, raw: &str) -> String {
        let text = if raw == " " { "" } else { raw };
        let mut text = self.case.apply(text);
        if self.kind == InputKind::Number {
            text = self.sanitize_number(&text);
        }
        self.truncate(text)
    }

    fn sanitize_number(&self, input: &str) -> String {
        let decimals = self.decimal_places as usize;
        let mut text = if decimals > 0 && input == "." {
            "0.".to_string()
        } else {
            input.to_string()
        };
        text.retain(|c| c.is_ascii_digit() || c == '.' || c == '-');

        if !self.is_number_shaped(&text) {
            text = self.repair_number(&text, decimals);
        }

        if self.max > 0.0
            && let Ok(number) = text.parse::<f64>()
            && number > self.max
        {
            text = format_number(self.max);
        }
        text
    }

    /// Rebuild a malformed entry: fix signs, trim fractional digits, and
    /// give up on anything that no longer reads as a number.
    fn repair_number(&self, text: &str, decimals: usize) -> String {
        let mut text = if self.negative {
            let negative = text.starts_with('-');
            let digits: String = text.chars().filter(|c| *c != '-').collect();
            if negative { format!("-{}", digits) } else { digits }
        } else {
            text.chars().filter(|c| *c != '-').collect()
        };

        if decimals > 0 && text.contains('.') {
            let mut parts = text.split('.');
            let before = parts.next().unwrap_or_default();
            let after: String = parts.next().unwrap_or_default().chars().take(decimals).collect();
            text = format!("{}.{}", before, after);
        } else {
            text.retain(|c| c != '.');
        }

        if text.parse::<f64>().is_err() {
            text.clear();
        }
        text
    }

    /// `-?[0-9]*(\.[0-9]{0,decimals})?` with the sign only when negatives are allowed.
    fn is_number_shaped(&self, text: &str) -> bool {
        let unsigned = match text.strip_prefix('-') {
            Some(rest) if self.negative => rest,
            Some(_) => return false,
            None => text,
        };
        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (unsigned, None),
        };
        let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        match fraction {
            None => digits(whole),
            Some(fraction) => {
                self.decimal_places > 0
                    && digits(whole)
                    && digits(fraction)
                    && fraction.len() <= self.decimal_places as usize
            }
        }
    }

    fn truncate(&self, text: String) -> String {
        match usize::try_from(self.max_length) {
            Ok(max) if max > 0 && text.chars().count() > max => text.chars().take(max).collect(),
            _ => text,
        }
    }
}
