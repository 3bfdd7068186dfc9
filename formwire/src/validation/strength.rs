//! Password strength meter.

/// Symbols that satisfy the "special character" requirement.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_-+={}[]|:;\"'<>,.?/~";

/// [`SPECIAL_CHARACTERS`] as a regex character class.
pub(crate) const SPECIAL_CHARACTERS_CLASS: &str = r#"[!@#$%^&*()_\-+={}\[\]|:;"'<>,.?/~]"#;

/// Which strength requirements a password meets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasswordStrength {
    pub eight_characters: bool,
    pub lower_case: bool,
    pub upper_case: bool,
    pub number: bool,
    pub special_characters: bool,
}

impl PasswordStrength {
    pub fn measure(password: &str) -> Self {
        Self {
            eight_characters: password.chars().count() > 7,
            lower_case: password.chars().any(|c| c.is_ascii_lowercase()),
            upper_case: password.chars().any(|c| c.is_ascii_uppercase()),
            number: password.chars().any(|c| c.is_ascii_digit()),
            special_characters: password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)),
        }
    }

    /// Number of requirements met, out of five.
    pub fn passed(&self) -> u8 {
        [
            self.eight_characters,
            self.lower_case,
            self.upper_case,
            self.number,
            self.special_characters,
        ]
        .into_iter()
        .filter(|met| *met)
        .count() as u8
    }

    /// Strength as a percentage (0, 20, .., 100).
    pub fn score(&self) -> u8 {
        self.passed() * 20
    }

    pub fn is_strong(&self) -> bool {
        self.passed() == 5
    }
}
