//! Field validation for formwire.
//!
//! Validators are plain values attached to a [`Control`](crate::control::Control).
//! Most fields never build them by hand: a [`FieldConfig`] describes the intent
//! and [`synthesize`] turns it into the ordered list the control carries.
//!
//! # Example
//!
//! ```
//! use formwire::validation::{FieldConfig, synthesize, validate_all};
//! use formwire::Value;
//!
//! let config = FieldConfig::integer().decimal_places(2).min(1.0);
//! let validators = synthesize(&config);
//!
//! assert!(validate_all(&validators, &Value::from("12.34")).is_none());
//! assert!(validate_all(&validators, &Value::from("12.345")).is_some());
//! ```

mod errors;
mod messages;
mod strength;
mod synthesize;
mod validator;

pub use errors::{ErrorDetail, ValidationErrors};
pub use messages::{ErrorMessages, FALLBACK_MESSAGE};
pub use strength::{PasswordStrength, SPECIAL_CHARACTERS};
pub use synthesize::{FieldConfig, ValueType, synthesize};
pub use validator::{AsyncValidator, BoxFuture, CustomValidator, Pattern, Validator, validate_all};
