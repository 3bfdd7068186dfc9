pub mod adapter;
pub mod control;
pub mod error;
pub mod filter;
pub mod form;
pub mod options;
pub mod rules;
pub mod schema;
pub mod validation;
pub mod value;
pub mod visibility;

mod subscription;

pub use adapter::{FieldState, FieldStateAdapter};
pub use control::{Control, ControlEvent, ControlStatus, Emit};
pub use error::{FormError, RuleError};
pub use filter::{CaseTransform, InputFilter, InputKind};
pub use form::{FieldAccessor, Form, FormBuilder};
pub use subscription::Subscription;
pub use value::{FormSnapshot, Value};
pub use visibility::{Visibility, VisibilityStore};

pub mod prelude {
    pub use crate::adapter::{FieldState, FieldStateAdapter};
    pub use crate::control::{Control, ControlStatus, Emit};
    pub use crate::error::{FormError, RuleError};
    pub use crate::filter::{CaseTransform, InputFilter};
    pub use crate::form::Form;
    pub use crate::options::{SelectOption, filter_and_sort};
    pub use crate::rules::{FieldRule, RuleBinding, RuleEngine, RuleSet};
    pub use crate::schema::{BoundForm, FieldSchema, FormSchema};
    pub use crate::subscription::Subscription;
    pub use crate::validation::{ErrorMessages, FieldConfig, Validator, ValueType, synthesize};
    pub use crate::value::{FormSnapshot, Value};
    pub use crate::visibility::VisibilityStore;
}
