//! JSON form descriptions.
//!
//! A [`FormSchema`] lists the fields of a form with their initial values,
//! validation config and input filters. [`FormSchema::build`] turns it into a
//! live [`BoundForm`]: the [`Form`], one bound [`FieldStateAdapter`] per field
//! and the filters to run keystrokes through.
//!
//! ```json
//! {
//!   "fields": [
//!     { "key": "isFixedPremium", "value": false },
//!     {
//!       "key": "fixedAmount",
//!       "label": "Fixed amount",
//!       "config": { "valueType": "int", "decimalPlaces": 2 },
//!       "filter": { "type": "number", "decimalPlaces": 2 }
//!     }
//!   ]
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::adapter::FieldStateAdapter;
use crate::control::{Control, Emit};
use crate::error::FormError;
use crate::filter::InputFilter;
use crate::form::Form;
use crate::options::SelectOption;
use crate::validation::FieldConfig;
use crate::value::Value;

/// One field of a [`FormSchema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub config: FieldConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<InputFilter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl FieldSchema {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: String::new(),
            value: Value::Null,
            disabled: false,
            config: FieldConfig::default(),
            filter: None,
            options: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_filter(mut self, filter: InputFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Declarative description of a whole form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub fields: Vec<FieldSchema>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self { fields }
    }

    pub fn from_json(json: &str) -> Result<Self, FormError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, FormError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Create the controls, bind an adapter to each and assemble the form.
    pub fn build(&self) -> Result<BoundForm, FormError> {
        let mut builder = Form::builder();
        let mut adapters = HashMap::with_capacity(self.fields.len());
        let mut filters = HashMap::new();

        for field in &self.fields {
            if adapters.contains_key(&field.key) {
                return Err(FormError::duplicate(field.key.clone()));
            }
            let control = Control::new(field.value.clone());
            if field.disabled {
                control.disable(Emit::Quiet);
            }
            let mut adapter = FieldStateAdapter::new(field.config.clone());
            if !adapter.bind(control.clone()) {
                log::warn!("Adapter for '{}' refused its control", field.key);
            }
            adapters.insert(field.key.clone(), adapter);
            if let Some(filter) = &field.filter {
                filters.insert(field.key.clone(), filter.clone());
            }
            builder = builder.field(field.key.clone(), control);
        }

        let form = builder.build()?;
        log::debug!("Built form with {} fields", form.len());
        Ok(BoundForm {
            form,
            adapters,
            filters,
        })
    }
}

/// A form built from a [`FormSchema`], with its adapters and filters.
#[derive(Debug)]
pub struct BoundForm {
    form: Form,
    adapters: HashMap<String, FieldStateAdapter>,
    filters: HashMap<String, InputFilter>,
}

impl BoundForm {
    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn adapter(&self, key: &str) -> Option<&FieldStateAdapter> {
        self.adapters.get(key)
    }

    pub fn adapter_mut(&mut self, key: &str) -> Option<&mut FieldStateAdapter> {
        self.adapters.get_mut(key)
    }

    pub fn filter(&self, key: &str) -> Option<&InputFilter> {
        self.filters.get(key)
    }

    /// Commit raw keyboard input to a field through its filter.
    ///
    /// Fields without a filter take the text as typed. Returns the committed
    /// text, or `None` for an unknown key.
    pub fn input(&self, key: &str, raw: &str) -> Option<String> {
        let control = self.form.get(key)?;
        let committed = match self.filters.get(key) {
            Some(filter) => control.set_input(raw, filter),
            None => control.set_input(raw, &InputFilter::text()),
        };
        Some(committed)
    }

    /// Refresh every adapter, picking up quiet writes.
    pub fn sync(&self) {
        for adapter in self.adapters.values() {
            adapter.sync();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validator;

    const SCHEMA: &str = r#"{
        "fields": [
            { "key": "name", "label": "Name", "value": "", "config": { "required": true } },
            {
                "key": "amount",
                "config": { "valueType": "int", "decimalPlaces": 2 },
                "filter": { "type": "number", "decimalPlaces": 2 }
            },
            { "key": "note", "disabled": true }
        ]
    }"#;

    #[test]
    fn test_from_json_applies_defaults() {
        let schema = FormSchema::from_json(SCHEMA).unwrap();
        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.fields[1].value, Value::Null);
        assert_eq!(schema.fields[1].config.max, -1.0);
        assert!(schema.fields[0].filter.is_none());
    }

    #[test]
    fn test_build_binds_adapters() {
        let bound = FormSchema::from_json(SCHEMA).unwrap().build().unwrap();

        assert!(bound.adapter("name").unwrap().state().required);
        assert_eq!(
            bound.form().get("name").unwrap().validators(),
            vec![Validator::Required]
        );
        assert!(bound.form().get("note").unwrap().is_disabled());
        assert!(!bound.form().value().contains_key("note"));
    }

    #[test]
    fn test_input_goes_through_filter() {
        let bound = FormSchema::from_json(SCHEMA).unwrap().build().unwrap();

        assert_eq!(bound.input("amount", "1a2.345").as_deref(), Some("12.34"));
        assert_eq!(bound.adapter("amount").unwrap().state().value, Value::from("12.34"));
        assert_eq!(bound.input("name", "Ada").as_deref(), Some("Ada"));
        assert!(bound.input("missing", "x").is_none());
    }

    #[test]
    fn test_duplicate_key() {
        let schema = FormSchema::new(vec![FieldSchema::new("a"), FieldSchema::new("a")]);
        assert!(matches!(schema.build(), Err(FormError::DuplicateField(key)) if key == "a"));
    }

    #[test]
    fn test_every_field_gets_a_bound_adapter() {
        let bound = FormSchema::from_json(SCHEMA).unwrap().build().unwrap();
        for (key, control) in bound.form().controls() {
            let adapter = bound.adapter(key).unwrap();
            assert!(adapter.is_bound());
            assert_eq!(adapter.control().map(Control::id), Some(control.id()));
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            FormSchema::from_json("{\"fields\": 3}"),
            Err(FormError::Schema(_))
        ));
    }
}
