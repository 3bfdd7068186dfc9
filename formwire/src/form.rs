//! Forms: ordered groups of controls and the whole-form value stream.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Weak};

use crate::control::{Control, ControlEvent, ControlStatus};
use crate::error::FormError;
use crate::subscription::{Listeners, Subscription};
use crate::validation::ValidationErrors;
use crate::value::{FormSnapshot, Value};

/// Read access to a form's controls by key.
///
/// The rule engine resolves rule targets through this trait, so rules can be
/// applied to a [`Form`] or to any plain map of controls.
pub trait FieldAccessor {
    /// The control registered under `key`, if any.
    fn control(&self, key: &str) -> Option<&Control>;
}

impl FieldAccessor for HashMap<String, Control> {
    fn control(&self, key: &str) -> Option<&Control> {
        self.get(key)
    }
}

impl FieldAccessor for BTreeMap<String, Control> {
    fn control(&self, key: &str) -> Option<&Control> {
        self.get(key)
    }
}

struct FormInner {
    controls: Vec<(String, Control)>,
    index: HashMap<String, usize>,
    values: Listeners<FormSnapshot>,
    /// Keeps the per-control forwarding registrations alive.
    _forwarders: Vec<Subscription>,
}

impl FormInner {
    fn snapshot(&self, include_disabled: bool) -> FormSnapshot {
        self.controls
            .iter()
            .filter(|(_, control)| include_disabled || control.is_enabled())
            .map(|(key, control)| (key.clone(), control.value()))
            .collect()
    }
}

/// A group of controls keyed by field.
///
/// Cloning shares the form. Every notifying value change of a member control
/// (including enabling or disabling it) emits one new [`FormSnapshot`] to the
/// form's value subscribers.
///
/// # Example
///
/// ```
/// use formwire::{Control, Form};
///
/// let form = Form::builder()
///     .field("name", Control::new("Ada"))
///     .field("age", Control::new(36))
///     .build()
///     .unwrap();
///
/// assert_eq!(form.value()["name"], "Ada");
/// ```
#[derive(Clone)]
pub struct Form {
    inner: Arc<FormInner>,
}

impl Form {
    pub fn builder() -> FormBuilder {
        FormBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<&Control> {
        self.inner
            .index
            .get(key)
            .map(|&i| &self.inner.controls[i].1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.index.contains_key(key)
    }

    /// Field keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.controls.iter().map(|(key, _)| key.as_str())
    }

    pub fn controls(&self) -> impl Iterator<Item = (&str, &Control)> {
        self.inner
            .controls
            .iter()
            .map(|(key, control)| (key.as_str(), control))
    }

    pub fn len(&self) -> usize {
        self.inner.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.controls.is_empty()
    }

    /// Values of the enabled controls.
    pub fn value(&self) -> FormSnapshot {
        self.inner.snapshot(false)
    }

    /// Values of every control, disabled ones included.
    pub fn raw_value(&self) -> FormSnapshot {
        self.inner.snapshot(true)
    }

    /// Observe the whole-form value after every notifying change.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&FormSnapshot) + Send + Sync + 'static,
    {
        self.inner.values.subscribe(callback)
    }

    /// Combined status: disabled controls are ignored, then pending beats
    /// invalid beats valid.
    pub fn status(&self) -> ControlStatus {
        let mut status = ControlStatus::Valid;
        let mut any_enabled = false;
        for (_, control) in &self.inner.controls {
            match control.status() {
                ControlStatus::Disabled => continue,
                ControlStatus::Pending => return ControlStatus::Pending,
                ControlStatus::Invalid => {
                    any_enabled = true;
                    status = ControlStatus::Invalid;
                }
                ControlStatus::Valid => any_enabled = true,
            }
        }
        if any_enabled || self.is_empty() {
            status
        } else {
            ControlStatus::Disabled
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status() == ControlStatus::Valid
    }

    pub fn is_invalid(&self) -> bool {
        self.status() == ControlStatus::Invalid
    }

    /// Errors of every failing enabled control, by key.
    pub fn errors(&self) -> BTreeMap<String, ValidationErrors> {
        self.inner
            .controls
            .iter()
            .filter_map(|(key, control)| control.errors().map(|errors| (key.clone(), errors)))
            .collect()
    }

    /// Mark every control touched so their errors become visible.
    pub fn mark_all_as_touched(&self) {
        for (_, control) in &self.inner.controls {
            control.mark_as_touched();
        }
    }

    /// Non-owning handle, used by long-lived callbacks registered on the form.
    pub fn downgrade(&self) -> WeakForm {
        WeakForm(Arc::downgrade(&self.inner))
    }
}

impl FieldAccessor for Form {
    fn control(&self, key: &str) -> Option<&Control> {
        self.get(key)
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("fields", &self.keys().collect::<Vec<_>>())
            .field("subscribers", &self.inner.values.len())
            .finish()
    }
}

/// Weak counterpart of [`Form`].
#[derive(Clone)]
pub struct WeakForm(Weak<FormInner>);

impl WeakForm {
    pub fn upgrade(&self) -> Option<Form> {
        self.0.upgrade().map(|inner| Form { inner })
    }
}

impl fmt::Debug for WeakForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakForm")
    }
}

/// Builder for [`Form`].
#[derive(Debug, Default)]
pub struct FormBuilder {
    controls: Vec<(String, Control)>,
}

impl FormBuilder {
    /// Add a control under `key`.
    pub fn field(mut self, key: impl Into<String>, control: Control) -> Self {
        self.controls.push((key.into(), control));
        self
    }

    /// Add a fresh control holding `value`.
    pub fn value(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field(key, Control::new(value))
    }

    /// Build the form, wiring each control's changes into the value stream.
    pub fn build(self) -> Result<Form, FormError> {
        let mut index = HashMap::with_capacity(self.controls.len());
        for (i, (key, _)) in self.controls.iter().enumerate() {
            if index.insert(key.clone(), i).is_some() {
                return Err(FormError::duplicate(key.clone()));
            }
        }

        let inner = Arc::new_cyclic(|weak: &Weak<FormInner>| {
            let forwarders = self
                .controls
                .iter()
                .map(|(key, control)| {
                    let weak = weak.clone();
                    let key = key.clone();
                    control.subscribe(move |event| {
                        if let ControlEvent::ValueChanged(_) = event
                            && let Some(inner) = weak.upgrade()
                        {
                            log::trace!("Form value changed via '{}'", key);
                            let snapshot = inner.snapshot(false);
                            inner.values.emit(&snapshot);
                        }
                    })
                })
                .collect();
            FormInner {
                controls: self.controls,
                index,
                values: Listeners::new(),
                _forwarders: forwarders,
            }
        });

        Ok(Form { inner })
    }
}
