//! Per-field state mirror.
//!
//! A [`FieldStateAdapter`] sits between a [`Control`] and whatever renders the
//! field. It keeps a plain [`FieldState`] copy of the control's flags, refreshed
//! on every change the control reports, and it owns the field's validators: the
//! list synthesized from its [`FieldConfig`] is pushed onto the control whenever
//! the config changes.

use std::sync::{Arc, RwLock};

use crate::control::{Control, Emit};
use crate::subscription::{Listeners, Subscription};
use crate::validation::{
    ErrorMessages, FieldConfig, PasswordStrength, ValidationErrors, ValueType, synthesize,
};
use crate::value::Value;

/// Plain copy of a control's observable state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    pub value: Value,
    pub invalid: bool,
    pub touched: bool,
    pub pending: bool,
    pub disabled: bool,
    /// The attached validators reject an empty value as `required`.
    pub required: bool,
    pub errors: Option<ValidationErrors>,
}

impl FieldState {
    /// Read every attribute from `control`.
    pub fn read(control: &Control) -> Self {
        let required = control
            .validate_value(&Value::from(""))
            .is_some_and(|errors| errors.contains("required"));
        Self {
            value: control.value(),
            invalid: control.is_invalid(),
            touched: control.is_touched(),
            pending: control.is_pending(),
            disabled: control.is_disabled(),
            required,
            errors: control.errors(),
        }
    }

    /// Errors are shown once the user has left an invalid field.
    pub fn show_error(&self) -> bool {
        self.invalid && self.touched
    }
}

struct Binding {
    control: Control,
    _subscription: Subscription,
}

/// Mirrors one [`Control`] and installs its synthesized validators.
///
/// # Example
///
/// ```
/// use formwire::adapter::FieldStateAdapter;
/// use formwire::validation::FieldConfig;
/// use formwire::Control;
///
/// let control = Control::new("");
/// let mut adapter = FieldStateAdapter::new(FieldConfig::text().required());
/// adapter.bind(control.clone());
///
/// assert!(adapter.state().required);
/// assert!(adapter.state().invalid);
///
/// control.mark_as_touched();
/// assert_eq!(adapter.error_message(&Default::default()), "This field is required");
/// ```
pub struct FieldStateAdapter {
    config: FieldConfig,
    /// Config whose validators are currently installed.
    applied: Option<FieldConfig>,
    binding: Option<Binding>,
    state: Arc<RwLock<FieldState>>,
    changes: Listeners<FieldState>,
}

impl FieldStateAdapter {
    pub fn new(config: FieldConfig) -> Self {
        Self {
            config,
            applied: None,
            binding: None,
            state: Arc::new(RwLock::new(FieldState::default())),
            changes: Listeners::new(),
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn control(&self) -> Option<&Control> {
        self.binding.as_ref().map(|binding| &binding.control)
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Start mirroring `control`.
    ///
    /// Installs the synthesized validators quietly, syncs once, then refreshes
    /// on every control event. Returns `false` (and changes nothing) when the
    /// adapter is already bound.
    pub fn bind(&mut self, control: Control) -> bool {
        if let Some(binding) = &self.binding {
            log::debug!(
                "Adapter already bound to {}, ignoring bind of {}",
                binding.control.id(),
                control.id()
            );
            return false;
        }

        install(&control, &self.config);
        self.applied = Some(self.config.clone());

        let state = Arc::clone(&self.state);
        let changes = self.changes.clone();
        let source = control.clone();
        let subscription = control.subscribe(move |_| refresh(&source, &state, &changes));

        self.binding = Some(Binding {
            control,
            _subscription: subscription,
        });
        self.sync();
        true
    }

    /// Replace the config, resynthesizing validators only if it changed.
    ///
    /// Returns whether validators were reinstalled. The new list replaces the
    /// old one entirely, including a `required` validator attached by a rule.
    pub fn set_config(&mut self, config: FieldConfig) -> bool {
        self.config = config;
        let Some(binding) = &self.binding else {
            return false;
        };
        if self.applied.as_ref() == Some(&self.config) {
            return false;
        }

        install(&binding.control, &self.config);
        self.applied = Some(self.config.clone());
        self.sync();
        true
    }

    /// Refresh the mirror from the control.
    ///
    /// Quiet writes (such as those made by the rule engine) do not reach the
    /// adapter on their own; call this afterwards to pick them up.
    pub fn sync(&self) {
        if let Some(binding) = &self.binding {
            refresh(&binding.control, &self.state, &self.changes);
        }
    }

    /// Stop mirroring. The last state is kept.
    pub fn unbind(&mut self) -> Option<Control> {
        self.applied = None;
        self.binding.take().map(|binding| binding.control)
    }

    pub fn state(&self) -> FieldState {
        self.state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Observe the mirrored state after every change.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&FieldState) + Send + Sync + 'static,
    {
        self.changes.subscribe(callback)
    }

    pub fn show_error(&self) -> bool {
        self.state().show_error()
    }

    /// Message for the first error, or `""` while no error is shown.
    pub fn error_message(&self, messages: &ErrorMessages) -> String {
        let state = self.state();
        match &state.errors {
            Some(errors) if state.show_error() => messages.first_message(errors),
            _ => String::new(),
        }
    }

    /// Strength of the current value, when the config asks for it.
    pub fn password_strength(&self) -> Option<PasswordStrength> {
        if !self.config.require_password_strength {
            return None;
        }
        self.state().value.as_str().map(PasswordStrength::measure)
    }

    /// Reset the value to `0` for integer fields, or `Null`.
    pub fn clear(&self) {
        let Some(binding) = &self.binding else {
            return;
        };
        let empty = match self.config.value_type {
            ValueType::Integer => Value::Number(0.0),
            ValueType::Text => Value::Null,
        };
        binding.control.set_value(empty, Emit::Notify);
    }
}

impl std::fmt::Debug for FieldStateAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldStateAdapter")
            .field("config", &self.config)
            .field("control", &self.control().map(Control::id))
            .field("state", &self.state())
            .finish()
    }
}

fn install(control: &Control, config: &FieldConfig) {
    let validators = synthesize(config);
    log::debug!("Installing {} validators on {}", validators.len(), control.id());
    control.set_validators(validators);
    control.update_value_and_validity(Emit::Quiet);
}

fn refresh(control: &Control, state: &RwLock<FieldState>, changes: &Listeners<FieldState>) {
    let next = FieldState::read(control);
    let changed = match state.write() {
        Ok(mut guard) if *guard != next => {
            *guard = next.clone();
            true
        }
        _ => false,
    };
    if changed {
        changes.emit(&next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bound(config: FieldConfig) -> (Control, FieldStateAdapter) {
        let control = Control::new("");
        let mut adapter = FieldStateAdapter::new(config);
        assert!(adapter.bind(control.clone()));
        (control, adapter)
    }

    #[test]
    fn test_bind_syncs_and_installs_validators() {
        let (control, adapter) = bound(FieldConfig::text().required().max_length(3));

        assert_eq!(
            control.validators(),
            vec![Validator::Required, Validator::MaxLength(3)]
        );
        let state = adapter.state();
        assert!(state.invalid);
        assert!(state.required);
        assert!(!state.touched);
        assert!(state.errors.is_some_and(|errors| errors.contains("required")));
    }

    #[test]
    fn test_second_bind_is_ignored() {
        let (first, mut adapter) = bound(FieldConfig::text());
        let second = Control::new("other");

        assert!(!adapter.bind(second.clone()));
        assert_eq!(adapter.control().map(Control::id), Some(first.id()));
        assert_eq!(second.subscriber_count(), 0);
    }

    #[test]
    fn test_refreshes_on_control_events() {
        let (control, adapter) = bound(FieldConfig::text().required());

        control.set_value("abc", Emit::Notify);
        assert_eq!(adapter.state().value, Value::from("abc"));
        assert!(!adapter.state().invalid);

        control.mark_as_touched();
        assert!(adapter.state().touched);
    }

    #[test]
    fn test_quiet_writes_need_sync() {
        let (control, adapter) = bound(FieldConfig::text());

        control.add_validator(Validator::Required);
        control.update_value_and_validity(Emit::Quiet);
        assert!(!adapter.state().required);

        adapter.sync();
        assert!(adapter.state().required);
        assert!(adapter.state().invalid);
    }

    #[test]
    fn test_set_config_resynthesizes_only_on_change() {
        let (control, mut adapter) = bound(FieldConfig::text());
        control.add_validator(Validator::Required);

        assert!(!adapter.set_config(FieldConfig::text()));
        assert!(control.has_validator(&Validator::Required));

        assert!(adapter.set_config(FieldConfig::text().min_length(2)));
        assert_eq!(control.validators(), vec![Validator::MinLength(2)]);
    }

    #[test]
    fn test_unbind_stops_updates() {
        let (control, mut adapter) = bound(FieldConfig::text());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = adapter.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        control.set_value("a", Emit::Notify);
        let seen = calls.load(Ordering::SeqCst);
        assert!(seen > 0);

        assert!(adapter.unbind().is_some());
        assert_eq!(control.subscriber_count(), 0);
        control.set_value("b", Emit::Notify);
        assert_eq!(calls.load(Ordering::SeqCst), seen);
        assert_eq!(adapter.state().value, Value::from("a"));
    }

    #[test]
    fn test_error_message_only_when_shown() {
        let (control, adapter) = bound(FieldConfig::text().min_length(3));
        control.set_value("ab", Emit::Notify);
        let messages = ErrorMessages::default();

        assert_eq!(adapter.error_message(&messages), "");
        control.mark_as_touched();
        assert!(adapter.show_error());
        assert_eq!(
            adapter.error_message(&messages),
            "Minimum 3 characters required"
        );
    }

    #[test]
    fn test_password_strength() {
        let (control, adapter) = bound(FieldConfig::text().password_strength());
        control.set_value("Abc", Emit::Notify);
        assert_eq!(adapter.password_strength().map(|s| s.score()), Some(40));

        let (_, plain) = bound(FieldConfig::text());
        assert!(plain.password_strength().is_none());
    }

    #[test]
    fn test_clear() {
        let (control, adapter) = bound(FieldConfig::integer());
        control.set_value(12, Emit::Notify);
        adapter.clear();
        assert_eq!(control.value(), Value::Number(0.0));

        let (text, adapter) = bound(FieldConfig::text());
        text.set_value("x", Emit::Notify);
        adapter.clear();
        assert_eq!(text.value(), Value::Null);
    }
}
