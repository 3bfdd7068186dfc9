use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use super::events::{ControlEvent, ControlStatus, Emit};
use crate::filter::InputFilter;
use crate::subscription::{Listeners, Subscription};
use crate::validation::{AsyncValidator, ValidationErrors, Validator, validate_all};
use crate::value::Value;

/// Unique identifier for a Control instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(usize);

impl ControlId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__control_{}", self.0)
    }
}

/// Internal state for a Control
#[derive(Debug, Default)]
struct ControlInner {
    /// Current value
    value: Value,
    /// Disabled controls skip validation and leave the form value
    disabled: bool,
    /// The user has left the field at least once
    touched: bool,
    /// The user has edited the field
    dirty: bool,
    /// An async validator is running
    pending: bool,
    /// Attached sync validators, in evaluation order
    validators: Vec<Validator>,
    /// Attached async validators, run only when the sync ones pass
    async_validators: Vec<AsyncValidator>,
    /// Result of the last validation
    errors: Option<ValidationErrors>,
}

impl ControlInner {
    fn revalidate(&mut self) {
        self.errors = if self.disabled {
            None
        } else {
            validate_all(&self.validators, &self.value)
        };
    }

    fn status(&self) -> ControlStatus {
        if self.disabled {
            ControlStatus::Disabled
        } else if self.pending {
            ControlStatus::Pending
        } else if self.errors.is_some() {
            ControlStatus::Invalid
        } else {
            ControlStatus::Valid
        }
    }
}

/// Handle to one form field's value, status and validators.
///
/// `Control` is cheap to clone; clones share state. Every write takes an
/// [`Emit`] mode: [`Emit::Notify`] reports the change to subscribers (and,
/// through the owning [`Form`](crate::Form), to rule evaluation), while
/// [`Emit::Quiet`] applies it silently.
///
/// # Example
///
/// ```
/// use formwire::control::{Control, Emit};
/// use formwire::validation::Validator;
///
/// let name = Control::with_validators("", vec![Validator::Required]);
/// assert!(name.is_invalid());
///
/// name.set_value("Ada", Emit::Notify);
/// assert!(name.is_valid());
/// ```
#[derive(Debug, Clone)]
pub struct Control {
    id: ControlId,
    inner: Arc<RwLock<ControlInner>>,
    events: Listeners<ControlEvent>,
}

impl Control {
    /// Create a control holding `value` with no validators.
    pub fn new(value: impl Into<Value>) -> Self {
        Self::with_validators(value, Vec::new())
    }

    /// Create a control with validators, validated immediately.
    pub fn with_validators(value: impl Into<Value>, validators: Vec<Validator>) -> Self {
        let mut inner = ControlInner {
            value: value.into(),
            validators,
            ..Default::default()
        };
        inner.revalidate();
        Self {
            id: ControlId::new(),
            inner: Arc::new(RwLock::new(inner)),
            events: Listeners::new(),
        }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    pub fn value(&self) -> Value {
        self.read(|inner| inner.value.clone())
    }

    pub fn status(&self) -> ControlStatus {
        self.inner
            .read()
            .map(|guard| guard.status())
            .unwrap_or(ControlStatus::Invalid)
    }

    pub fn is_valid(&self) -> bool {
        self.status() == ControlStatus::Valid
    }

    pub fn is_invalid(&self) -> bool {
        self.status() == ControlStatus::Invalid
    }

    pub fn is_disabled(&self) -> bool {
        self.read(|inner| inner.disabled)
    }

    pub fn is_enabled(&self) -> bool {
        !self.is_disabled()
    }

    pub fn is_touched(&self) -> bool {
        self.read(|inner| inner.touched)
    }

    pub fn is_dirty(&self) -> bool {
        self.read(|inner| inner.dirty)
    }

    pub fn is_pending(&self) -> bool {
        self.read(|inner| inner.pending)
    }

    /// Failures from the last validation, `None` when valid or disabled.
    pub fn errors(&self) -> Option<ValidationErrors> {
        self.read(|inner| inner.errors.clone())
    }

    pub fn validators(&self) -> Vec<Validator> {
        self.read(|inner| inner.validators.clone())
    }

    pub fn has_validator(&self, validator: &Validator) -> bool {
        self.read(|inner| inner.validators.contains(validator))
    }

    /// Run the attached validators against an arbitrary value.
    ///
    /// Does not touch the control's own value or status.
    pub fn validate_value(&self, value: &Value) -> Option<ValidationErrors> {
        self.read(|inner| validate_all(&inner.validators, value))
    }

    // -------------------------------------------------------------------------
    // Write methods
    // -------------------------------------------------------------------------

    /// Replace the value and revalidate.
    pub fn set_value(&self, value: impl Into<Value>, emit: Emit) {
        let value = value.into();
        let Some(status) = self.write(|inner| {
            inner.value = value.clone();
            inner.revalidate();
            inner.status()
        }) else {
            return;
        };
        self.notify(
            emit,
            [
                ControlEvent::ValueChanged(value),
                ControlEvent::StatusChanged(status),
            ],
        );
    }

    /// Commit raw keyboard input after passing it through `filter`.
    ///
    /// Marks the control dirty and notifies. Returns the committed text.
    pub fn set_input(&self, raw: &str, filter: &InputFilter) -> String {
        let filtered = filter.apply(raw);
        self.write(|inner| inner.dirty = true);
        self.set_value(filtered.clone(), Emit::Notify);
        filtered
    }

    /// Reset the value and clear the touched/dirty flags.
    pub fn reset(&self, value: impl Into<Value>, emit: Emit) {
        let value = value.into();
        let Some(status) = self.write(|inner| {
            inner.value = value.clone();
            inner.touched = false;
            inner.dirty = false;
            inner.revalidate();
            inner.status()
        }) else {
            return;
        };
        self.notify(
            emit,
            [
                ControlEvent::TouchedChanged(false),
                ControlEvent::ValueChanged(value),
                ControlEvent::StatusChanged(status),
            ],
        );
    }

    pub fn enable(&self, emit: Emit) {
        self.set_enabled(true, emit);
    }

    pub fn disable(&self, emit: Emit) {
        self.set_enabled(false, emit);
    }

    /// Enable or disable the control.
    ///
    /// Disabling clears errors; enabling revalidates. Either way the value
    /// visible to the form changes, so a notifying write reports both a value
    /// and a status change.
    pub fn set_enabled(&self, enabled: bool, emit: Emit) {
        let Some((value, status)) = self.write(|inner| {
            inner.disabled = !enabled;
            inner.revalidate();
            (inner.value.clone(), inner.status())
        }) else {
            return;
        };
        self.notify(
            emit,
            [
                ControlEvent::ValueChanged(value),
                ControlEvent::StatusChanged(status),
            ],
        );
    }

    pub fn mark_as_touched(&self) {
        self.set_touched(true);
    }

    pub fn mark_as_untouched(&self) {
        self.set_touched(false);
    }

    fn set_touched(&self, touched: bool) {
        let changed = self.write(|inner| std::mem::replace(&mut inner.touched, touched) != touched);
        if changed == Some(true) {
            self.notify(Emit::Notify, [ControlEvent::TouchedChanged(touched)]);
        }
    }

    // -------------------------------------------------------------------------
    // Validators
    // -------------------------------------------------------------------------

    /// Replace the validator list.
    ///
    /// Like the other validator mutators this does not revalidate; follow up
    /// with [`Control::update_value_and_validity`].
    pub fn set_validators(&self, validators: Vec<Validator>) {
        self.write(|inner| inner.validators = validators);
    }

    /// Attach a validator unless an equal one is already attached.
    pub fn add_validator(&self, validator: Validator) {
        self.write(|inner| {
            if !inner.validators.contains(&validator) {
                inner.validators.push(validator);
            }
        });
    }

    /// Detach every validator equal to `validator`.
    pub fn remove_validator(&self, validator: &Validator) {
        self.write(|inner| inner.validators.retain(|attached| attached != validator));
    }

    pub fn set_async_validators(&self, validators: Vec<AsyncValidator>) {
        self.write(|inner| inner.async_validators = validators);
    }

    /// Recompute errors for the current value.
    pub fn update_value_and_validity(&self, emit: Emit) {
        let Some((value, status)) = self.write(|inner| {
            inner.revalidate();
            (inner.value.clone(), inner.status())
        }) else {
            return;
        };
        self.notify(
            emit,
            [
                ControlEvent::ValueChanged(value),
                ControlEvent::StatusChanged(status),
            ],
        );
    }

    /// Run the async validators for the current value.
    ///
    /// Skipped when the control is disabled, already failing a sync validator,
    /// or has no async validators. While running the control is
    /// [`ControlStatus::Pending`]. Results for a value that was replaced in the
    /// meantime are discarded.
    pub async fn validate_async(&self) -> ControlStatus {
        let (value, validators) = match self.inner.read() {
            Ok(guard)
                if guard.disabled || guard.errors.is_some() || guard.async_validators.is_empty() =>
            {
                return guard.status();
            }
            Ok(guard) => (guard.value.clone(), guard.async_validators.clone()),
            Err(_) => return ControlStatus::Invalid,
        };

        self.write(|inner| inner.pending = true);
        self.notify(
            Emit::Notify,
            [ControlEvent::StatusChanged(ControlStatus::Pending)],
        );

        let mut errors = ValidationErrors::new();
        for validator in &validators {
            if let Some(failed) = validator.validate(value.clone()).await {
                errors.merge(failed);
            }
        }

        let status = self
            .write(|inner| {
                inner.pending = false;
                if inner.value == value {
                    inner.errors = errors.into_option();
                } else {
                    log::debug!("Discarding async validation for superseded value of {}", self.id);
                }
                inner.status()
            })
            .unwrap_or(ControlStatus::Invalid);
        self.notify(Emit::Notify, [ControlEvent::StatusChanged(status)]);
        status
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Observe value, status and touched changes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ControlEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    /// Number of live subscriptions on this control.
    pub fn subscriber_count(&self) -> usize {
        self.events.len()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn read<T: Default>(&self, f: impl FnOnce(&ControlInner) -> T) -> T {
        self.inner.read().map(|guard| f(&guard)).unwrap_or_default()
    }

    fn write<T>(&self, f: impl FnOnce(&mut ControlInner) -> T) -> Option<T> {
        self.inner.write().ok().map(|mut guard| f(&mut guard))
    }

    fn notify<const N: usize>(&self, emit: Emit, events: [ControlEvent; N]) {
        if emit.is_quiet() {
            return;
        }
        for event in &events {
            log::trace!("{} {:?}", self.id, event);
            self.events.emit(event);
        }
    }
}
