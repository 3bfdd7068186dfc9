//! Control change notifications.

use crate::value::Value;

/// Whether a write notifies subscribers.
///
/// Side effects applied in reaction to a change (rule passes, validator swaps)
/// use [`Emit::Quiet`] so they cannot re-trigger the code that made them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Emit {
    #[default]
    Notify,
    Quiet,
}

impl Emit {
    pub fn is_quiet(self) -> bool {
        self == Self::Quiet
    }
}

/// Validation status of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlStatus {
    Valid,
    Invalid,
    /// An async validator is still running.
    Pending,
    /// Excluded from validation and from the form value.
    Disabled,
}

/// A change reported by a control.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// The value changed, or the control was enabled/disabled.
    ValueChanged(Value),
    /// The validation status was recomputed.
    StatusChanged(ControlStatus),
    /// The control was marked touched or untouched.
    TouchedChanged(bool),
}
