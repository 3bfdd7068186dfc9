//! Rule evaluation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::rule::{RuleAction, RuleSet};
use crate::control::{Control, Emit};
use crate::form::{FieldAccessor, Form};
use crate::subscription::Subscription;
use crate::validation::Validator;
use crate::value::FormSnapshot;
use crate::visibility::{VisibilityDelta, VisibilityStore};

/// Follow-up passes one call may run before giving up on a form that keeps
/// changing.
const MAX_FOLLOW_UPS: usize = 16;

#[derive(Debug, Default)]
struct EngineState {
    /// A pass is running.
    evaluating: AtomicBool,
    /// Latest snapshot of a change that arrived while a pass was running.
    owed: Mutex<Option<FormSnapshot>>,
    /// A live binding drives this engine.
    attached: AtomicBool,
    /// Completed passes.
    passes: AtomicU64,
}

impl EngineState {
    fn owed(&self) -> MutexGuard<'_, Option<FormSnapshot>> {
        self.owed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the evaluating flag for one call. Resets it when the call ends, even
/// by unwinding.
struct PassGuard<'a> {
    state: &'a EngineState,
    open: bool,
}

impl<'a> PassGuard<'a> {
    /// Claim the engine, or record `snapshot` as owed when a pass is running.
    fn acquire(state: &'a EngineState, snapshot: &FormSnapshot) -> Option<Self> {
        let mut owed = state.owed();
        if state.evaluating.swap(true, Ordering::SeqCst) {
            log::debug!("Value changed during a rule pass, queued a follow-up");
            *owed = Some(snapshot.clone());
            return None;
        }
        Some(Self { state, open: true })
    }

    /// Take the owed snapshot, or release the engine when nothing is owed.
    fn next_owed(&mut self) -> Option<FormSnapshot> {
        let mut owed = self.state.owed();
        let next = owed.take();
        if next.is_none() {
            self.state.evaluating.store(false, Ordering::SeqCst);
            self.open = false;
        }
        next
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        if self.open {
            let mut owed = self.state.owed();
            *owed = None;
            self.state.evaluating.store(false, Ordering::SeqCst);
        }
    }
}

/// Applies a [`RuleSet`] to a form's controls and visibility.
///
/// Side effects on controls are written with [`Emit::Quiet`], so a pass never
/// triggers another pass by itself. Visibility writes of one pass are batched into a
/// single [`VisibilityStore::set_visibility`] call.
///
/// # Example
///
/// ```
/// use formwire::rules::{FieldRule, RuleEngine, RuleSet};
/// use formwire::{Emit, Form, VisibilityStore};
///
/// let form = Form::builder()
///     .value("flag", false)
///     .value("a", "")
///     .build()
///     .unwrap();
/// let rules = RuleSet::new([FieldRule::visible(["a"], |v| v["flag"] == false)]).unwrap();
///
/// let store = VisibilityStore::new();
/// let engine = RuleEngine::new(store.clone());
/// let _binding = engine.attach(&form, rules);
///
/// form.get("flag").unwrap().set_value(true, Emit::Notify);
/// assert!(!store.visible("a"));
/// assert!(form.get("a").unwrap().is_disabled());
/// ```
#[derive(Debug, Clone)]
pub struct RuleEngine {
    visibility: VisibilityStore,
    state: Arc<EngineState>,
}

impl RuleEngine {
    pub fn new(visibility: VisibilityStore) -> Self {
        Self {
            visibility,
            state: Arc::new(EngineState::default()),
        }
    }

    pub fn visibility(&self) -> &VisibilityStore {
        &self.visibility
    }

    /// Number of completed evaluation passes.
    pub fn passes(&self) -> u64 {
        self.state.passes.load(Ordering::SeqCst)
    }

    /// Run one pass of `rules` against `snapshot`.
    ///
    /// A call made while a pass is running on this engine (from a host
    /// observer that writes a value, say) returns `false` and is owed: once
    /// the running pass ends, another pass runs against the latest owed
    /// snapshot, repeating until nothing is owed. Rule targets missing from
    /// `fields` are skipped.
    pub fn evaluate<A>(&self, snapshot: &FormSnapshot, rules: &RuleSet, fields: &A) -> bool
    where
        A: FieldAccessor + ?Sized,
    {
        self.settle(snapshot, rules, fields, || None)
    }

    /// Run a pass, then the owed follow-ups. `current` supplies a fresh
    /// snapshot for each follow-up, falling back to the owed one.
    fn settle<A, F>(
        &self,
        snapshot: &FormSnapshot,
        rules: &RuleSet,
        fields: &A,
        current: F,
    ) -> bool
    where
        A: FieldAccessor + ?Sized,
        F: Fn() -> Option<FormSnapshot>,
    {
        let Some(mut guard) = PassGuard::acquire(&self.state, snapshot) else {
            return false;
        };
        self.pass(snapshot, rules, fields);

        let mut follow_ups = 0;
        while let Some(owed) = guard.next_owed() {
            if follow_ups == MAX_FOLLOW_UPS {
                log::warn!(
                    "Form still changing after {} follow-up rule passes, giving up",
                    follow_ups
                );
                break;
            }
            follow_ups += 1;
            let snapshot = current().unwrap_or(owed);
            self.pass(&snapshot, rules, fields);
        }
        true
    }

    fn pass<A>(&self, snapshot: &FormSnapshot, rules: &RuleSet, fields: &A)
    where
        A: FieldAccessor + ?Sized,
    {
        let mut delta = VisibilityDelta::new();
        for rule in rules {
            let matched = rule.matches(snapshot);
            for key in rule.fields() {
                if rule.action() == RuleAction::Visible {
                    delta.insert(key.clone(), matched);
                }
                match fields.control(key) {
                    Some(control) => apply(rule.action(), control, matched),
                    None => log::debug!("Rule target '{}' not in form, skipped", key),
                }
            }
        }

        if !delta.is_empty() {
            self.visibility.set_visibility(delta);
        }
        let passes = self.state.passes.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("Rule pass {} applied {} rules", passes, rules.len());
    }

    /// Evaluate `rules` now and after every value change of `form`.
    ///
    /// The returned binding owns the subscription; dropping it stops
    /// evaluation. While a binding is live, further `attach` calls on this
    /// engine do nothing and return an inert binding.
    pub fn attach(&self, form: &Form, rules: RuleSet) -> RuleBinding {
        if self.state.attached.swap(true, Ordering::SeqCst) {
            log::debug!("Rule engine already attached, ignoring");
            return RuleBinding {
                subscription: Subscription::empty(),
                state: None,
            };
        }

        let rules = Arc::new(rules);
        self.settle(&form.value(), &rules, form, || Some(form.value()));

        let engine = self.clone();
        let weak = form.downgrade();
        let subscription = form.subscribe(move |snapshot| {
            if let Some(form) = weak.upgrade() {
                engine.settle(snapshot, &rules, &form, || Some(form.value()));
            }
        });

        RuleBinding {
            subscription,
            state: Some(Arc::clone(&self.state)),
        }
    }
}

fn apply(action: RuleAction, control: &Control, matched: bool) {
    match action {
        RuleAction::Visible | RuleAction::Enable => {
            if control.is_enabled() != matched {
                control.set_enabled(matched, Emit::Quiet);
            }
        }
        RuleAction::Required => {
            if matched {
                control.add_validator(Validator::Required);
            } else {
                control.remove_validator(&Validator::Required);
            }
            control.update_value_and_validity(Emit::Quiet);
        }
    }
}

/// Live connection between a [`RuleEngine`] and a [`Form`].
#[derive(Debug)]
#[must_use = "dropping a RuleBinding stops rule evaluation"]
pub struct RuleBinding {
    subscription: Subscription,
    state: Option<Arc<EngineState>>,
}

impl RuleBinding {
    /// Whether this binding drives evaluation (false for a duplicate attach).
    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    /// Stop evaluating. Equivalent to dropping the binding.
    pub fn detach(self) {}
}

impl Drop for RuleBinding {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            state.attached.store(false, Ordering::SeqCst);
        }
    }
}
