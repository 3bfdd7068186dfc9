//! Keyed field visibility with per-key change notification.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::subscription::{Listeners, Subscription};

/// A batch of visibility writes.
pub type VisibilityDelta = BTreeMap<String, bool>;

#[derive(Debug, Default)]
struct VisibilityInner {
    /// Explicitly written keys. Absent keys are visible.
    state: HashMap<String, bool>,
    /// Write calls applied so far.
    revision: u64,
    /// Per-key watchers, created on first subscription and removed with the
    /// last.
    watchers: HashMap<String, Listeners<bool>>,
}

/// Visibility state shared by every reader of one form.
///
/// One store belongs to one form scope; cloning shares it. Every write call is
/// a single atomic update that notifies each affected key at most once, and
/// only when the key's visibility actually changed.
///
/// # Example
///
/// ```
/// use formwire::VisibilityStore;
///
/// let store = VisibilityStore::new();
/// let fixed = store.is_visible("fixedAmount");
/// assert!(fixed.get());
///
/// store.set_visibility([("fixedAmount", false), ("minAmount", true)]);
/// assert!(!fixed.get());
/// ```
#[derive(Debug, Clone, Default)]
pub struct VisibilityStore {
    inner: Arc<RwLock<VisibilityInner>>,
    updates: Listeners<VisibilityDelta>,
}

impl VisibilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of writes in one update.
    ///
    /// If a key repeats inside the batch the last entry wins.
    pub fn set_visibility<I, K>(&self, delta: I)
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        let delta: VisibilityDelta = delta.into_iter().map(|(k, v)| (k.into(), v)).collect();

        let (changed, watchers) = {
            let Ok(mut guard) = self.inner.write() else {
                return;
            };
            guard.revision += 1;
            let mut changed = Vec::new();
            for (key, &visible) in &delta {
                let before = guard.state.insert(key.clone(), visible).unwrap_or(true);
                if before != visible {
                    changed.push((key.clone(), visible));
                }
            }
            let watchers = watchers_for(&guard, &changed);
            (changed, watchers)
        };

        log::trace!(
            "Visibility update: {} keys written, {} changed",
            delta.len(),
            changed.len()
        );
        self.updates.emit(&delta);
        notify(watchers);
    }

    /// Write a single key.
    pub fn set_visible(&self, key: impl Into<String>, visible: bool) {
        self.set_visibility([(key.into(), visible)]);
    }

    /// Live view of one key's visibility.
    pub fn is_visible(&self, key: impl Into<String>) -> Visibility {
        Visibility {
            key: key.into(),
            store: self.clone(),
        }
    }

    /// Current visibility of a key (`true` unless written otherwise).
    pub fn visible(&self, key: &str) -> bool {
        self.inner
            .read()
            .map(|guard| guard.state.get(key).copied().unwrap_or(true))
            .unwrap_or(true)
    }

    /// Forget every write; all keys become visible again.
    pub fn reset(&self) {
        let (restored, watchers) = {
            let Ok(mut guard) = self.inner.write() else {
                return;
            };
            guard.revision += 1;
            let restored: Vec<(String, bool)> = guard
                .state
                .drain()
                .filter(|(_, visible)| !visible)
                .map(|(key, _)| (key, true))
                .collect();
            let watchers = watchers_for(&guard, &restored);
            (restored, watchers)
        };

        let delta: VisibilityDelta = restored.into_iter().collect();
        self.updates.emit(&delta);
        notify(watchers);
    }

    /// Copy of the explicitly written entries.
    pub fn state(&self) -> VisibilityDelta {
        self.inner
            .read()
            .map(|guard| {
                guard
                    .state
                    .iter()
                    .map(|(key, visible)| (key.clone(), *visible))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of write calls (including resets) applied so far.
    pub fn revision(&self) -> u64 {
        self.inner.read().map(|guard| guard.revision).unwrap_or(0)
    }

    /// Observe every write call with the delta it applied.
    pub fn on_update<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&VisibilityDelta) + Send + Sync + 'static,
    {
        self.updates.subscribe(callback)
    }

    fn subscribe_key<F>(&self, key: &str, callback: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        let subscription = match self.inner.write() {
            Ok(mut guard) => guard
                .watchers
                .entry(key.to_string())
                .or_default()
                .subscribe(callback),
            Err(_) => return Subscription::empty(),
        };

        // Drop the key's watcher list with its last subscription.
        let inner = Arc::downgrade(&self.inner);
        let key = key.to_string();
        Subscription::new(move || {
            drop(subscription);
            if let Some(inner) = inner.upgrade()
                && let Ok(mut guard) = inner.write()
                && guard.watchers.get(&key).is_some_and(|l| l.len() == 0)
            {
                guard.watchers.remove(&key);
            }
        })
    }
}

fn watchers_for(
    inner: &VisibilityInner,
    changed: &[(String, bool)],
) -> Vec<(Listeners<bool>, bool)> {
    changed
        .iter()
        .filter_map(|(key, visible)| {
            inner
                .watchers
                .get(key)
                .map(|listeners| (listeners.clone(), *visible))
        })
        .collect()
}

fn notify(watchers: Vec<(Listeners<bool>, bool)>) {
    for (listeners, visible) in watchers {
        listeners.emit(&visible);
    }
}

/// Live, re-evaluating view of one key in a [`VisibilityStore`].
#[derive(Debug, Clone)]
pub struct Visibility {
    key: String,
    store: VisibilityStore,
}

impl Visibility {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value: the stored entry, or `true` when never written.
    pub fn get(&self) -> bool {
        self.store.visible(&self.key)
    }

    /// Be told whenever this key's visibility flips.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.store
            .subscribe_key(&self.key, move |visible| callback(*visible))
    }
}
