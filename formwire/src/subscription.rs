//! Callback registries and the handles that keep registrations alive.
//!
//! Every reactive read in formwire (control changes, form values, visibility
//! keys, adapter state) is a [`Listeners`] registry. Registering returns a
//! [`Subscription`]; dropping it unregisters synchronously.
//!
//! Emission copies the registered callbacks out of the lock before invoking
//! them, so a callback may re-enter the object that notified it.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Slot<E> {
    id: u64,
    active: Arc<AtomicBool>,
    callback: Callback<E>,
}

impl<E> Clone for Slot<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: Arc::clone(&self.active),
            callback: Arc::clone(&self.callback),
        }
    }
}

struct Slots<E> {
    next_id: u64,
    slots: Vec<Slot<E>>,
}

/// A set of callbacks notified with `&E`.
pub(crate) struct Listeners<E> {
    inner: Arc<RwLock<Slots<E>>>,
}

impl<E: 'static> Listeners<E> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Slots {
                next_id: 0,
                slots: Vec::new(),
            })),
        }
    }

    /// Register a callback.
    pub(crate) fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let Ok(mut guard) = self.inner.write() else {
            return Subscription::empty();
        };
        let id = guard.next_id;
        guard.next_id += 1;
        guard.slots.push(Slot {
            id,
            active: Arc::clone(&active),
            callback: Arc::new(callback),
        });
        drop(guard);

        let registry: Weak<RwLock<Slots<E>>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            active.store(false, Ordering::SeqCst);
            if let Some(registry) = registry.upgrade()
                && let Ok(mut guard) = registry.write()
            {
                guard.slots.retain(|slot| slot.id != id);
            }
        })
    }

    /// Notify every live callback.
    ///
    /// Callbacks unsubscribed while this emission is running are skipped.
    pub(crate) fn emit(&self, event: &E) {
        let slots = match self.inner.read() {
            Ok(guard) => guard.slots.clone(),
            Err(_) => return,
        };
        for slot in slots {
            if slot.active.load(Ordering::SeqCst) {
                (slot.callback)(event);
            }
        }
    }

    /// Number of registered callbacks.
    pub(crate) fn len(&self) -> usize {
        self.inner.read().map(|guard| guard.slots.len()).unwrap_or(0)
    }
}

impl<E> Clone for Listeners<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.inner.read().map(|guard| guard.slots.len()).unwrap_or(0);
        f.debug_struct("Listeners").field("count", &count).finish()
    }
}

/// Handle for a live registration.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) removes the
/// callback before returning; it will not be invoked again.
#[must_use = "dropping a Subscription unregisters its callback immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle that owns no registration.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    /// Whether this handle still owns a registration.
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Unregister the callback now.
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
