#![forbid(unsafe_code)]

//! Listener registries with RAII unsubscription.
//!
//! # Design
//!
//! Both the live controller and the query store fan events out to
//! registered callbacks. Registration hands back a [`ListenerGuard`]
//! holding the only strong reference to the callback; the registry keeps
//! a `Weak`, so dropping the guard unregisters. Fan-out upgrades the
//! live callbacks into a snapshot first and only then invokes them, so a
//! listener added or removed from inside a callback never disturbs the
//! delivery already in progress.
//!
//! # Invariants
//!
//! 1. Listeners are invoked in registration order.
//! 2. A listener dropped during fan-out still receives the in-progress
//!    event; it stops receiving from the next event on.
//! 3. A listener registered during fan-out first receives the next event.
//! 4. Dead entries are pruned lazily on each fan-out.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// Keeps a listener registered; dropping it unregisters.
#[must_use = "dropping the guard unregisters the listener"]
pub struct ListenerGuard {
    _strong: Box<dyn Any>,
}

impl ListenerGuard {
    fn hold<T: 'static>(strong: CallbackRc<T>) -> Self {
        // `Rc<dyn Fn(&T)>` cannot coerce to `Rc<dyn Any>` directly, so the
        // strong reference is boxed behind a type-erased holder instead.
        Self {
            _strong: Box::new(strong),
        }
    }
}

/// Append-ordered callback set for table-level notifications.
pub struct Listeners<T: 'static> {
    inner: RefCell<Vec<CallbackWeak<T>>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Listeners<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Vec::new()),
        }
    }

    pub fn add(&self, listener: impl Fn(&T) + 'static) -> ListenerGuard {
        let strong: CallbackRc<T> = Rc::new(listener);
        self.inner.borrow_mut().push(Rc::downgrade(&strong));
        ListenerGuard::hold(strong)
    }

    /// Number of live listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every registration. Outstanding guards become inert.
    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }

    /// Delivers `event` to every listener live at the time of the call.
    pub fn notify(&self, event: &T) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut listeners = self.inner.borrow_mut();
            listeners.retain(|w| w.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in callbacks {
            callback(event);
        }
    }
}

/// Per-key listener registry for item-level notifications.
pub struct KeyedListeners<T: 'static> {
    inner: RefCell<AHashMap<String, Vec<CallbackWeak<T>>>>,
}

impl<T> Default for KeyedListeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> KeyedListeners<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(AHashMap::new()),
        }
    }

    pub fn add(&self, key: impl Into<String>, listener: impl Fn(&T) + 'static) -> ListenerGuard {
        let strong: CallbackRc<T> = Rc::new(listener);
        self.inner
            .borrow_mut()
            .entry(key.into())
            .or_default()
            .push(Rc::downgrade(&strong));
        ListenerGuard::hold(strong)
    }

    /// True when at least one live listener is registered for `key`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.inner
            .borrow()
            .get(key)
            .is_some_and(|ws| ws.iter().any(|w| w.strong_count() > 0))
    }

    /// Drops every registration. Outstanding guards become inert.
    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }

    /// Delivers `event` to every listener registered for `key`.
    pub fn notify(&self, key: &str, event: &T) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut map = self.inner.borrow_mut();
            let Some(listeners) = map.get_mut(key) else {
                return;
            };
            listeners.retain(|w| w.strong_count() > 0);
            if listeners.is_empty() {
                map.remove(key);
                return;
            }
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in callbacks {
            callback(event);
        }
    }
}
