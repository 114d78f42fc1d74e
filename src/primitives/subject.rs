// ============================================================================
// subject-store - Subject
// The minimal observable: current value + synchronous subscribers
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::core::types::{Observable, SubscriberFn, Subscription};

// =============================================================================
// SUBJECT INNER
// =============================================================================

/// The shared state behind every clone of a [`Subject`].
pub struct SubjectInner<T> {
    /// Current value, only replaced through `next`
    value: RefCell<T>,

    /// Subscribers keyed by a monotonically increasing id (registration order)
    subscribers: RefCell<BTreeMap<u64, SubscriberFn<T>>>,

    /// Next subscription id
    next_id: Cell<u64>,
}

impl<T> SubjectInner<T> {
    fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            subscribers: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(0),
        }
    }

    fn remove_subscriber(&self, id: u64) {
        // Drop the callback after the borrow ends: it may own other handles
        let removed = self.subscribers.borrow_mut().remove(&id);
        if removed.is_some() {
            tracing::trace!(id, "subscriber removed");
        }
    }
}

// =============================================================================
// SUBJECT<T>
// =============================================================================

/// A minimal observable holding a current value.
///
/// `next` replaces the value and notifies every subscriber synchronously.
/// It never compares values; see [`Store`](crate::Store) for that.
/// New subscribers receive the current value immediately.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use subject_store::Subject;
///
/// let subject = Subject::new(1);
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let sub = subject.subscribe({
///     let seen = seen.clone();
///     move |v| seen.borrow_mut().push(*v)
/// });
/// subject.next(2);
/// subject.next(2);
///
/// assert_eq!(*seen.borrow(), vec![1, 2, 2]);
/// sub.unsubscribe();
/// ```
pub struct Subject<T> {
    inner: Rc<SubjectInner<T>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Subject<T> {
    /// Create a subject with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(SubjectInner::new(value)),
        }
    }

    /// Get the current value (cloning).
    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Access the current value with a closure (avoids cloning).
    ///
    /// Do not call `next` on the same subject from inside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value and notify every subscriber.
    pub fn next(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.notify();
    }

    /// Register a subscriber and call it once with the current value.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        self.subscribe_boxed(Rc::new(observer))
    }

    /// Register an already shared subscriber.
    pub fn subscribe_boxed(&self, observer: SubscriberFn<T>) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .insert(id, observer.clone());
        tracing::trace!(id, "subscriber added");

        // Replay the current value
        let current = self.value();
        observer(&current);

        let weak: Weak<SubjectInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.remove_subscriber(id);
            }
        })
    }

    /// Remove every subscriber. Later `next` calls reach nobody.
    pub fn complete(&self) {
        let removed = self.inner.subscribers.replace(BTreeMap::new());
        tracing::trace!(count = removed.len(), "subject completed");
    }

    /// Number of registered subscribers.
    pub fn observer_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Mutate the value in place without notifying anyone.
    pub(crate) fn modify_silently<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.value.borrow_mut())
    }

    /// Call every subscriber registered right now, in registration order.
    ///
    /// Callbacks are collected first and each one receives the value as it
    /// is when that callback runs, so a subscriber calling `next` is seen by
    /// the subscribers after it.
    fn notify(&self) {
        let observers: Vec<SubscriberFn<T>> =
            self.inner.subscribers.borrow().values().cloned().collect();
        tracing::trace!(count = observers.len(), "notifying subscribers");

        for observer in observers {
            let current = self.value();
            observer(&current);
        }
    }

    /// Get a reference to the inner state (for advanced use).
    pub fn inner(&self) -> &Rc<SubjectInner<T>> {
        &self.inner
    }
}

impl<T: Clone + 'static> Observable<T> for Subject<T> {
    fn value(&self) -> T {
        Subject::value(self)
    }

    fn next(&self, value: T) {
        Subject::next(self, value)
    }

    fn subscribe_boxed(&self, observer: SubscriberFn<T>) -> Subscription {
        Subject::subscribe_boxed(self, observer)
    }

    fn observer_count(&self) -> usize {
        Subject::observer_count(self)
    }

    fn complete(&self) {
        Subject::complete(self)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("value", &*self.inner.value.borrow())
            .field("observers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

/// Create a new [`Subject`].
pub fn subject<T: Clone + 'static>(value: T) -> Subject<T> {
    Subject::new(value)
}

// =============================================================================
// TESTS
// =============================================================================
