// ============================================================================
// subject-store - Type Definitions
// The observable contract shared by every store flavour
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// FUNCTION TYPES
// =============================================================================

/// Callback invoked with the observable's current value.
pub type SubscriberFn<T> = Rc<dyn Fn(&T)>;

/// Equality function used by the change-detection gate.
pub type EqualsFn<T> = fn(&T, &T) -> bool;

/// Clone hook producing a store's comparison baseline.
pub type CloneFn<T> = Rc<dyn Fn(&T) -> T>;

/// Default equality using PartialEq
pub fn default_equals<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

/// How a store copies emitted values into its comparison baseline.
///
/// Derived stores inherit the strategy of their parent, so a lens over a
/// [`SafeStore`](crate::SafeStore) is itself protected against in-place
/// mutation of emitted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloneStrategy {
    /// `Clone::clone`. Shares anything behind `Rc`.
    #[default]
    Shared,
    /// Full structural copy that breaks all sharing.
    Deep,
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle owning exactly one entry in an observable's subscriber map.
///
/// Dropping a `Subscription` does NOT unsubscribe; call
/// [`unsubscribe`](Subscription::unsubscribe) or use a
/// [`StoreBinding`](crate::StoreBinding), which does it on drop.
pub struct Subscription {
    teardown: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    /// Wrap the teardown that removes this subscription's entry.
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: RefCell::new(Some(Box::new(teardown))),
        }
    }

    /// A subscription that is already closed.
    pub fn closed() -> Self {
        Self {
            teardown: RefCell::new(None),
        }
    }

    /// Remove the subscriber. Calling this again is a no-op.
    pub fn unsubscribe(&self) {
        // Take first so the teardown runs without the cell borrowed
        let teardown = self.teardown.borrow_mut().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    /// Whether `unsubscribe` already ran.
    pub fn is_closed(&self) -> bool {
        self.teardown.borrow().is_none()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

// =============================================================================
// OBSERVABLE
// =============================================================================

/// The contract a binding layer (or a lens) needs from a state container.
///
/// Object safe: lenses keep their parent as `Rc<dyn Observable<I>>`, which
/// lets foreign observables act as parents too.
pub trait Observable<T> {
    /// Current value.
    fn value(&self) -> T;

    /// Request a state transition. Stores may suppress it, lenses redirect it.
    fn next(&self, value: T);

    /// Register a subscriber; it is called once immediately with the current
    /// value, then on every emission.
    fn subscribe_boxed(&self, observer: SubscriberFn<T>) -> Subscription;

    /// Number of registered subscribers.
    fn observer_count(&self) -> usize;

    /// Release every subscriber (and any upstream subscription).
    fn complete(&self);

    /// How this observable clones values for comparison.
    fn clone_strategy(&self) -> CloneStrategy {
        CloneStrategy::Shared
    }

    /// Register a closure as subscriber.
    fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + 'static,
        Self: Sized,
    {
        self.subscribe_boxed(Rc::new(observer))
    }
}

// =============================================================================
// TESTS
// =============================================================================
