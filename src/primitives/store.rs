// ============================================================================
// subject-store - Store
// A Subject gated by change detection against a retained clone
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::types::{
    default_equals, CloneFn, CloneStrategy, EqualsFn, Observable, SubscriberFn, Subscription,
};
use crate::primitives::subject::Subject;
use crate::reactivity::cloning::shared_cloner;

// =============================================================================
// OPTIONS
// =============================================================================

/// Options for creating a store.
pub struct StoreOptions<T> {
    /// Equality used by the change-detection gate (default: PartialEq)
    pub equals: Option<EqualsFn<T>>,
    /// Name attached to this store's log events
    pub label: Option<&'static str>,
}

impl<T> Default for StoreOptions<T> {
    fn default() -> Self {
        Self {
            equals: None,
            label: None,
        }
    }
}

// =============================================================================
// STORE INNER
// =============================================================================

struct StoreInner<T> {
    subject: Subject<T>,

    /// Clone of the last emitted value, the comparison baseline
    baseline: RefCell<T>,

    /// Produces the baseline from an emitted value
    clone_fn: CloneFn<T>,

    equals: EqualsFn<T>,

    strategy: CloneStrategy,

    label: Option<&'static str>,
}

// =============================================================================
// STORE<T>
// =============================================================================

/// A change-detecting [`Subject`].
///
/// `next` is suppressed when the new value equals the last emitted one, so
/// re-deriving an unchanged state does not wake subscribers.
///
/// The baseline is produced by `Clone::clone`. For plain data that is a full
/// copy; for data behind `Rc<RefCell<_>>` it is shared, and mutating an
/// emitted value in place also changes the baseline. Use
/// [`SafeStore`](crate::SafeStore) for such data.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use subject_store::Store;
///
/// let store = Store::new(vec![1, 2]);
/// let hits = Rc::new(Cell::new(0));
/// let _sub = store.subscribe({
///     let hits = hits.clone();
///     move |_| hits.set(hits.get() + 1)
/// });
///
/// assert!(!store.next(vec![1, 2])); // equal: suppressed
/// assert!(store.next(vec![1, 2, 3]));
/// assert_eq!(hits.get(), 2); // replay + one change
/// ```
pub struct Store<T> {
    inner: Rc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Store<T> {
    /// Create a store comparing with PartialEq.
    pub fn new(value: T) -> Self
    where
        T: PartialEq,
    {
        Self::with_options(value, StoreOptions::default())
    }

    /// Create a store with options.
    pub fn with_options(value: T, options: StoreOptions<T>) -> Self
    where
        T: PartialEq,
    {
        let equals = options.equals.unwrap_or(default_equals::<T>);
        Self::with_clone_fn(
            value,
            shared_cloner(),
            CloneStrategy::Shared,
            equals,
            options.label,
        )
    }

    /// Create a store with an injected clone hook.
    ///
    /// `strategy` describes what `clone_fn` does; lenses built on this store
    /// copy their own values the same way.
    pub fn with_clone_fn(
        value: T,
        clone_fn: CloneFn<T>,
        strategy: CloneStrategy,
        equals: EqualsFn<T>,
        label: Option<&'static str>,
    ) -> Self {
        let baseline = clone_fn(&value);
        Self {
            inner: Rc::new(StoreInner {
                subject: Subject::new(value),
                baseline: RefCell::new(baseline),
                clone_fn,
                equals,
                strategy,
                label,
            }),
        }
    }

    /// Get the current value (cloning).
    pub fn value(&self) -> T {
        self.inner.subject.value()
    }

    /// Access the current value with a closure (avoids cloning).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.subject.with(f)
    }

    /// Emit `value` unless it equals the last emitted value.
    ///
    /// Returns true if subscribers were notified.
    pub fn next(&self, value: T) -> bool {
        let unchanged = {
            let baseline = self.inner.baseline.borrow();
            (self.inner.equals)(&value, &baseline)
        };
        if unchanged {
            tracing::debug!(store = self.inner.label, "next suppressed: value unchanged");
            return false;
        }

        let baseline = (self.inner.clone_fn)(&value);
        *self.inner.baseline.borrow_mut() = baseline;
        tracing::trace!(store = self.inner.label, "emitting");
        self.inner.subject.next(value);
        true
    }

    /// Register a subscriber and call it once with the current value.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        self.inner.subject.subscribe(observer)
    }

    /// Register an already shared subscriber.
    pub fn subscribe_boxed(&self, observer: SubscriberFn<T>) -> Subscription {
        self.inner.subject.subscribe_boxed(observer)
    }

    /// Remove every subscriber.
    pub fn complete(&self) {
        self.inner.subject.complete();
    }

    /// Number of registered subscribers.
    pub fn observer_count(&self) -> usize {
        self.inner.subject.observer_count()
    }

    /// How this store produces its baseline.
    pub fn clone_strategy(&self) -> CloneStrategy {
        self.inner.strategy
    }

    /// Run the store's clone hook on `value`.
    pub fn clone_value(&self, value: &T) -> T {
        (self.inner.clone_fn)(value)
    }

    /// The label given in [`StoreOptions`].
    pub fn label(&self) -> Option<&'static str> {
        self.inner.label
    }

    /// A copy of the current comparison baseline.
    pub fn baseline(&self) -> T {
        self.inner.baseline.borrow().clone()
    }

    /// Mutate the value in place without notifying or touching the baseline.
    pub(crate) fn modify_silently<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.inner.subject.modify_silently(f)
    }

    /// The underlying subject.
    pub fn subject(&self) -> &Subject<T> {
        &self.inner.subject
    }
}

impl<T: Clone + 'static> Observable<T> for Store<T> {
    fn value(&self) -> T {
        Store::value(self)
    }

    fn next(&self, value: T) {
        Store::next(self, value);
    }

    fn subscribe_boxed(&self, observer: SubscriberFn<T>) -> Subscription {
        Store::subscribe_boxed(self, observer)
    }

    fn observer_count(&self) -> usize {
        Store::observer_count(self)
    }

    fn complete(&self) {
        Store::complete(self)
    }

    fn clone_strategy(&self) -> CloneStrategy {
        Store::clone_strategy(self)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("label", &self.inner.label)
            .field("subject", &self.inner.subject)
            .field("strategy", &self.inner.strategy)
            .finish()
    }
}

/// Create a new [`Store`].
pub fn store<T: Clone + PartialEq + 'static>(value: T) -> Store<T> {
    Store::new(value)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::equality::{never_equals, safe_equals_f64};
    use std::cell::{Cell, RefCell};
    use tracing_test::traced_test;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        count: i32,
    }

    fn counting<T: 'static>(store: &Store<T>) -> (Rc<Cell<usize>>, Subscription)
    where
        T: Clone,
    {
        let hits = Rc::new(Cell::new(0));
        let sub = store.subscribe({
            let hits = hits.clone();
            move |_| hits.set(hits.get() + 1)
        });
        (hits, sub)
    }

    #[test]
    fn equal_value_is_suppressed() {
        let s = store(Counter { count: 0 });
        let (hits, _sub) = counting(&s);

        assert!(!s.next(Counter { count: 0 }));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn different_value_notifies_once_per_subscriber() {
        let s = store(Counter { count: 0 });
        let (a, _sa) = counting(&s);
        let (b, _sb) = counting(&s);

        assert!(s.next(Counter { count: 1 }));

        assert_eq!(a.get(), 2);
        assert_eq!(b.get(), 2);
        assert_eq!(s.value(), Counter { count: 1 });
        assert_eq!(s.baseline(), Counter { count: 1 });
    }

    #[test]
    fn suppressed_next_keeps_value() {
        #[derive(Debug, Clone)]
        struct Tagged {
            id: u32,
            tag: &'static str,
        }
        impl PartialEq for Tagged {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        let s = store(Tagged { id: 1, tag: "first" });
        assert!(!s.next(Tagged { id: 1, tag: "second" }));
        assert_eq!(s.value().tag, "first");
    }

    #[test]
    fn shared_baseline_goes_stale_after_in_place_mutation() {
        let shared = Rc::new(RefCell::new(Counter { count: 0 }));
        let s = store(shared.clone());
        let (hits, _sub) = counting(&s);

        // Mutating the emitted value also mutates the shared baseline
        shared.borrow_mut().count = 1;
        assert!(!s.next(shared.clone()));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn custom_equality_from_options() {
        let s = Store::with_options(
            7,
            StoreOptions {
                equals: Some(never_equals),
                label: Some("always"),
            },
        );
        let (hits, _sub) = counting(&s);

        assert!(s.next(7));
        assert_eq!(hits.get(), 2);
        assert_eq!(s.label(), Some("always"));
    }

    #[test]
    fn nan_is_stable_with_safe_equals() {
        let s = Store::with_options(
            f64::NAN,
            StoreOptions {
                equals: Some(safe_equals_f64),
                label: None,
            },
        );
        assert!(!s.next(f64::NAN));
        assert!(s.next(1.5));
    }

    #[test]
    fn end_to_end_counter() {
        let s = store(Counter { count: 0 });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sub = s.subscribe({
            let seen = seen.clone();
            move |v: &Counter| seen.borrow_mut().push(v.count)
        });

        s.next(Counter { count: 0 });
        s.next(Counter { count: 1 });

        assert_eq!(*seen.borrow(), vec![0, 1]);
        sub.unsubscribe();
        assert_eq!(s.observer_count(), 0);
    }

    #[traced_test]
    #[test]
    fn suppression_is_logged() {
        let s = Store::with_options(
            1,
            StoreOptions {
                equals: None,
                label: Some("counter"),
            },
        );
        s.next(1);
        assert!(logs_contain("next suppressed"));
        assert!(logs_contain("counter"));
    }

    #[test]
    fn store_debug() {
        let s = store(3);
        let debug_str = format!("{:?}", s);
        assert!(debug_str.contains("Store"));
        assert!(debug_str.contains("Shared"));
    }
}
