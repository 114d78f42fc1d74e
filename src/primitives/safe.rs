// ============================================================================
// subject-store - SafeStore
// A Store whose comparison baseline is a true deep copy
// ============================================================================

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::types::{
    default_equals, CloneStrategy, Observable, SubscriberFn, Subscription,
};
use crate::primitives::store::{Store, StoreOptions};
use crate::reactivity::cloning::deep_cloner;

/// A [`Store`] that deep-copies every emitted value into its baseline.
///
/// Callers may keep a handle to shared data (`Rc<RefCell<_>>`), mutate it in
/// place, and hand it back to `next`: the change is still detected because
/// the baseline never shares memory with an emitted value.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use subject_store::SafeStore;
///
/// let counter = Rc::new(RefCell::new(0));
/// let store = SafeStore::new(counter.clone());
///
/// *counter.borrow_mut() += 1;
/// assert!(store.next(counter.clone()));
/// ```
pub struct SafeStore<T> {
    store: Store<T>,
}

impl<T> Clone for SafeStore<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T> SafeStore<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned + 'static,
{
    /// Create a safe store comparing with PartialEq.
    pub fn new(value: T) -> Self {
        Self::with_options(value, StoreOptions::default())
    }

    /// Create a safe store with options.
    pub fn with_options(value: T, options: StoreOptions<T>) -> Self {
        Self {
            store: Store::with_clone_fn(
                value,
                deep_cloner(),
                CloneStrategy::Deep,
                options.equals.unwrap_or(default_equals::<T>),
                options.label,
            ),
        }
    }
}

impl<T: Clone + 'static> SafeStore<T> {
    /// Get the current value (cloning).
    pub fn value(&self) -> T {
        self.store.value()
    }

    /// Access the current value with a closure (avoids cloning).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.store.with(f)
    }

    /// Emit `value` unless it equals the last emitted value.
    pub fn next(&self, value: T) -> bool {
        self.store.next(value)
    }

    /// Register a subscriber and call it once with the current value.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        self.store.subscribe(observer)
    }

    /// Remove every subscriber.
    pub fn complete(&self) {
        self.store.complete();
    }

    /// Number of registered subscribers.
    pub fn observer_count(&self) -> usize {
        self.store.observer_count()
    }

    /// The underlying store.
    pub fn as_store(&self) -> &Store<T> {
        &self.store
    }
}

impl<T: Clone + 'static> Observable<T> for SafeStore<T> {
    fn value(&self) -> T {
        self.store.value()
    }

    fn next(&self, value: T) {
        self.store.next(value);
    }

    fn subscribe_boxed(&self, observer: SubscriberFn<T>) -> Subscription {
        self.store.subscribe_boxed(observer)
    }

    fn observer_count(&self) -> usize {
        self.store.observer_count()
    }

    fn complete(&self) {
        self.store.complete()
    }

    fn clone_strategy(&self) -> CloneStrategy {
        CloneStrategy::Deep
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SafeStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SafeStore").field(&self.store).finish()
    }
}

/// Create a new [`SafeStore`].
pub fn safe_store<T>(value: T) -> SafeStore<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned + 'static,
{
    SafeStore::new(value)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        count: i32,
    }

    type Shared = Rc<RefCell<Counter>>;

    fn increment(counter: &Shared) {
        counter.borrow_mut().count += 1;
    }

    #[test]
    fn detects_in_place_mutation() {
        let counter: Shared = Rc::new(RefCell::new(Counter { count: 0 }));
        let s = safe_store(counter.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = s.subscribe({
            let seen = seen.clone();
            move |v: &Shared| seen.borrow_mut().push(v.borrow().count)
        });

        increment(&counter);
        assert!(s.next(counter.clone()));
        increment(&counter);
        assert!(s.next(counter.clone()));

        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn equal_value_still_suppressed() {
        let s = safe_store(Counter { count: 3 });
        let hits = Rc::new(Cell::new(0));
        let _sub = s.subscribe({
            let hits = hits.clone();
            move |_| hits.set(hits.get() + 1)
        });

        assert!(!s.next(Counter { count: 3 }));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn baseline_never_shares_with_value() {
        let counter: Shared = Rc::new(RefCell::new(Counter { count: 0 }));
        let s = safe_store(counter.clone());
        let baseline = s.as_store().baseline();
        assert!(!Rc::ptr_eq(&baseline, &counter));
    }

    #[test]
    fn reports_deep_strategy() {
        let s = safe_store(vec![1]);
        assert_eq!(Observable::clone_strategy(&s), CloneStrategy::Deep);
        assert_eq!(s.as_store().clone_strategy(), CloneStrategy::Deep);
    }
}
