// ============================================================================
// subject-store - Derived Stores
// A store viewing part of a parent observable through a lens
// ============================================================================
//
// A DerivedStore is BOTH a subscriber (of its parent) AND a store (with its
// own subscribers and change-detection gate). Parent emissions flow down
// through the lens getter into the inner store; writes flow up through the
// lens setter into the parent and come back down as a parent emission.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::types::{default_equals, CloneStrategy, Observable, SubscriberFn, Subscription};
use crate::primitives::lens::Lens;
use crate::primitives::store::{Store, StoreOptions};
use crate::reactivity::cloning::cloner_for;

// =============================================================================
// DERIVED INNER
// =============================================================================

struct DerivedInner<O, I> {
    /// Holds the derived value and the derived subscribers
    store: Store<O>,

    parent: Rc<dyn Observable<I>>,

    lens: Lens<I, O>,

    /// Our subscription on the parent
    upstream: Subscription,
}

impl<O, I> Drop for DerivedInner<O, I> {
    fn drop(&mut self) {
        self.upstream.unsubscribe();
    }
}

// =============================================================================
// DERIVEDSTORE<O, I>
// =============================================================================

/// A store whose value is read from, and written back to, a parent.
///
/// The derived store subscribes to its parent on creation. Its own `next`
/// does not emit directly: the value goes through the lens setter to the
/// parent, and the derived value changes when the parent emits.
///
/// The derived store copies values the way its parent does, so a lens on a
/// [`SafeStore`](crate::SafeStore) detects in-place mutation too.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use subject_store::{DerivedStore, Lens, Store};
///
/// let state = Store::new(json!({"count": 1, "name": "demo"}));
/// let count = DerivedStore::new(&state, Lens::path("count"));
///
/// count.next(json!(2));
/// assert_eq!(state.value(), json!({"count": 2, "name": "demo"}));
/// assert_eq!(count.value(), json!(2));
/// ```
pub struct DerivedStore<O, I> {
    inner: Rc<DerivedInner<O, I>>,
}

impl<O, I> Clone for DerivedStore<O, I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<O, I> DerivedStore<O, I>
where
    O: Clone + PartialEq + Serialize + DeserializeOwned + 'static,
    I: 'static,
{
    /// Derive a store from `parent` through `lens`.
    pub fn new<P>(parent: &P, lens: Lens<I, O>) -> Self
    where
        P: Observable<I> + Clone + 'static,
    {
        Self::with_options(parent, lens, StoreOptions::default())
    }

    /// Derive a store with options for the inner store.
    pub fn with_options<P>(parent: &P, lens: Lens<I, O>, options: StoreOptions<O>) -> Self
    where
        P: Observable<I> + Clone + 'static,
    {
        let parent: Rc<dyn Observable<I>> = Rc::new(parent.clone());
        Self::from_rc(parent, lens, options)
    }

    /// Derive a store from an already shared parent.
    pub fn from_rc(
        parent: Rc<dyn Observable<I>>,
        lens: Lens<I, O>,
        options: StoreOptions<O>,
    ) -> Self {
        let strategy = parent.clone_strategy();
        let store = Store::with_clone_fn(
            lens.get(&parent.value()),
            cloner_for::<O>(strategy),
            strategy,
            options.equals.unwrap_or(default_equals::<O>),
            options.label,
        );

        // The parent replays its value while we subscribe; the store already
        // holds it, so only emissions after subscribe returns are forwarded.
        let ready = Rc::new(Cell::new(false));
        let upstream = {
            let store = store.clone();
            let getter = lens.getter();
            let ready = ready.clone();
            parent.subscribe_boxed(Rc::new(move |value: &I| {
                if ready.get() {
                    store.next(getter(value));
                }
            }))
        };
        ready.set(true);
        tracing::trace!(store = options.label, ?strategy, "derived store attached");

        Self {
            inner: Rc::new(DerivedInner {
                store,
                parent,
                lens,
                upstream,
            }),
        }
    }
}

impl<O: Clone + 'static, I: 'static> DerivedStore<O, I> {
    /// Get the current value (cloning).
    pub fn value(&self) -> O {
        self.inner.store.value()
    }

    /// Access the current value with a closure (avoids cloning).
    pub fn with<R>(&self, f: impl FnOnce(&O) -> R) -> R {
        self.inner.store.with(f)
    }

    /// Write `value` back to the parent through the lens setter.
    ///
    /// Writes through a read-only lens are dropped.
    pub fn next(&self, value: O) {
        let parent_value = self.inner.parent.value();
        match self.inner.lens.put(value, parent_value) {
            Some(updated) => self.inner.parent.next(updated),
            None => tracing::debug!(
                store = self.inner.store.label(),
                "write dropped: lens is read-only"
            ),
        }
    }

    /// Register a subscriber and call it once with the current value.
    pub fn subscribe(&self, observer: impl Fn(&O) + 'static) -> Subscription {
        self.inner.store.subscribe(observer)
    }

    /// Register an already shared subscriber.
    pub fn subscribe_boxed(&self, observer: SubscriberFn<O>) -> Subscription {
        self.inner.store.subscribe_boxed(observer)
    }

    /// Detach from the parent, then remove every subscriber.
    ///
    /// Safe to call more than once.
    pub fn complete(&self) {
        self.inner.upstream.unsubscribe();
        self.inner.store.complete();
    }

    /// Whether [`complete`](Self::complete) has run.
    pub fn is_completed(&self) -> bool {
        self.inner.upstream.is_closed()
    }

    /// Number of registered subscribers.
    pub fn observer_count(&self) -> usize {
        self.inner.store.observer_count()
    }

    /// The strategy inherited from the parent.
    pub fn clone_strategy(&self) -> CloneStrategy {
        self.inner.store.clone_strategy()
    }

    /// The lens this view reads and writes through.
    pub fn lens(&self) -> &Lens<I, O> {
        &self.inner.lens
    }

    /// The observable this view follows.
    pub fn parent(&self) -> &Rc<dyn Observable<I>> {
        &self.inner.parent
    }

    /// The inner store holding the derived value.
    pub fn as_store(&self) -> &Store<O> {
        &self.inner.store
    }
}

impl<O: Clone + 'static, I: 'static> Observable<O> for DerivedStore<O, I> {
    fn value(&self) -> O {
        DerivedStore::value(self)
    }

    fn next(&self, value: O) {
        DerivedStore::next(self, value)
    }

    fn subscribe_boxed(&self, observer: SubscriberFn<O>) -> Subscription {
        DerivedStore::subscribe_boxed(self, observer)
    }

    fn observer_count(&self) -> usize {
        DerivedStore::observer_count(self)
    }

    fn complete(&self) {
        DerivedStore::complete(self)
    }

    fn clone_strategy(&self) -> CloneStrategy {
        DerivedStore::clone_strategy(self)
    }
}

impl<O: std::fmt::Debug, I> std::fmt::Debug for DerivedStore<O, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedStore")
            .field("store", &self.inner.store)
            .field("lens", &self.inner.lens)
            .field("completed", &self.inner.upstream.is_closed())
            .finish()
    }
}

/// Create a new [`DerivedStore`].
pub fn derived_store<O, I, P>(parent: &P, lens: Lens<I, O>) -> DerivedStore<O, I>
where
    O: Clone + PartialEq + Serialize + DeserializeOwned + 'static,
    I: 'static,
    P: Observable<I> + Clone + 'static,
{
    DerivedStore::new(parent, lens)
}

// =============================================================================
// TESTS
// =============================================================================
