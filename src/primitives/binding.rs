// ============================================================================
// subject-store - Store Bindings
// A local copy of a store's value kept in sync for a consumer
// ============================================================================
//
// A binding is what a view layer holds: a snapshot it can read without
// touching the store, a callback that fires when the store emits, and a
// setter that forwards writes. Dropping the binding releases everything it
// registered, so a store goes back to zero observers once every binding is
// gone.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::types::{Observable, Subscription};
use crate::primitives::derived::DerivedStore;
use crate::primitives::lens::Lens;

/// Snapshot and change callback, shared with the store subscription.
struct BindingState<T> {
    snapshot: RefCell<T>,
    on_change: Box<dyn Fn(&T)>,
}

// =============================================================================
// STOREBINDING<T>
// =============================================================================

/// A consumer's view of an observable.
///
/// The snapshot starts at the store's current value and follows every later
/// emission; the replay on subscribe is not reported to `on_change`.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use subject_store::{bind_store, Store};
///
/// let store = Store::new(0);
/// let renders = Rc::new(Cell::new(0));
/// let binding = bind_store(&store, {
///     let renders = renders.clone();
///     move |_| renders.set(renders.get() + 1)
/// });
///
/// binding.set(1);
/// assert_eq!(binding.get(), 1);
/// assert_eq!(renders.get(), 1);
///
/// drop(binding);
/// assert_eq!(store.observer_count(), 0);
/// ```
pub struct StoreBinding<T> {
    source: Rc<dyn Observable<T>>,
    state: Rc<BindingState<T>>,
    subscription: Subscription,
    /// Complete `source` on drop (it was created for this binding)
    owns_source: bool,
}

impl<T: Clone + 'static> StoreBinding<T> {
    fn attach(
        source: Rc<dyn Observable<T>>,
        on_change: Box<dyn Fn(&T)>,
        owns_source: bool,
    ) -> Self {
        let state = Rc::new(BindingState {
            snapshot: RefCell::new(source.value()),
            on_change,
        });

        let ready = Rc::new(Cell::new(false));
        let subscription = {
            let state = state.clone();
            let ready = ready.clone();
            source.subscribe_boxed(Rc::new(move |value: &T| {
                if !ready.get() {
                    return;
                }
                *state.snapshot.borrow_mut() = value.clone();
                (state.on_change)(value);
            }))
        };
        ready.set(true);

        Self {
            source,
            state,
            subscription,
            owns_source,
        }
    }

    /// The last value seen (cloning).
    pub fn get(&self) -> T {
        self.state.snapshot.borrow().clone()
    }

    /// Access the last value seen with a closure (avoids cloning).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.snapshot.borrow())
    }

    /// Forward `value` to the source's `next`.
    ///
    /// The snapshot changes only when the source emits.
    pub fn set(&self, value: T) {
        self.source.next(value);
    }

    /// Set a modified copy of the snapshot.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// The observable this binding follows.
    pub fn source(&self) -> &Rc<dyn Observable<T>> {
        &self.source
    }
}

impl<T> Drop for StoreBinding<T> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
        if self.owns_source {
            self.source.complete();
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for StoreBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreBinding")
            .field("snapshot", &self.state.snapshot.borrow())
            .field("owns_source", &self.owns_source)
            .finish()
    }
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

/// Bind to `store`, calling `on_change` on every emission after this call.
pub fn bind_store<T, S>(store: &S, on_change: impl Fn(&T) + 'static) -> StoreBinding<T>
where
    T: Clone + 'static,
    S: Observable<T> + Clone + 'static,
{
    StoreBinding::attach(Rc::new(store.clone()), Box::new(on_change), false)
}

/// Bind to a view of `parent` through `lens`.
///
/// The derived store is owned by the binding and completed when the binding
/// is dropped.
pub fn bind_derived<O, I, P>(
    parent: &P,
    lens: Lens<I, O>,
    on_change: impl Fn(&O) + 'static,
) -> StoreBinding<O>
where
    O: Clone + PartialEq + Serialize + DeserializeOwned + 'static,
    I: 'static,
    P: Observable<I> + Clone + 'static,
{
    let derived = DerivedStore::new(parent, lens);
    StoreBinding::attach(Rc::new(derived), Box::new(on_change), true)
}

// =============================================================================
// TESTS
// =============================================================================
