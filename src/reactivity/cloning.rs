// ============================================================================
// subject-store - Clone Strategies
// Producing the baseline a store compares the next value against
// ============================================================================

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::error::StoreError;
use crate::core::types::{CloneFn, CloneStrategy};

/// Copy `value` through the serde data model, breaking all sharing.
///
/// `Rc<RefCell<_>>` fields come back as fresh allocations, so later in-place
/// mutation of the original cannot reach the copy.
pub fn try_deep_clone<T>(value: &T) -> Result<T, StoreError>
where
    T: Serialize + DeserializeOwned,
{
    let json = serde_json::to_value(value)?;
    Ok(serde_json::from_value(json)?)
}

/// Deep clone that never fails: falls back to `Clone::clone` with a warning.
///
/// # Example
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use subject_store::reactivity::cloning::deep_clone;
///
/// let shared = Rc::new(RefCell::new(vec![1, 2]));
/// let copy = deep_clone(&shared);
/// shared.borrow_mut().push(3);
///
/// assert_eq!(*copy.borrow(), vec![1, 2]);
/// ```
pub fn deep_clone<T>(value: &T) -> T
where
    T: Clone + Serialize + DeserializeOwned,
{
    match try_deep_clone(value) {
        Ok(copy) => copy,
        Err(err) => {
            tracing::warn!(error = %err, "deep clone failed, falling back to Clone");
            value.clone()
        }
    }
}

/// `Clone::clone` as a clone hook.
pub fn shared_cloner<T: Clone + 'static>() -> CloneFn<T> {
    Rc::new(T::clone)
}

/// [`deep_clone`] as a clone hook.
pub fn deep_cloner<T>() -> CloneFn<T>
where
    T: Clone + Serialize + DeserializeOwned + 'static,
{
    Rc::new(deep_clone::<T>)
}

/// The clone hook implementing `strategy` for `T`.
pub fn cloner_for<T>(strategy: CloneStrategy) -> CloneFn<T>
where
    T: Clone + Serialize + DeserializeOwned + 'static,
{
    match strategy {
        CloneStrategy::Shared => shared_cloner(),
        CloneStrategy::Deep => deep_cloner(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
