// ============================================================================
// subject-store - Watched Store
// A JSON store that notices in-place mutation and emits once per tick
// ============================================================================
//
// Mutations go through `Watched` cursors. A cursor is a weak handle on the
// store plus a path; it resolves lazily, so cursors taken before a `next`
// operate on the new value at the same path. Every mutation edits the live
// value silently and reschedules a single flush on the deferred queue; the
// flush runs the value through the store's change-detection gate.
// ============================================================================

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::core::context::TaskId;
use crate::core::types::{CloneStrategy, Observable, SubscriberFn, Subscription};
use crate::path::{self, Path, Segment};
use crate::primitives::store::Store;
use crate::reactivity::cloning::shared_cloner;
use crate::reactivity::equality::json_equals;
use crate::reactivity::scheduling::{cancel, defer};

// =============================================================================
// WATCHED INNER
// =============================================================================

struct WatchedInner {
    store: Store<Value>,

    /// The queued flush, if any
    pending: Cell<Option<TaskId>>,
}

impl WatchedInner {
    fn cancel_pending(&self) -> bool {
        match self.pending.take() {
            Some(id) => cancel(id),
            None => false,
        }
    }
}

/// Replace the queued flush with a new one.
fn schedule_flush(inner: &Rc<WatchedInner>) {
    inner.cancel_pending();

    let weak: Weak<WatchedInner> = Rc::downgrade(inner);
    let id = defer(move || {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.pending.set(None);
        let current = inner.store.value();
        inner.store.next(current);
    });
    inner.pending.set(Some(id));
    tracing::debug!(store = inner.store.label(), task = ?id, "watched flush scheduled");
}

// =============================================================================
// WATCHEDSTORE
// =============================================================================

/// A store over a JSON document that can be mutated in place.
///
/// [`value`](WatchedStore::value) hands out a [`Watched`] cursor. Writes
/// through cursors are batched: however many happen before the next
/// [`tick`](crate::tick), subscribers see at most one emission, and none if
/// the document ends up equal to the last emitted one.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use serde_json::json;
/// use subject_store::{tick, WatchedStore};
///
/// let store = WatchedStore::new(json!({"numbers": []}));
/// let hits = Rc::new(Cell::new(0));
/// let _sub = store.subscribe({
///     let hits = hits.clone();
///     move |_| hits.set(hits.get() + 1)
/// });
///
/// let numbers = store.value().at("numbers");
/// numbers.push([json!(2)]);
/// numbers.push([json!(4), json!(3)]);
/// tick();
///
/// assert_eq!(hits.get(), 2); // replay + one batched change
/// assert_eq!(store.snapshot(), json!({"numbers": [2, 4, 3]}));
/// ```
#[derive(Clone)]
pub struct WatchedStore {
    inner: Rc<WatchedInner>,
}

impl WatchedStore {
    pub fn new(value: Value) -> Self {
        Self::with_label(value, None)
    }

    /// Create a watched store whose log events carry `label`.
    pub fn with_label(value: Value, label: Option<&'static str>) -> Self {
        // Value::clone already copies the whole document
        let store = Store::with_clone_fn(
            value,
            shared_cloner(),
            CloneStrategy::Deep,
            json_equals,
            label,
        );
        Self {
            inner: Rc::new(WatchedInner {
                store,
                pending: Cell::new(None),
            }),
        }
    }

    /// A cursor on the whole document.
    pub fn value(&self) -> Watched {
        Watched {
            store: Rc::downgrade(&self.inner),
            path: Vec::new(),
        }
    }

    /// A copy of the current document.
    pub fn snapshot(&self) -> Value {
        self.inner.store.value()
    }

    /// Access the current document with a closure (avoids cloning).
    pub fn with<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        self.inner.store.with(f)
    }

    /// Replace the document, emitting unless it equals the last emission.
    ///
    /// Existing cursors keep their paths and now address the new document.
    pub fn next(&self, value: Value) -> bool {
        self.inner.store.next(value)
    }

    /// Same as [`next`](Self::next).
    pub fn set_value(&self, value: Value) -> bool {
        self.next(value)
    }

    /// Register a subscriber and call it once with the current document.
    pub fn subscribe(&self, observer: impl Fn(&Value) + 'static) -> Subscription {
        self.inner.store.subscribe(observer)
    }

    /// Register an already shared subscriber.
    pub fn subscribe_boxed(&self, observer: SubscriberFn<Value>) -> Subscription {
        self.inner.store.subscribe_boxed(observer)
    }

    /// Remove every subscriber and drop the queued flush.
    pub fn complete(&self) {
        self.inner.cancel_pending();
        self.inner.store.complete();
    }

    /// Number of registered subscribers.
    pub fn observer_count(&self) -> usize {
        self.inner.store.observer_count()
    }

    /// Whether a flush is waiting for the next tick.
    pub fn has_pending_flush(&self) -> bool {
        self.inner.pending.get().is_some()
    }

    pub fn label(&self) -> Option<&'static str> {
        self.inner.store.label()
    }

    /// The underlying store.
    pub fn as_store(&self) -> &Store<Value> {
        &self.inner.store
    }
}

impl Observable<Value> for WatchedStore {
    fn value(&self) -> Value {
        self.snapshot()
    }

    fn next(&self, value: Value) {
        WatchedStore::next(self, value);
    }

    fn subscribe_boxed(&self, observer: SubscriberFn<Value>) -> Subscription {
        WatchedStore::subscribe_boxed(self, observer)
    }

    fn observer_count(&self) -> usize {
        WatchedStore::observer_count(self)
    }

    fn complete(&self) {
        WatchedStore::complete(self)
    }

    fn clone_strategy(&self) -> CloneStrategy {
        CloneStrategy::Deep
    }
}

impl fmt::Debug for WatchedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchedStore")
            .field("store", &self.inner.store)
            .field("pending", &self.inner.pending.get())
            .finish()
    }
}

/// Create a new [`WatchedStore`].
pub fn watched_store(value: Value) -> WatchedStore {
    WatchedStore::new(value)
}

// =============================================================================
// WATCHED CURSOR
// =============================================================================

/// A live view of one location inside a [`WatchedStore`].
///
/// Cursors do not keep the store alive. Once it is gone, reads return
/// `null` and mutations do nothing.
///
/// Mutating closures (`update`, `sort_by`) run while the document is
/// borrowed and must not read from or write to the same store.
#[derive(Clone)]
pub struct Watched {
    store: Weak<WatchedInner>,
    path: Vec<Segment>,
}

impl Watched {
    /// A cursor one level deeper. Nothing is resolved yet.
    pub fn at(&self, segment: impl Into<Segment>) -> Watched {
        let mut path = self.path.clone();
        path.push(segment.into());
        Watched {
            store: self.store.clone(),
            path,
        }
    }

    /// The location this cursor addresses.
    pub fn path(&self) -> Path {
        Path::from_segments(self.path.clone())
    }

    /// A plain copy of the value here, `null` if it does not resolve.
    pub fn unwatched(&self) -> Value {
        self.read(|found| found.cloned()).unwrap_or(Value::Null)
    }

    /// Whether the cursor resolves to a value.
    pub fn exists(&self) -> bool {
        self.read(|found| found.is_some())
    }

    /// Whether the value here is an array.
    pub fn is_array(&self) -> bool {
        self.read(|found| found.is_some_and(Value::is_array))
    }

    /// Length of the array here, `None` if it is not an array.
    pub fn len(&self) -> Option<usize> {
        self.read(|found| found.and_then(Value::as_array).map(Vec::len))
    }

    /// Replace the value here, creating missing containers on the way.
    ///
    /// Returns false if the path cannot be applied to the document.
    pub fn assign(&self, value: Value) -> bool {
        let path = self.path();
        self.mutate(|root| match path::set_in_place(root, &path, value) {
            Ok(()) => Some(()),
            Err(err) => {
                tracing::warn!(%path, error = %err, "watched assign rejected");
                None
            }
        })
        .is_some()
    }

    /// Assign to a child of this location.
    pub fn set(&self, key: impl Into<Segment>, value: Value) -> bool {
        self.at(key).assign(value)
    }

    /// Edit the value here in place. Returns false if it does not resolve.
    pub fn update(&self, f: impl FnOnce(&mut Value)) -> bool {
        let segments = &self.path;
        self.mutate(|root| path::get_mut(root, segments).map(f))
            .is_some()
    }

    /// Append `items`; returns the new length.
    pub fn push(&self, items: impl IntoIterator<Item = Value>) -> Option<usize> {
        self.mutate_array(|array| {
            array.extend(items);
            array.len()
        })
    }

    /// Remove the last element.
    pub fn pop(&self) -> Option<Value> {
        self.mutate_array(Vec::pop).flatten()
    }

    /// Prepend `items` keeping their order; returns the new length.
    pub fn unshift(&self, items: impl IntoIterator<Item = Value>) -> Option<usize> {
        self.mutate_array(|array| {
            let tail = std::mem::take(array);
            array.extend(items);
            array.extend(tail);
            array.len()
        })
    }

    /// Remove the first element.
    pub fn shift(&self) -> Option<Value> {
        self.mutate_array(|array| (!array.is_empty()).then(|| array.remove(0)))
            .flatten()
    }

    /// Remove `delete_count` elements from `start` and insert `items` there.
    ///
    /// `start` and `delete_count` are clamped to the array. Returns the
    /// removed elements.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        items: impl IntoIterator<Item = Value>,
    ) -> Option<Vec<Value>> {
        self.mutate_array(|array| {
            let start = start.min(array.len());
            let end = start.saturating_add(delete_count).min(array.len());
            array.splice(start..end, items).collect()
        })
    }

    /// Reverse the array in place.
    pub fn reverse(&self) -> bool {
        self.mutate_array(|array| array.reverse()).is_some()
    }

    /// Sort the array with [`compare_values`].
    pub fn sort(&self) -> bool {
        self.sort_by(compare_values)
    }

    /// Sort the array with a comparator. The sort is stable.
    pub fn sort_by(&self, compare: impl FnMut(&Value, &Value) -> Ordering) -> bool {
        self.mutate_array(|array| array.sort_by(compare)).is_some()
    }

    fn read<R>(&self, f: impl FnOnce(Option<&Value>) -> R) -> R {
        match self.store.upgrade() {
            Some(inner) => inner
                .store
                .with(|root| f(path::get_ref(root, &self.path()))),
            None => f(None),
        }
    }

    /// Run `f` on the live document; schedule a flush if it returned Some.
    fn mutate<R>(&self, f: impl FnOnce(&mut Value) -> Option<R>) -> Option<R> {
        let inner = self.store.upgrade()?;
        let result = inner.store.modify_silently(f)?;
        schedule_flush(&inner);
        Some(result)
    }

    fn mutate_array<R>(&self, f: impl FnOnce(&mut Vec<Value>) -> R) -> Option<R> {
        let segments = &self.path;
        self.mutate(|root| {
            path::get_mut(root, segments)
                .and_then(Value::as_array_mut)
                .map(f)
        })
    }
}

impl fmt::Debug for Watched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watched")
            .field("path", &self.path().to_string())
            .field("attached", &(self.store.strong_count() > 0))
            .finish()
    }
}

// =============================================================================
// ORDERING
// =============================================================================

/// Total order over JSON values used by [`Watched::sort`].
///
/// Values of different kinds order as null < bool < number < string <
/// array < object. Numbers compare numerically, strings by code point,
/// arrays element by element. Objects compare by size only.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(xs), Value::Array(ys)) => xs
            .iter()
            .zip(ys)
            .map(|(x, y)| compare_values(x, y))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| xs.len().cmp(&ys.len())),
        (Value::Object(xm), Value::Object(ym)) => xm.len().cmp(&ym.len()),
        _ => rank(a).cmp(&rank(b)),
    }
}

// =============================================================================
// TESTS
// =============================================================================
