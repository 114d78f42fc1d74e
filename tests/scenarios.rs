//! Counter scenarios across every container, driven through bindings the
//! way a view layer would use them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use subject_store::{
    bind_derived, bind_store, flush_deferred, CloneStrategy, Lens, Observable, SafeStore, Store,
    StoreBinding, SubscriberFn, Subscription, WatchedStore,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Counter {
    count: i64,
}

fn count_lens() -> Lens<Counter, i64> {
    Lens::function(|c: &Counter| c.count, |count, _| Counter { count })
}

// =============================================================================
// Store
// =============================================================================

#[test]
fn test_store_counter() {
    let counter = Store::new(Counter { count: 0 });
    let button = bind_derived(&counter, count_lens(), |_| {});
    assert_eq!(button.get(), 0);

    counter.next(Counter {
        count: counter.value().count + 1,
    });
    assert_eq!(button.get(), 1);

    counter.next(Counter { count: 0 });
    assert_eq!(button.get(), 0);
}

#[test]
fn test_store_shared_rc_mutation_goes_unnoticed() {
    let shared = Rc::new(RefCell::new(Counter { count: 0 }));
    let counter = Store::new(shared.clone());
    let hits = Rc::new(Cell::new(0));
    let _binding = bind_store(&counter, {
        let hits = hits.clone();
        move |_| hits.set(hits.get() + 1)
    });

    shared.borrow_mut().count += 1;
    assert!(!counter.next(shared.clone()));
    assert_eq!(hits.get(), 0);
}

// =============================================================================
// SafeStore
// =============================================================================

#[test]
fn test_safe_store_counter_buttons_share_state() {
    let shared = Rc::new(RefCell::new(Counter { count: 0 }));
    let counter = SafeStore::new(shared.clone());
    let increment = || {
        shared.borrow_mut().count += 1;
        counter.next(shared.clone());
    };
    let read = Lens::read_only(|c: &Rc<RefCell<Counter>>| c.borrow().count);

    let one = bind_derived(&counter, read.clone(), |_| {});
    let two = bind_derived(&counter, read, |_| {});

    increment();
    assert_eq!((one.get(), two.get()), (1, 1));
    increment();
    assert_eq!((one.get(), two.get()), (2, 2));

    drop((one, two));
    assert_eq!(counter.observer_count(), 0);
}

#[test]
fn test_safe_store_and_update_style() {
    let counter = SafeStore::new(Counter { count: 0 });
    let button: StoreBinding<i64> = bind_derived(&counter, count_lens(), |_| {});

    button.set(button.get() + 1);
    button.update(|c| *c += 1);

    assert_eq!(counter.value(), Counter { count: 2 });
    assert_eq!(button.get(), 2);
}

#[test]
fn test_safe_store_update_during_render() {
    let counter = SafeStore::new(Counter { count: 0 });
    let button = bind_derived(&counter, count_lens(), |_| {});

    // A consumer bumping the store right after binding still sees the bump
    counter.next(Counter { count: 1 });

    assert_eq!(button.get(), 1);
}

// =============================================================================
// WatchedStore
// =============================================================================

fn watched_counter() -> WatchedStore {
    WatchedStore::new(json!({"count": 0, "numbers": []}))
}

fn increment(store: &WatchedStore) {
    store
        .value()
        .at("count")
        .update(|v| *v = json!(v.as_i64().unwrap_or(0) + 1));
}

#[test]
fn test_watched_counter_buttons_share_state() {
    let store = watched_counter();
    let one = bind_derived(&store, Lens::path("count"), |_| {});
    let two = bind_derived(&store, Lens::path("count"), |_| {});

    increment(&store);
    assert_eq!(one.get(), json!(0), "Nothing is emitted before the tick");
    flush_deferred();
    assert_eq!((one.get(), two.get()), (json!(1), json!(1)));

    increment(&store);
    flush_deferred();
    assert_eq!((one.get(), two.get()), (json!(2), json!(2)));
}

#[test]
fn test_watched_reset_through_set_value() {
    let store = watched_counter();
    let count = bind_derived(&store, Lens::path("count"), |_| {});
    increment(&store);
    flush_deferred();

    store.set_value(json!({"count": 0, "numbers": []}));

    assert_eq!(count.get(), json!(0));
}

#[test]
fn test_watched_array_manipulations_trigger_updates() {
    let store = watched_counter();
    let shown = Rc::new(RefCell::new(String::new()));
    let _numbers = bind_derived(&store, Lens::path("numbers"), {
        let shown = shown.clone();
        move |v: &Value| {
            let parts: Vec<String> = v
                .as_array()
                .map(|items| items.iter().map(Value::to_string).collect())
                .unwrap_or_default();
            *shown.borrow_mut() = parts.join(",");
        }
    });
    let numbers = store.value().at("numbers");

    numbers.push([json!(2)]);
    flush_deferred();
    assert_eq!(*shown.borrow(), "2");

    numbers.push([json!(4), json!(3)]);
    flush_deferred();
    assert_eq!(*shown.borrow(), "2,4,3");

    numbers.sort();
    flush_deferred();
    assert_eq!(*shown.borrow(), "2,3,4");
}

// =============================================================================
// Foreign observables
// =============================================================================

/// A minimal observable that knows nothing about this crate's stores.
#[derive(Clone)]
struct Behavior {
    value: Rc<RefCell<Value>>,
    observers: Rc<RefCell<Vec<(u64, SubscriberFn<Value>)>>>,
    next_id: Rc<Cell<u64>>,
}

impl Behavior {
    fn new(value: Value) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            observers: Rc::new(RefCell::new(Vec::new())),
            next_id: Rc::new(Cell::new(0)),
        }
    }
}

impl Observable<Value> for Behavior {
    fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    fn next(&self, value: Value) {
        *self.value.borrow_mut() = value.clone();
        let observers: Vec<_> = self.observers.borrow().iter().map(|(_, f)| f.clone()).collect();
        for observer in observers {
            observer(&value);
        }
    }

    fn subscribe_boxed(&self, observer: SubscriberFn<Value>) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.observers.borrow_mut().push((id, observer.clone()));
        observer(&self.value());

        let observers = Rc::downgrade(&self.observers);
        Subscription::new(move || {
            if let Some(observers) = observers.upgrade() {
                observers.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }

    fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    fn complete(&self) {
        self.observers.borrow_mut().clear();
    }
}

#[test]
fn test_foreign_observable_and_update_style() {
    let counter = Behavior::new(json!({"count": 0}));

    {
        let button = bind_derived(&counter, Lens::path("count"), |_| {});
        assert_eq!(button.get(), json!(0));
        button.set(json!(button.get().as_i64().unwrap_or(0) + 1));
        assert_eq!(button.get(), json!(1));
    }

    assert_eq!(counter.value(), json!({"count": 1}));
    assert_eq!(counter.observer_count(), 0, "Everything unbound, no observers left");
}

#[test]
fn test_foreign_observable_uses_shared_strategy() {
    let counter = Behavior::new(json!({"count": 0}));
    let derived = subject_store::DerivedStore::new(&counter, Lens::path("count"));
    assert_eq!(derived.clone_strategy(), CloneStrategy::Shared);
}
