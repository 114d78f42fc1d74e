// ============================================================================
// subject-store - Observable State Containers for Rust
// ============================================================================
//
// Subjects hold a value and push it to subscribers. Stores add change
// detection against a retained clone, safe stores make that clone deep,
// derived stores view a parent through a lens, and watched stores turn
// in-place JSON mutation into one batched emission per tick. Bindings give
// a consumer a synchronized snapshot plus a setter.
// ============================================================================

pub mod core;
pub mod path;
pub mod primitives;
pub mod reactivity;

// Re-export core items at crate root
pub use core::context::{is_ticking, TaskId};
pub use core::error::{PathError, StoreError};
pub use core::types::{
    default_equals, CloneFn, CloneStrategy, EqualsFn, Observable, SubscriberFn, Subscription,
};

// Re-export primitives at crate root
pub use primitives::binding::{bind_derived, bind_store, StoreBinding};
pub use primitives::derived::{derived_store, DerivedStore};
pub use primitives::lens::{Getter, Lens, LensKind, Setter};
pub use primitives::safe::{safe_store, SafeStore};
pub use primitives::store::{store, Store, StoreOptions};
pub use primitives::subject::{subject, Subject};
pub use primitives::watched::{compare_values, watched_store, Watched, WatchedStore};

// Re-export reactivity functions
pub use reactivity::cloning::{deep_clone, try_deep_clone};
pub use reactivity::equality::{equals, json_equals, never_equals, safe_equals_f64};
pub use reactivity::scheduling::{cancel, defer, flush_deferred, pending_tasks, tick};

// =============================================================================
// TESTS
// =============================================================================
