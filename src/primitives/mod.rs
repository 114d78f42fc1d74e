// ============================================================================
// subject-store - Primitives Module
// Containers: subject, store, safe store, derived store, watched store
// ============================================================================

pub mod binding;
pub mod derived;
pub mod lens;
pub mod safe;
pub mod store;
pub mod subject;
pub mod watched;

// Re-export for convenience
pub use binding::{bind_derived, bind_store, StoreBinding};
pub use derived::{derived_store, DerivedStore};
pub use lens::{Getter, Lens, LensKind, Setter};
pub use safe::{safe_store, SafeStore};
pub use store::{store, Store, StoreOptions};
pub use subject::{subject, Subject, SubjectInner};
pub use watched::{compare_values, watched_store, Watched, WatchedStore};
