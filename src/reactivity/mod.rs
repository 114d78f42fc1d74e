// ============================================================================
// subject-store - Reactivity Module
// Change detection, clone strategies, and deferred scheduling
// ============================================================================

pub mod cloning;
pub mod equality;
pub mod scheduling;

// Re-export the functions stores build on
pub use cloning::{cloner_for, deep_clone, try_deep_clone};
pub use equality::{equals, json_equals, never_equals, safe_equals_f64};
pub use scheduling::{cancel, defer, flush_deferred, pending_tasks, tick};
