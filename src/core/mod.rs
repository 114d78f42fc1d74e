// ============================================================================
// subject-store - Core Module
// Observable contract, errors, and the scheduler context
// ============================================================================

pub mod context;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use context::{is_ticking, with_context, DeferredTask, SchedulerContext, TaskId};
pub use error::{PathError, StoreError};
pub use types::{
    default_equals, CloneFn, CloneStrategy, EqualsFn, Observable, SubscriberFn, Subscription,
};
