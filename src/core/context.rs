// ============================================================================
// subject-store - Scheduler Context
// Thread-local state for the deferred task queue
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

// =============================================================================
// TASKS
// =============================================================================

/// Identifies a task on the deferred queue so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// A unit of deferred work.
pub type DeferredTask = Box<dyn FnOnce()>;

// =============================================================================
// SCHEDULER CONTEXT
// =============================================================================

/// Thread-local state behind [`defer`](crate::defer) and [`tick`](crate::tick).
///
/// Plays the role of a zero-delay timer queue: tasks run in the order they
/// were deferred, and a task deferred while the queue is draining waits for
/// the next tick.
pub struct SchedulerContext {
    /// Tasks waiting for the next tick, in scheduling order
    pub queue: RefCell<VecDeque<(TaskId, DeferredTask)>>,

    /// Next task id to hand out
    pub next_task_id: Cell<u64>,

    /// Whether a tick is currently running
    pub is_ticking: Cell<bool>,
}

impl SchedulerContext {
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            next_task_id: Cell::new(1),
            is_ticking: Cell::new(false),
        }
    }

    /// Queue a task, returning its id
    pub fn push_task(&self, task: DeferredTask) -> TaskId {
        let id = TaskId(self.next_task_id.get());
        self.next_task_id.set(id.0 + 1);
        self.queue.borrow_mut().push_back((id, task));
        id
    }

    /// Remove a queued task. Returns false if it already ran or was cancelled.
    pub fn remove_task(&self, id: TaskId) -> bool {
        // The removed task is dropped after the borrow ends
        let removed = {
            let mut queue = self.queue.borrow_mut();
            queue
                .iter()
                .position(|(queued, _)| *queued == id)
                .and_then(|pos| queue.remove(pos))
        };
        removed.is_some()
    }

    /// The id the next queued task will get
    pub fn next_id(&self) -> TaskId {
        TaskId(self.next_task_id.get())
    }

    /// Pop the oldest task if it was queued before `limit`.
    ///
    /// Tasks stay on the queue until they run, so a running task can still
    /// cancel the ones behind it.
    pub fn pop_task_before(&self, limit: TaskId) -> Option<(TaskId, DeferredTask)> {
        let mut queue = self.queue.borrow_mut();
        match queue.front() {
            Some((id, _)) if *id < limit => queue.pop_front(),
            _ => None,
        }
    }

    /// Number of queued tasks
    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Set ticking mode, returning previous
    pub fn set_ticking(&self, value: bool) -> bool {
        self.is_ticking.replace(value)
    }
}

impl Default for SchedulerContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// THREAD-LOCAL ACCESS
// =============================================================================

thread_local! {
    static CONTEXT: SchedulerContext = SchedulerContext::new();
}

/// Access the thread-local scheduler context.
///
/// Never run a task from inside `f`: tasks may defer more work.
pub fn with_context<R>(f: impl FnOnce(&SchedulerContext) -> R) -> R {
    CONTEXT.with(f)
}

/// Check if the deferred queue is currently being drained
pub fn is_ticking() -> bool {
    with_context(|ctx| ctx.is_ticking.get())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_ids_increase() {
        let ctx = SchedulerContext::new();
        let a = ctx.push_task(Box::new(|| {}));
        let b = ctx.push_task(Box::new(|| {}));
        assert!(b > a);
        assert_eq!(ctx.pending_count(), 2);
    }

    #[test]
    fn remove_keeps_order() {
        let ctx = SchedulerContext::new();
        let a = ctx.push_task(Box::new(|| {}));
        let b = ctx.push_task(Box::new(|| {}));
        let c = ctx.push_task(Box::new(|| {}));

        assert!(ctx.remove_task(b));
        assert!(!ctx.remove_task(b));

        let limit = ctx.next_id();
        let ids: Vec<TaskId> = std::iter::from_fn(|| ctx.pop_task_before(limit))
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(ctx.pending_count(), 0);
    }

    #[test]
    fn pop_stops_at_limit() {
        let ctx = SchedulerContext::new();
        let a = ctx.push_task(Box::new(|| {}));
        let limit = ctx.next_id();
        ctx.push_task(Box::new(|| {}));

        assert_eq!(ctx.pop_task_before(limit).map(|(id, _)| id), Some(a));
        assert!(ctx.pop_task_before(limit).is_none());
        assert_eq!(ctx.pending_count(), 1);
    }

    #[test]
    fn ticking_flag() {
        let ctx = SchedulerContext::new();
        assert!(!ctx.set_ticking(true));
        assert!(ctx.set_ticking(false));
        assert!(!is_ticking());
    }
}
