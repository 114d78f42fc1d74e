// ============================================================================
// subject-store - Deferred Scheduling
// A cooperative zero-delay task queue used to coalesce watched mutations
// ============================================================================
//
// There is no event loop in a library, so the host drives the queue:
// - defer: queue a task for the next tick
// - cancel: drop a queued task (cancel-and-reschedule debouncing)
// - tick: run the tasks queued before the call
// - flush_deferred: tick until the queue is empty, with loop detection
// ============================================================================

use crate::core::context::{with_context, TaskId};

/// Maximum ticks `flush_deferred` runs before we consider it an infinite loop
const MAX_FLUSH_COUNT: u32 = 1000;

/// Queue `task` to run on the next [`tick`].
pub fn defer(task: impl FnOnce() + 'static) -> TaskId {
    let id = with_context(|ctx| ctx.push_task(Box::new(task)));
    tracing::trace!(task = ?id, "deferred task queued");
    id
}

/// Cancel a queued task. Returns false if it already ran or was cancelled.
pub fn cancel(id: TaskId) -> bool {
    let removed = with_context(|ctx| ctx.remove_task(id));
    if removed {
        tracing::trace!(task = ?id, "deferred task cancelled");
    }
    removed
}

/// Number of tasks waiting for the next tick.
pub fn pending_tasks() -> usize {
    with_context(|ctx| ctx.pending_count())
}

/// Run every task queued before this call.
///
/// Tasks deferred while this tick runs wait for the next one. Returns the
/// number of tasks that ran.
pub fn tick() -> usize {
    let limit = with_context(|ctx| ctx.next_id());
    let was_ticking = with_context(|ctx| ctx.set_ticking(true));
    let mut count = 0;

    // Pop one task at a time and run it outside of with_context, so tasks
    // can defer more work and cancel tasks that have not run yet
    while let Some((id, task)) = with_context(|ctx| ctx.pop_task_before(limit)) {
        tracing::trace!(task = ?id, "running deferred task");
        task();
        count += 1;
    }

    with_context(|ctx| ctx.set_ticking(was_ticking));
    count
}

/// Tick until no task is left. Returns the total number of tasks run.
///
/// # Panics
///
/// Panics if tasks keep rescheduling themselves for more than 1000 ticks.
pub fn flush_deferred() -> usize {
    let mut total = 0;
    let mut flush_count = 0u32;

    loop {
        let ran = tick();
        if ran == 0 {
            break;
        }
        total += ran;

        flush_count += 1;
        if flush_count > MAX_FLUSH_COUNT {
            panic!(
                "Maximum deferred flush depth exceeded. A deferred task keeps \
                 scheduling more work; check for subscribers that mutate a \
                 watched store on every emission."
            );
        }
    }

    total
}

// =============================================================================
// TESTS
// =============================================================================
