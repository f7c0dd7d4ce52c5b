//! Sliding-window admission over an `EntryQueue`.
//!
//! The coordinator is a plain state machine with two driving operations:
//! `start` dispatches the first `cap` entries, and every `on_item_finished`
//! either dispatches one more entry (one out, one in) or reports that the run
//! is over. It never runs tasks itself and never blocks; the caller owns it
//! on a single task and feeds it completions in whatever order they arrive.

use crate::entry_queue::EntryQueue;
use crate::error::OrchestratorError;
use crate::finished::FinishedEvent;

/// Injected capability that enables/disables the enclosing workflow's controls.
pub trait ControlToggle {
    fn set_enabled(&mut self, enabled: bool);
}

impl<F: FnMut(bool)> ControlToggle for F {
    fn set_enabled(&mut self, enabled: bool) {
        self(enabled)
    }
}

/// Counters for the live run. Created by `start`, dropped when the run is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    pub cap: usize,
    pub in_flight: usize,
    pub completed: usize,
    pub cancelled: bool,
}

#[derive(Debug)]
pub struct Coordinator<T> {
    queue: EntryQueue,
    run: Option<RunState>,
    controls: T,
}

impl<T: ControlToggle> Coordinator<T> {
    pub fn new(controls: T) -> Self {
        Self {
            queue: EntryQueue::new(),
            run: None,
            controls,
        }
    }

    /// Configure the entries for the next run. Rejected while a run is live.
    pub fn set_entries(
        &mut self,
        entries: impl IntoIterator<Item = usize>,
    ) -> Result<(), OrchestratorError> {
        if self.run.is_some() {
            return Err(OrchestratorError::RunActive);
        }
        self.queue.reset(entries);
        Ok(())
    }

    pub fn queue(&self) -> &EntryQueue {
        &self.queue
    }

    pub fn controls(&self) -> &T {
        &self.controls
    }

    pub fn run_state(&self) -> Option<RunState> {
        self.run
    }

    /// True from `start` until every entry completed, or until the last
    /// straggler of a cancelled run reported back.
    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    /// Stop admitting new entries. Idempotent; no-op without a live run.
    pub fn cancel(&mut self) {
        if let Some(run) = self.run.as_mut() {
            if !run.cancelled {
                tracing::debug!(in_flight = run.in_flight, "run cancelled");
            }
            run.cancelled = true;
        }
    }

    /// Begin a run over the configured entries, calling `dispatch` for each of
    /// the first `min(cap, count)` of them before returning.
    ///
    /// Returns false without side effects if the queue is empty or a run is
    /// already live. A `cap` of 0 is treated as 1.
    pub fn start<D>(&mut self, cap: usize, mut dispatch: D) -> bool
    where
        D: FnMut(usize),
    {
        if self.queue.is_empty() {
            return false;
        }
        if self.run.is_some() {
            tracing::warn!("start ignored: a run is already active");
            return false;
        }

        self.queue.rewind();
        let cap = cap.max(1).min(self.queue.count());
        self.run = Some(RunState {
            cap,
            in_flight: 0,
            completed: 0,
            cancelled: false,
        });
        self.controls.set_enabled(false);
        tracing::debug!(cap, count = self.queue.count(), "run started");

        for _ in 0..cap {
            let Ok(index) = self.queue.next() else {
                break;
            };
            if let Some(run) = self.run.as_mut() {
                run.in_flight += 1;
            }
            dispatch(index);
        }
        true
    }

    /// Record the completion of the task for `index`.
    ///
    /// Must be called exactly once per dispatched entry. `on_event` always
    /// fires once; `on_next` fires at most once, with the entry that takes the
    /// finished task's slot.
    pub fn on_item_finished<N, E>(&mut self, index: usize, success: bool, on_next: N, on_event: E)
    where
        N: FnOnce(usize),
        E: FnOnce(FinishedEvent),
    {
        let Some(run) = self.run.as_mut() else {
            debug_assert!(false, "completion for {index} with no active run");
            tracing::warn!(index, "completion ignored: no active run");
            return;
        };
        debug_assert!(run.in_flight > 0, "more completions than dispatches");
        run.in_flight = run.in_flight.saturating_sub(1);

        if run.cancelled {
            let drained = run.in_flight == 0;
            tracing::debug!(index, in_flight = run.in_flight, "straggler flushed as cancelled");
            if drained {
                self.run = None;
            }
            self.controls.set_enabled(true);
            on_event(FinishedEvent {
                index,
                cancelled: true,
                all_finished: false,
                success: false,
            });
            return;
        }

        run.completed += 1;
        if run.completed == self.queue.count() {
            tracing::debug!(index, completed = run.completed, "run finished");
            self.run = None;
            self.controls.set_enabled(true);
            on_event(FinishedEvent {
                index,
                cancelled: false,
                all_finished: true,
                success,
            });
            return;
        }

        on_event(FinishedEvent {
            index,
            cancelled: false,
            all_finished: false,
            success,
        });
        if let Ok(next) = self.queue.next() {
            run.in_flight += 1;
            on_next(next);
        }
    }
}
