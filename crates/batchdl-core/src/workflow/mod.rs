//! Orchestration clients: own the item list and drive a `Coordinator` run.
//!
//! `Workflow::run` is the single owner of the coordinator for the duration of
//! a run. Task runners report back over an mpsc channel and the loop feeds
//! each report to `Coordinator::on_item_finished`, so all coordinator state is
//! touched from one task only.

mod batch;
mod playlist;

pub use batch::{parse_url_list, BatchList};
pub use playlist::{parse_range, PlaylistList};

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::coordinator::{ControlToggle, Coordinator};
use crate::engine::Engine;
use crate::error::OrchestratorError;
use crate::finished::{FinishedEvent, FinishedState};
use crate::hooks::Hooks;
use crate::logger::Logger;
use crate::runner::{self, TaskFinished, TaskRunner};

const FINISHED_CHANNEL_CAPACITY: usize = 64;

/// One row of the download list. `url` may carry display lines after the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: String,
    pub state: FinishedState,
}

impl WorkItem {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: FinishedState::NotStarted,
        }
    }

    pub fn target_url(&self) -> &str {
        runner::target_url(&self.url)
    }

    /// Second line of the url, if any (e.g. a fetched title).
    pub fn title(&self) -> Option<&str> {
        self.url.lines().nth(1).map(str::trim).filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ItemRow {
    pub index: usize,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub state: FinishedState,
}

/// What a run reported, plus the state of every item afterwards.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunSummary {
    /// Every admitted entry completed (the counted all-finished event fired).
    pub all_finished: bool,
    /// `success` flag of the all-finished event (the last item to complete).
    pub success: bool,
    pub cancelled: bool,
    pub items: Vec<ItemRow>,
}

impl RunSummary {
    pub fn count(&self, state: FinishedState) -> usize {
        self.items.iter().filter(|i| i.state == state).count()
    }

    /// Nothing failed and nothing was cancelled.
    pub fn is_clean(&self) -> bool {
        !self.cancelled
            && self
                .items
                .iter()
                .all(|i| i.state == FinishedState::FinishedWithSuccess)
    }
}

pub struct Workflow<T> {
    items: Vec<WorkItem>,
    coord: Coordinator<T>,
    engine: Arc<dyn Engine>,
    logger: Arc<dyn Logger>,
    hooks: Hooks,
    working_dir: Option<PathBuf>,
}

impl<T: ControlToggle> Workflow<T> {
    pub fn new(engine: Arc<dyn Engine>, logger: Arc<dyn Logger>, controls: T) -> Self {
        Self {
            items: Vec::new(),
            coord: Coordinator::new(controls),
            engine,
            logger,
            hooks: Hooks::default(),
            working_dir: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn controls(&self) -> &T {
        self.coord.controls()
    }

    pub fn is_running(&self) -> bool {
        self.coord.is_active()
    }

    /// Append an item in `NotStarted`. Blank input is ignored; returns the new index.
    pub fn push(&mut self, url: &str) -> Option<usize> {
        if url.trim().is_empty() {
            return None;
        }
        self.items.push(WorkItem::new(url));
        Some(self.items.len() - 1)
    }

    pub fn remove(&mut self, index: usize) -> Result<WorkItem, OrchestratorError> {
        if self.is_running() {
            return Err(OrchestratorError::RunActive);
        }
        if index >= self.items.len() {
            return Err(OrchestratorError::EntryOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Indices of every item a new run should admit: all not yet successful.
    pub fn retry_entries(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.state.should_retry())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            all_finished: false,
            success: false,
            cancelled: false,
            items: self.rows(),
        }
    }

    fn rows(&self) -> Vec<ItemRow> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| ItemRow {
                index,
                url: item.target_url().to_string(),
                title: item.title().map(str::to_string),
                state: item.state,
            })
            .collect()
    }

    /// Download `entries` with at most `cap` engine processes at once.
    ///
    /// Cancelling `cancel` stops new dispatches and kills the in-flight
    /// processes; the run ends once each of them has reported back. The
    /// future must be driven to completion: dropping it mid-run leaves the
    /// workflow marked as running and later runs are rejected.
    pub async fn run(
        &mut self,
        entries: Vec<usize>,
        cap: usize,
        user_options: &str,
        cancel: CancellationToken,
    ) -> Result<RunSummary, OrchestratorError> {
        if self.is_running() {
            return Err(OrchestratorError::RunActive);
        }
        if let Some(&index) = entries.iter().find(|&&i| i >= self.items.len()) {
            return Err(OrchestratorError::EntryOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.coord.set_entries(entries)?;

        let (tx, mut rx) = mpsc::channel::<TaskFinished>(FINISHED_CHANNEL_CAPACITY);
        let runner = TaskRunner::new(
            Arc::clone(&self.engine),
            Arc::clone(&self.logger),
            self.working_dir.clone(),
            tx,
        );
        let run_token = cancel.child_token();

        let mut initial = Vec::new();
        if !self.coord.start(cap, |index| initial.push(index)) {
            return Err(OrchestratorError::EmptyQueue);
        }
        tracing::info!(
            engine = self.engine.name(),
            entries = self.coord.queue().count(),
            in_flight = initial.len(),
            "run started"
        );
        for index in initial {
            self.dispatch(&runner, index, user_options, &run_token);
        }

        let mut summary = RunSummary {
            all_finished: false,
            success: false,
            cancelled: false,
            items: Vec::new(),
        };
        let mut hook_tasks = Vec::new();
        let mut cancel_seen = false;

        while self.coord.is_active() {
            tokio::select! {
                biased;
                _ = cancel.cancelled(), if !cancel_seen => {
                    cancel_seen = true;
                    tracing::info!("cancel requested");
                    self.coord.cancel();
                    run_token.cancel();
                }
                msg = rx.recv() => {
                    let Some(done) = msg else {
                        break;
                    };
                    let mut next = None;
                    let mut event = None;
                    self.coord.on_item_finished(
                        done.index,
                        done.success,
                        |n| next = Some(n),
                        |e| event = Some(e),
                    );
                    if let Some(event) = event {
                        self.apply_event(event, &mut summary, &mut hook_tasks);
                    }
                    if let Some(n) = next {
                        self.dispatch(&runner, n, user_options, &run_token);
                    }
                }
            }
        }

        await_hooks(hook_tasks).await;
        summary.items = self.rows();
        tracing::info!(
            all_finished = summary.all_finished,
            cancelled = summary.cancelled,
            "run over"
        );
        Ok(summary)
    }

    fn dispatch(
        &mut self,
        runner: &TaskRunner,
        index: usize,
        user_options: &str,
        run_token: &CancellationToken,
    ) {
        let item = &mut self.items[index];
        item.state = FinishedState::Running;
        let id = runner.spawn(index, &item.url, user_options, run_token.clone());
        tracing::debug!(index, id, url = item.target_url(), "dispatched");
    }

    fn apply_event(
        &mut self,
        event: FinishedEvent,
        summary: &mut RunSummary,
        hook_tasks: &mut Vec<JoinHandle<bool>>,
    ) {
        let state = event.state();
        let item = &mut self.items[event.index];
        item.state = state;
        tracing::debug!(index = event.index, state = %state, "item finished");

        if state == FinishedState::FinishedWithSuccess {
            hook_tasks.extend(self.hooks.item_succeeded(item.target_url()));
        }
        if event.cancelled {
            summary.cancelled = true;
        }
        if event.all_finished {
            summary.all_finished = true;
            summary.success = event.success;
            hook_tasks.extend(self.hooks.all_finished());
        }
    }
}

async fn await_hooks(tasks: Vec<JoinHandle<bool>>) {
    for task in tasks {
        if let Err(e) = task.await {
            tracing::warn!("hook task join: {}", e);
        }
    }
}
