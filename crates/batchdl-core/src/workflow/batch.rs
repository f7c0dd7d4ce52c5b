//! Batch list: an ad-hoc list of URLs, re-runnable over what did not succeed.

use tokio_util::sync::CancellationToken;

use super::{RunSummary, Workflow};
use crate::coordinator::ControlToggle;
use crate::error::OrchestratorError;

/// Parse a URL list file: one URL per line, blank lines and `#` comments skipped.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect()
}

pub struct BatchList<T> {
    workflow: Workflow<T>,
}

impl<T: ControlToggle> BatchList<T> {
    pub fn new(workflow: Workflow<T>) -> Self {
        Self { workflow }
    }

    pub fn workflow(&self) -> &Workflow<T> {
        &self.workflow
    }

    pub fn add(&mut self, url: &str) -> Option<usize> {
        self.workflow.push(url)
    }

    pub fn remove(&mut self, row: usize) -> Result<(), OrchestratorError> {
        self.workflow.remove(row).map(|_| ())
    }

    /// Entries for the next run: every item not already successful.
    pub fn entries(&self) -> Vec<usize> {
        self.workflow.retry_entries()
    }

    pub async fn run(
        &mut self,
        cap: usize,
        user_options: &str,
        cancel: CancellationToken,
    ) -> Result<RunSummary, OrchestratorError> {
        let entries = self.entries();
        self.workflow.run(entries, cap, user_options, cancel).await
    }
}
