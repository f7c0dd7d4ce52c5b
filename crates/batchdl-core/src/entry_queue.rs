//! Ordered, skip-aware cursor over the item indices admitted to one run.
//!
//! The queue only stores indices into the caller's item list. Which items are
//! admitted (e.g. everything not yet successful) is decided by the caller
//! before `reset`; the queue is then drained strictly in insertion order.

use crate::error::OrchestratorError;

#[derive(Debug, Clone, Default)]
pub struct EntryQueue {
    entries: Vec<usize>,
    cursor: usize,
}

impl EntryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with `items` and rewind the cursor. Call before each run.
    pub fn reset(&mut self, items: impl IntoIterator<Item = usize>) {
        self.entries = items.into_iter().collect();
        self.cursor = 0;
    }

    /// Rewind the cursor over the current entries without changing them.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Total entries admitted to this run (issued or not).
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Issue the next entry and advance the cursor.
    pub fn next(&mut self) -> Result<usize, OrchestratorError> {
        let index = *self
            .entries
            .get(self.cursor)
            .ok_or(OrchestratorError::QueueExhausted)?;
        self.cursor += 1;
        Ok(index)
    }

    /// Number of entries already issued.
    pub fn issued(&self) -> usize {
        self.cursor
    }

    pub fn entries(&self) -> &[usize] {
        &self.entries
    }
}
