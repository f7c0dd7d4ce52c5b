//! Typed errors for queue, state codec and workflow preconditions.
//!
//! Task failures are never errors: a non-zero engine exit is folded into the
//! item's `FinishedState`. These variants cover caller mistakes only.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    /// `EntryQueue::next` called after every entry was issued.
    #[error("entry queue exhausted")]
    QueueExhausted,
    /// A run was requested with nothing to download.
    #[error("no entries to download")]
    EmptyQueue,
    /// A second run was requested while one is still live on the same workflow.
    #[error("a run is already active")]
    RunActive,
    /// A finished-state tag that is not part of the codec.
    #[error("unknown finished state tag: {0:?}")]
    UnknownState(String),
    /// A selected entry points past the end of the item list.
    #[error("entry {index} out of range (list has {len} items)")]
    EntryOutOfRange { index: usize, len: usize },
    /// A playlist range spec that selects nothing parseable.
    #[error("invalid range: {0:?}")]
    InvalidRange(String),
    /// The configured engine cannot download playlists.
    #[error("engine {0} does not support playlists")]
    PlaylistsUnsupported(String),
}
