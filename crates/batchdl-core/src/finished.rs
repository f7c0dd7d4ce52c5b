//! Per-item finished state and its display tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OrchestratorError;

/// Status of one work item, stored and displayed by its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum FinishedState {
    #[default]
    NotStarted,
    Running,
    FinishedCancelled,
    FinishedWithError,
    FinishedWithSuccess,
}

impl FinishedState {
    pub fn as_str(self) -> &'static str {
        match self {
            FinishedState::NotStarted => "Not Started",
            FinishedState::Running => "Running",
            FinishedState::FinishedCancelled => "FinishedCancelled",
            FinishedState::FinishedWithError => "FinishedWithError",
            FinishedState::FinishedWithSuccess => "FinishedWithSuccess",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FinishedState::FinishedCancelled
                | FinishedState::FinishedWithError
                | FinishedState::FinishedWithSuccess
        )
    }

    /// Whether a new run should admit an item currently in this state.
    pub fn should_retry(self) -> bool {
        self != FinishedState::FinishedWithSuccess
    }
}

impl fmt::Display for FinishedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinishedState {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Not Started" => Ok(FinishedState::NotStarted),
            "Running" => Ok(FinishedState::Running),
            "FinishedCancelled" => Ok(FinishedState::FinishedCancelled),
            "FinishedWithError" => Ok(FinishedState::FinishedWithError),
            "FinishedWithSuccess" => Ok(FinishedState::FinishedWithSuccess),
            other => Err(OrchestratorError::UnknownState(other.to_string())),
        }
    }
}

impl TryFrom<String> for FinishedState {
    type Error = OrchestratorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FinishedState> for &'static str {
    fn from(state: FinishedState) -> Self {
        state.as_str()
    }
}

/// True only for the `FinishedWithSuccess` tag. Unknown tags count as not successful.
pub fn is_finished_with_success(tag: &str) -> bool {
    tag == FinishedState::FinishedWithSuccess.as_str()
}

/// Outcome reported by the coordinator for one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedEvent {
    pub index: usize,
    pub cancelled: bool,
    pub all_finished: bool,
    pub success: bool,
}

impl FinishedEvent {
    /// Terminal state this event assigns to its item. Cancellation wins over success.
    pub fn state(&self) -> FinishedState {
        if self.cancelled {
            FinishedState::FinishedCancelled
        } else if self.success {
            FinishedState::FinishedWithSuccess
        } else {
            FinishedState::FinishedWithError
        }
    }
}
