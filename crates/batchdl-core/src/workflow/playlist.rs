//! Playlist list: items of one playlist, downloaded whole or by item range.

use std::collections::HashSet;

use tokio_util::sync::CancellationToken;

use super::{RunSummary, Workflow};
use crate::coordinator::ControlToggle;
use crate::error::OrchestratorError;

/// Parse a 1-based range spec such as `"1-3,5"` into 0-based positions of a
/// list with `len` items.
///
/// Parts that are not `N` or `A-B` with positive integers are skipped, and
/// repeats keep their first position so no item is selected twice. A part
/// reaching past `len` fails with `EntryOutOfRange` before any position of it
/// is built. An empty spec selects nothing here; callers treat it as
/// "everything". A non-empty spec that yields no positions at all is rejected.
pub fn parse_range(spec: &str, len: usize) -> Result<Vec<usize>, OrchestratorError> {
    let mut out: Vec<usize> = Vec::new();
    let mut seen: HashSet<usize> = HashSet::new();
    let out_of_range = |n: usize| OrchestratorError::EntryOutOfRange { index: n - 1, len };

    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (first, last) = match part.split_once('-') {
            Some((a, b)) => {
                let (Ok(a), Ok(b)) = (a.trim().parse::<usize>(), b.trim().parse::<usize>()) else {
                    continue;
                };
                (a.max(1), b)
            }
            None => match part.parse::<usize>() {
                Ok(n) if n > 0 => (n, n),
                _ => continue,
            },
        };
        if first > last {
            continue;
        }
        if last > len {
            return Err(out_of_range(last));
        }
        for n in first..=last {
            if seen.insert(n - 1) {
                out.push(n - 1);
            }
        }
    }

    if out.is_empty() && !spec.trim().is_empty() {
        return Err(OrchestratorError::InvalidRange(spec.to_string()));
    }
    Ok(out)
}

pub struct PlaylistList<T> {
    workflow: Workflow<T>,
}

impl<T: ControlToggle> PlaylistList<T> {
    /// Rejects engines that cannot download playlists.
    pub fn new(workflow: Workflow<T>) -> Result<Self, OrchestratorError> {
        if !workflow.engine().supports_playlists() {
            return Err(OrchestratorError::PlaylistsUnsupported(
                workflow.engine().name().to_string(),
            ));
        }
        Ok(Self { workflow })
    }

    pub fn workflow(&self) -> &Workflow<T> {
        &self.workflow
    }

    pub fn add(&mut self, url: &str) -> Option<usize> {
        self.workflow.push(url)
    }

    /// Entries selected by `range` (all items when empty), minus already-successful ones.
    ///
    /// Any selected position past the end of the list rejects the whole selection.
    pub fn entries(&self, range: &str) -> Result<Vec<usize>, OrchestratorError> {
        let items = self.workflow.items();
        let selected = if range.trim().is_empty() {
            (0..items.len()).collect()
        } else {
            parse_range(range, items.len())?
        };
        Ok(selected
            .into_iter()
            .filter(|&i| items[i].state.should_retry())
            .collect())
    }

    pub async fn run(
        &mut self,
        range: &str,
        cap: usize,
        user_options: &str,
        cancel: CancellationToken,
    ) -> Result<RunSummary, OrchestratorError> {
        let entries = self.entries(range)?;
        self.workflow.run(entries, cap, user_options, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::ConfiguredEngine;
    use crate::finished::FinishedState;
    use crate::logger::Logger;
    use std::sync::Arc;

    struct NullLogger;

    impl Logger for NullLogger {
        fn append(&self, _id: u64, _line: &str) {}
    }

    fn playlist(supports: bool, n: usize) -> Result<PlaylistList<impl ControlToggle>, OrchestratorError> {
        let engine = ConfiguredEngine::from_config(&EngineConfig {
            supports_playlists: supports,
            ..EngineConfig::default()
        });
        let mut wf = Workflow::new(Arc::new(engine), Arc::new(NullLogger), |_: bool| {});
        for i in 0..n {
            wf.push(&format!("https://list/{i}"));
        }
        PlaylistList::new(wf)
    }

    #[test]
    fn parses_single_items_and_ranges() {
        assert_eq!(parse_range("1-3,5", 8).unwrap(), vec![0, 1, 2, 4]);
        assert_eq!(parse_range(" 7 ", 8).unwrap(), vec![6]);
        assert_eq!(parse_range("", 8).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn malformed_parts_are_skipped() {
        assert_eq!(parse_range("x,2,3-,0,4-a,1-2", 8).unwrap(), vec![1, 0]);
        assert_eq!(
            parse_range("3-1", 8).unwrap_err(),
            OrchestratorError::InvalidRange("3-1".into())
        );
        assert!(parse_range("abc", 8).is_err());
    }

    #[test]
    fn repeated_positions_are_selected_once() {
        assert_eq!(parse_range("1-3,2,3-4", 8).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn huge_upper_bound_is_rejected_without_expanding() {
        let started = std::time::Instant::now();
        assert_eq!(
            parse_range("1-4000000000", 3).unwrap_err(),
            OrchestratorError::EntryOutOfRange {
                index: 3_999_999_999,
                len: 3
            }
        );
        assert_eq!(
            parse_range("1-100000", 3).unwrap_err(),
            OrchestratorError::EntryOutOfRange { index: 99_999, len: 3 }
        );
        assert_eq!(
            parse_range("9", 3).unwrap_err(),
            OrchestratorError::EntryOutOfRange { index: 8, len: 3 }
        );
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn full_length_range_is_linear() {
        let started = std::time::Instant::now();
        let all = parse_range("1-200000,1-200000", 200_000).unwrap();
        assert_eq!(all.len(), 200_000);
        assert_eq!(all[199_999], 199_999);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn unsupported_engine_is_rejected() {
        let err = playlist(false, 1).err().unwrap();
        assert_eq!(err, OrchestratorError::PlaylistsUnsupported("yt-dlp".into()));
    }

    #[test]
    fn entries_by_range_skip_successful_items() {
        let mut pl = playlist(true, 5).unwrap();
        pl.workflow.items[1].state = FinishedState::FinishedWithSuccess;
        assert_eq!(pl.entries("").unwrap(), vec![0, 2, 3, 4]);
        assert_eq!(pl.entries("1-3").unwrap(), vec![0, 2]);
    }

    #[test]
    fn out_of_range_selection_bails() {
        let pl = playlist(true, 3).unwrap();
        assert_eq!(
            pl.entries("2-4").unwrap_err(),
            OrchestratorError::EntryOutOfRange { index: 3, len: 3 }
        );
        assert_eq!(
            pl.entries("1-2,1-100000").unwrap_err(),
            OrchestratorError::EntryOutOfRange { index: 99_999, len: 3 }
        );
    }
}
