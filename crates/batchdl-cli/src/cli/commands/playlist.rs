//! `batchdl playlist` – download playlist items, whole or by range.

use anyhow::{bail, Result};
use batchdl_core::config::BatchConfig;
use batchdl_core::workflow::PlaylistList;
use std::path::PathBuf;

use super::report::print_summary;
use super::session::{build_workflow, cancel_on_ctrl_c, collect_urls, concurrency};

#[derive(Debug)]
pub struct PlaylistArgs {
    pub urls: Vec<String>,
    pub file: Option<PathBuf>,
    pub range: String,
    pub options: String,
    pub jobs: Option<usize>,
    pub json: bool,
}

/// Returns whether every selected item ended with success.
pub async fn run_playlist(cfg: &BatchConfig, args: PlaylistArgs) -> Result<bool> {
    let urls = collect_urls(args.urls, args.file.as_deref())?;
    if urls.is_empty() {
        bail!("playlist has no items (pass URLs as arguments or with --file)");
    }

    let mut playlist = PlaylistList::new(build_workflow(cfg))?;
    for url in &urls {
        playlist.add(url);
    }

    let summary = playlist
        .run(
            &args.range,
            concurrency(cfg, args.jobs),
            &args.options,
            cancel_on_ctrl_c(),
        )
        .await?;

    print_summary(&summary, args.json)?;
    let selected_clean = !summary.cancelled && playlist.entries(&args.range)?.is_empty();
    Ok(selected_clean)
}
