//! `batchdl batch` – download a list of URLs, retrying failures across passes.

use anyhow::{bail, Result};
use batchdl_core::config::BatchConfig;
use batchdl_core::workflow::BatchList;
use std::path::PathBuf;

use super::report::print_summary;
use super::session::{build_workflow, cancel_on_ctrl_c, collect_urls, concurrency};

#[derive(Debug)]
pub struct BatchArgs {
    pub urls: Vec<String>,
    pub file: Option<PathBuf>,
    pub options: String,
    pub jobs: Option<usize>,
    pub passes: usize,
    pub json: bool,
}

/// Returns whether every item ended with success.
pub async fn run_batch(cfg: &BatchConfig, args: BatchArgs) -> Result<bool> {
    let urls = collect_urls(args.urls, args.file.as_deref())?;
    if urls.is_empty() {
        bail!("no URLs given (pass them as arguments or with --file)");
    }

    let mut batch = BatchList::new(build_workflow(cfg));
    for url in &urls {
        batch.add(url);
    }
    let cap = concurrency(cfg, args.jobs);
    let cancel = cancel_on_ctrl_c();

    let mut summary = batch.workflow().summary();
    for pass in 1..=args.passes.max(1) {
        let remaining = batch.entries().len();
        if remaining == 0 {
            break;
        }
        if pass > 1 {
            tracing::info!(pass, remaining, "retrying unsuccessful items");
            eprintln!("pass {}: retrying {} item(s)", pass, remaining);
        }
        summary = batch.run(cap, &args.options, cancel.clone()).await?;
        if summary.cancelled {
            break;
        }
    }

    print_summary(&summary, args.json)?;
    Ok(summary.is_clean())
}
