//! Shared setup for commands that drive a workflow run.

use anyhow::{Context, Result};
use batchdl_core::config::BatchConfig;
use batchdl_core::coordinator::ControlToggle;
use batchdl_core::engine::ConfiguredEngine;
use batchdl_core::hooks::Hooks;
use batchdl_core::logger::TracingLogger;
use batchdl_core::workflow::{parse_url_list, Workflow};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// URLs from the command line followed by those in `file`, if given.
pub fn collect_urls(mut urls: Vec<String>, file: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read URL list: {}", path.display()))?;
        urls.extend(parse_url_list(&text));
    }
    urls.retain(|u| !u.trim().is_empty());
    Ok(urls)
}

/// `--jobs` wins over the configured concurrency.
pub fn concurrency(cfg: &BatchConfig, jobs: Option<usize>) -> usize {
    jobs.unwrap_or_else(|| cfg.effective_concurrency())
}

/// A workflow over the configured engine. There are no buttons to grey out
/// in a terminal, so control toggles are only logged.
pub fn build_workflow(cfg: &BatchConfig) -> Workflow<impl ControlToggle> {
    let engine = ConfiguredEngine::from_config(&cfg.engine);
    let logger = TracingLogger::new(cfg.engine.name.clone());
    Workflow::new(Arc::new(engine), Arc::new(logger), |enabled: bool| {
        tracing::debug!(enabled, "list controls toggled");
    })
    .with_hooks(Hooks::from_config(cfg))
    .with_working_dir(cfg.download_folder.clone())
}

/// Token cancelled on the first Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                eprintln!("cancelling: stopping running downloads...");
                trigger.cancel();
            }
            Err(e) => tracing::warn!("ctrl-c handler: {}", e),
        }
    });
    token
}
