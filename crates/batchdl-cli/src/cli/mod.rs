//! CLI for the batchdl download orchestrator.

mod commands;

use anyhow::Result;
use batchdl_core::config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_batch, run_config, run_playlist, BatchArgs, PlaylistArgs};

/// Top-level CLI for the batchdl download orchestrator.
#[derive(Debug, Parser)]
#[command(name = "batchdl")]
#[command(about = "batchdl: run a downloader engine over many URLs, a few at a time", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a list of URLs, retrying failed ones for up to N passes.
    Batch {
        /// URLs to download. A title may follow the URL on a second line.
        urls: Vec<String>,
        /// Read more URLs from a file, one per line (`#` starts a comment).
        #[arg(long, short = 'f', value_name = "PATH")]
        file: Option<PathBuf>,
        /// Engine options for this run; empty uses `engine.default_options`.
        #[arg(long, short = 'o', default_value = "", allow_hyphen_values = true)]
        options: String,
        /// Run up to N engine processes at once (default: from config).
        #[arg(long, short = 'j', value_name = "N")]
        jobs: Option<usize>,
        /// Run at most N passes; each pass after the first retries what failed.
        #[arg(long, default_value = "1", value_name = "N")]
        passes: usize,
        /// Print the final summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Download the items of a playlist, optionally only a range of them.
    Playlist {
        /// Playlist item URLs, in playlist order.
        urls: Vec<String>,
        /// Read more item URLs from a file, one per line.
        #[arg(long, short = 'f', value_name = "PATH")]
        file: Option<PathBuf>,
        /// 1-based items to download, e.g. `1-3,5` (default: all).
        #[arg(long, short = 'r', default_value = "", value_name = "SPEC")]
        range: String,
        /// Engine options for this run; empty uses `engine.default_options`.
        #[arg(long, short = 'o', default_value = "", allow_hyphen_values = true)]
        options: String,
        /// Run up to N engine processes at once (default: from config).
        #[arg(long, short = 'j', value_name = "N")]
        jobs: Option<usize>,
        /// Print the final summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the config file path and the effective settings.
    Config,
}

impl CliCommand {
    /// Parse arguments and run; `Ok(false)` means a run ended cancelled or with failures.
    pub async fn run_from_args() -> Result<bool> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let clean = match cli.command {
            CliCommand::Batch {
                urls,
                file,
                options,
                jobs,
                passes,
                json,
            } => {
                let args = BatchArgs {
                    urls,
                    file,
                    options,
                    jobs,
                    passes,
                    json,
                };
                run_batch(&cfg, args).await?
            }
            CliCommand::Playlist {
                urls,
                file,
                range,
                options,
                jobs,
                json,
            } => {
                let args = PlaylistArgs {
                    urls,
                    file,
                    range,
                    options,
                    jobs,
                    json,
                };
                run_playlist(&cfg, args).await?
            }
            CliCommand::Config => {
                run_config(&cfg)?;
                true
            }
        };

        Ok(clean)
    }
}

#[cfg(test)]
mod tests;
