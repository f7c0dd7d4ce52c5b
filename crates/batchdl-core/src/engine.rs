//! Download engine seam: how to invoke the external downloader for one URL.
//!
//! The orchestrator treats the engine process as opaque. It only asks the
//! engine for an executable and argv, a printable command line, and which
//! output lines are worth logging.

use std::path::{Path, PathBuf};

use crate::config::{EngineConfig, OutputChannel};

pub trait Engine: Send + Sync {
    fn name(&self) -> &str;

    fn executable_path(&self) -> &Path;

    /// Full argv (without the executable) for downloading `url` with `user_options`.
    fn build_arguments(&self, url: &str, user_options: &str) -> Vec<String>;

    /// Human-readable command line for logs.
    fn command_display_string(&self, argv: &[String]) -> String {
        let mut out = self.executable_path().display().to_string();
        for arg in argv {
            out.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                out.push('"');
                out.push_str(arg);
                out.push('"');
            } else {
                out.push_str(arg);
            }
        }
        out
    }

    /// Map one output line to what the logger should see; `None` drops it.
    fn filter_output(&self, line: &str) -> Option<String> {
        Some(line.to_string())
    }

    /// Child stream(s) routed to the logger.
    fn output_channel(&self) -> OutputChannel {
        OutputChannel::Stdout
    }

    fn supports_playlists(&self) -> bool;
}

/// Engine driven entirely by the `[engine]` config section.
#[derive(Debug, Clone)]
pub struct ConfiguredEngine {
    name: String,
    executable: PathBuf,
    base_args: Vec<String>,
    default_options: String,
    output_channel: OutputChannel,
    output_filter: String,
    supports_playlists: bool,
}

impl ConfiguredEngine {
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            executable: cfg.executable.clone(),
            base_args: cfg.base_args.clone(),
            default_options: cfg.default_options.clone(),
            output_channel: cfg.output_channel,
            output_filter: cfg.output_filter.clone(),
            supports_playlists: cfg.supports_playlists,
        }
    }
}

impl Engine for ConfiguredEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn executable_path(&self) -> &Path {
        &self.executable
    }

    fn build_arguments(&self, url: &str, user_options: &str) -> Vec<String> {
        let options = if user_options.trim().is_empty() {
            self.default_options.as_str()
        } else {
            user_options
        };
        self.base_args
            .iter()
            .cloned()
            .chain(options.split_whitespace().map(str::to_string))
            .chain(std::iter::once(url.to_string()))
            .collect()
    }

    fn filter_output(&self, line: &str) -> Option<String> {
        let line = line.trim_end();
        if line.is_empty() {
            return None;
        }
        if self.output_filter.is_empty() || line.contains(&self.output_filter) {
            Some(line.to_string())
        } else {
            None
        }
    }

    fn output_channel(&self) -> OutputChannel {
        self.output_channel
    }

    fn supports_playlists(&self) -> bool {
        self.supports_playlists
    }
}
