//! Test doubles: an engine whose "URL" is a shell script, and an in-memory logger.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use batchdl_core::config::OutputChannel;
use batchdl_core::coordinator::ControlToggle;
use batchdl_core::engine::Engine;
use batchdl_core::logger::{CorrelationId, Logger};
use batchdl_core::workflow::Workflow;

/// Runs each item's target URL as `sh -c <url>`.
pub struct ShellEngine {
    pub channel: OutputChannel,
}

impl Engine for ShellEngine {
    fn name(&self) -> &str {
        "sh"
    }

    fn executable_path(&self) -> &Path {
        Path::new("sh")
    }

    fn build_arguments(&self, url: &str, _user_options: &str) -> Vec<String> {
        vec!["-c".to_string(), url.to_string()]
    }

    fn output_channel(&self) -> OutputChannel {
        self.channel
    }

    fn supports_playlists(&self) -> bool {
        true
    }
}

#[derive(Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(CorrelationId, String)>>,
}

impl MemoryLogger {
    pub fn lines(&self) -> Vec<(CorrelationId, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Lines logged under the id whose first line is the `cmd:` line containing `needle`.
    pub fn lines_for(&self, needle: &str) -> Vec<String> {
        let lines = self.lines();
        let Some(id) = lines
            .iter()
            .find(|(_, l)| l.starts_with("cmd:") && l.contains(needle))
            .map(|(id, _)| *id)
        else {
            return Vec::new();
        };
        lines
            .into_iter()
            .filter(|(i, _)| *i == id)
            .map(|(_, l)| l)
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn append(&self, id: CorrelationId, line: &str) {
        self.lines.lock().unwrap().push((id, line.to_string()));
    }
}

/// Records every control toggle.
#[derive(Default)]
pub struct Toggles(pub Vec<bool>);

impl ControlToggle for Toggles {
    fn set_enabled(&mut self, enabled: bool) {
        self.0.push(enabled);
    }
}

pub fn shell_workflow(scripts: &[String], logger: Arc<MemoryLogger>) -> Workflow<Toggles> {
    let engine = ShellEngine {
        channel: OutputChannel::Stdout,
    };
    let mut wf = Workflow::new(Arc::new(engine), logger, Toggles::default());
    for script in scripts {
        wf.push(script);
    }
    wf
}
