//! One engine process per work item.
//!
//! `TaskRunner::spawn` launches the engine for one item on a tokio task,
//! forwards the configured output stream to the `Logger` under the item's
//! correlation id, kills the child when the item's cancellation token fires,
//! and sends exactly one `TaskFinished` when the child is gone.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::Engine;
use crate::logger::{next_correlation_id, CorrelationId, Logger};

/// How long to wait for output pipes to hit EOF after the child exited.
/// A grandchild that inherited the pipe can keep it open past the child's exit.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Completion report for one launched task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFinished {
    pub index: usize,
    pub id: CorrelationId,
    pub success: bool,
}

/// The download target: first line of a possibly multi-line item URL.
pub fn target_url(url: &str) -> &str {
    url.lines().next().unwrap_or("").trim()
}

/// Success means a normal exit with code 0. Death by signal has no code.
pub fn classify_exit(status: &ExitStatus) -> bool {
    status.code() == Some(0)
}

#[derive(Clone)]
pub struct TaskRunner {
    engine: Arc<dyn Engine>,
    logger: Arc<dyn Logger>,
    working_dir: Option<PathBuf>,
    finished_tx: mpsc::Sender<TaskFinished>,
}

impl TaskRunner {
    pub fn new(
        engine: Arc<dyn Engine>,
        logger: Arc<dyn Logger>,
        working_dir: Option<PathBuf>,
        finished_tx: mpsc::Sender<TaskFinished>,
    ) -> Self {
        Self {
            engine,
            logger,
            working_dir,
            finished_tx,
        }
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// Launch the engine for item `index` and return the task's correlation id.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        &self,
        index: usize,
        url: &str,
        user_options: &str,
        cancel: CancellationToken,
    ) -> CorrelationId {
        let id = next_correlation_id();
        let argv = self.engine.build_arguments(target_url(url), user_options);
        self.logger
            .append(id, &format!("cmd: {}", self.engine.command_display_string(&argv)));

        let engine = Arc::clone(&self.engine);
        let logger = Arc::clone(&self.logger);
        let working_dir = self.working_dir.clone();
        let tx = self.finished_tx.clone();
        tokio::spawn(async move {
            let success = run_process(engine, logger, id, argv, working_dir, cancel).await;
            tracing::info!(index, id, success, "task finished");
            if tx.send(TaskFinished { index, id, success }).await.is_err() {
                tracing::debug!(index, id, "completion dropped: workflow is gone");
            }
        });
        id
    }
}

async fn run_process(
    engine: Arc<dyn Engine>,
    logger: Arc<dyn Logger>,
    id: CorrelationId,
    argv: Vec<String>,
    working_dir: Option<PathBuf>,
    cancel: CancellationToken,
) -> bool {
    if cancel.is_cancelled() {
        logger.append(id, "cancelled before start");
        return false;
    }

    let channel = engine.output_channel();
    let pipe_or_null = |wanted: bool| if wanted { Stdio::piped() } else { Stdio::null() };

    let mut command = Command::new(engine.executable_path());
    command
        .args(&argv)
        .stdin(Stdio::null())
        .stdout(pipe_or_null(channel.includes_stdout()))
        .stderr(pipe_or_null(channel.includes_stderr()))
        .kill_on_drop(true);
    if let Some(dir) = &working_dir {
        command.current_dir(dir);
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(id, engine = engine.name(), "spawn failed: {}", e);
            logger.append(id, &format!("failed to start {}: {}", engine.name(), e));
            return false;
        }
    };

    let mut forwarders = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        forwarders.push(forward_lines(stdout, Arc::clone(&engine), Arc::clone(&logger), id));
    }
    if let Some(stderr) = child.stderr.take() {
        forwarders.push(forward_lines(stderr, Arc::clone(&engine), Arc::clone(&logger), id));
    }

    let (status, cancelled) = tokio::select! {
        status = child.wait() => (status, false),
        _ = cancel.cancelled() => {
            if let Err(e) = child.start_kill() {
                tracing::debug!(id, "kill after cancel: {}", e);
            }
            (child.wait().await, true)
        }
    };

    if cancelled {
        for f in &forwarders {
            f.abort();
        }
        logger.append(id, "cancelled");
        return false;
    }
    for mut f in forwarders {
        if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, &mut f).await.is_err() {
            tracing::debug!(id, "output still open after exit; dropping the rest");
            f.abort();
        }
    }

    match status {
        Ok(status) => {
            let success = classify_exit(&status);
            if !success {
                logger.append(id, &format!("{} exited: {}", engine.name(), status));
            }
            success
        }
        Err(e) => {
            tracing::warn!(id, "wait failed: {}", e);
            false
        }
    }
}

fn forward_lines<R>(
    stream: R,
    engine: Arc<dyn Engine>,
    logger: Arc<dyn Logger>,
    id: CorrelationId,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(line) = engine.filter_output(&line) {
                logger.append(id, &line);
            }
        }
    })
}
