//! Append-only sink for engine output, keyed by per-item correlation id.

use std::sync::atomic::{AtomicU64, Ordering};

pub type CorrelationId = u64;

static NEXT_CORRELATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id for routing one task's output and cancellation.
pub fn next_correlation_id() -> CorrelationId {
    NEXT_CORRELATION_ID.fetch_add(1, Ordering::Relaxed)
}

pub trait Logger: Send + Sync {
    /// Append one line; ordering is preserved per `id`.
    fn append(&self, id: CorrelationId, line: &str);
}

/// Forwards engine output into the tracing subscriber.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    engine: String,
}

impl TracingLogger {
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
        }
    }
}

impl Logger for TracingLogger {
    fn append(&self, id: CorrelationId, line: &str) {
        tracing::info!(target: "batchdl::engine", id, engine = %self.engine, "{}", line);
    }
}
