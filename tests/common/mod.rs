//! Shared helpers for the integration tests.

use std::sync::Arc;

use recoverlog::{LogContext, LogRecord, MemorySink};

/// A context writing into a fresh memory sink.
pub fn memory_context() -> (Arc<LogContext>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (Arc::new(LogContext::new(sink.clone())), sink)
}

/// Records with the given message.
#[allow(dead_code)]
pub fn with_message(sink: &MemorySink, message: &str) -> Vec<LogRecord> {
    sink.records()
        .into_iter()
        .filter(|r| r.message() == message)
        .collect()
}
