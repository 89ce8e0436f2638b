//! Log sinks: the backend a context hands finished records to.

use std::sync::{Mutex, MutexGuard};

use crate::facade::level::Level;
use crate::facade::record::{Attr, AttrMap, LogRecord};

/// Target used for every event the tracing backend receives from the facade.
pub const TRACING_TARGET: &str = "recoverlog";

/// Backend accepting leveled, attributed records.
pub trait LogSink: Send + Sync {
    /// Cheap pre-check so callers can skip building a record.
    fn enabled(&self, level: Level) -> bool;

    fn handle(&self, record: &LogRecord);
}

/// Default sink: forwards every record as a `tracing` event.
#[derive(Debug, Clone)]
pub struct TracingSink {
    source_basename: bool,
}

impl TracingSink {
    pub fn new() -> Self {
        Self {
            source_basename: true,
        }
    }

    /// Report the full source path instead of the file name.
    pub fn with_full_paths(mut self) -> Self {
        self.source_basename = false;
        self
    }

    fn source(&self, record: &LogRecord) -> String {
        match record.call_site() {
            Some(site) if self.source_basename => format!("{}:{}", site.basename(), site.line),
            Some(site) => site.to_string(),
            None => String::new(),
        }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Attributes as a JSON object, keys in insertion order.
fn render_attrs(attrs: &[Attr]) -> String {
    serde_json::to_string(&AttrMap(attrs)).unwrap_or_default()
}

/// Emits one event. The attributes the recovery protocol writes get their
/// own fields; every attribute is also in `attrs` as a JSON object.
macro_rules! emit {
    ($level:ident, $record:expr, $source:expr, $attrs:expr) => {
        tracing::$level!(
            target: TRACING_TARGET,
            source = %$source,
            err = $record.attr("err").map(tracing::field::display),
            recoverObj = $record.attr("recoverObj").map(tracing::field::display),
            callStack = $record.attr("callStack").map(tracing::field::display),
            notifyObj = $record.attr("notifyObj").map(tracing::field::display),
            attrs = %$attrs,
            "{}",
            $record.message()
        )
    };
}

impl LogSink for TracingSink {
    fn enabled(&self, level: Level) -> bool {
        match level {
            Level::Debug => tracing::enabled!(target: TRACING_TARGET, tracing::Level::DEBUG),
            Level::Info => tracing::enabled!(target: TRACING_TARGET, tracing::Level::INFO),
            Level::Warn => tracing::enabled!(target: TRACING_TARGET, tracing::Level::WARN),
            Level::Error => tracing::enabled!(target: TRACING_TARGET, tracing::Level::ERROR),
        }
    }

    fn handle(&self, record: &LogRecord) {
        let source = self.source(record);
        let attrs = render_attrs(record.attrs());

        match record.level() {
            Level::Debug => emit!(debug, record, source, attrs),
            Level::Info => emit!(info, record, source, attrs),
            Level::Warn => emit!(warn, record, source, attrs),
            Level::Error => emit!(error, record, source, attrs),
        }
    }
}

/// Sink that keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    // Records are pushed from threads that are about to unwind; a poisoned
    // lock still holds a consistent Vec.
    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|r| r.message().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn handle(&self, record: &LogRecord) {
        self.lock().push(record.clone());
    }
}
