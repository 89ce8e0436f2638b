//! Log context: the active sink, the minimum level, and the leveled API.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::facade::callsite::Skip;
use crate::facade::level::{Level, LevelVar};
use crate::facade::record::{Attr, LogRecord, Value};
use crate::facade::sink::{LogSink, TracingSink};
use crate::observability::metrics;

/// Owns the active sink and the minimum level.
///
/// The sink is swapped atomically: a log call racing with
/// [`LogContext::set_default`] uses either the old or the new sink for the
/// whole record, never a mixture.
pub struct LogContext {
    sink: ArcSwap<Arc<dyn LogSink>>,
    level: Arc<LevelVar>,
    stats: ContextStats,
}

#[derive(Debug, Default)]
struct ContextStats {
    by_level: [AtomicU64; 4],
    checked_panics: AtomicU64,
    unexpected_panics: AtomicU64,
}

/// Point-in-time copy of a context's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub debug: u64,
    pub info: u64,
    pub warn: u64,
    pub error: u64,
    pub checked_panics: u64,
    pub unexpected_panics: u64,
}

impl LogContext {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink: ArcSwap::from_pointee(sink),
            level: Arc::new(LevelVar::default()),
            stats: ContextStats::default(),
        }
    }

    pub fn with_level(self, level: Level) -> Self {
        self.level.set(level);
        self
    }

    /// Replace the active sink.
    pub fn set_default(&self, sink: Arc<dyn LogSink>) {
        self.sink.store(Arc::new(sink));
    }

    /// The active sink.
    pub fn sink(&self) -> Arc<dyn LogSink> {
        let guard = self.sink.load();
        Arc::clone(&**guard)
    }

    pub fn level(&self) -> Level {
        self.level.get()
    }

    pub fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    /// Shared handle to the level, for components that update it later.
    pub fn level_var(&self) -> Arc<LevelVar> {
        self.level.clone()
    }

    pub fn stats(&self) -> StatsSnapshot {
        let s = &self.stats;
        StatsSnapshot {
            debug: s.by_level[0].load(Ordering::Relaxed),
            info: s.by_level[1].load(Ordering::Relaxed),
            warn: s.by_level[2].load(Ordering::Relaxed),
            error: s.by_level[3].load(Ordering::Relaxed),
            checked_panics: s.checked_panics.load(Ordering::Relaxed),
            unexpected_panics: s.unexpected_panics.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn count_recovered(&self, checked: bool) {
        if checked {
            self.stats.checked_panics.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.unexpected_panics.fetch_add(1, Ordering::Relaxed);
        }
        metrics::record_recovered(checked);
    }

    /// Emit one record. Every other log method funnels through here.
    #[track_caller]
    pub fn log(&self, level: Level, skip: Skip, message: &str, attrs: Vec<Attr>) {
        if !self.level.allows(level) {
            return;
        }
        let sink = self.sink.load();
        if !sink.enabled(level) {
            return;
        }

        let record = LogRecord::new(level, message, attrs, Some(skip.resolve()));
        sink.handle(&record);

        self.stats.by_level[level as usize].fetch_add(1, Ordering::Relaxed);
        metrics::record_log(level);
    }

    #[track_caller]
    pub fn debug(&self, message: &str, attrs: Vec<Attr>) {
        self.log(Level::Debug, Skip::Default, message, attrs);
    }

    #[track_caller]
    pub fn info(&self, message: &str, attrs: Vec<Attr>) {
        self.log(Level::Info, Skip::Default, message, attrs);
    }

    #[track_caller]
    pub fn warn(&self, message: &str, attrs: Vec<Attr>) {
        self.log(Level::Warn, Skip::Default, message, attrs);
    }

    #[track_caller]
    pub fn error(&self, message: &str, attrs: Vec<Attr>) {
        self.log(Level::Error, Skip::Default, message, attrs);
    }

    /// Debug record `"Print"` with the values keyed by position.
    #[track_caller]
    pub fn print(&self, values: Vec<Value>) {
        let attrs = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Attr::new(i.to_string(), v))
            .collect();
        self.log(Level::Debug, Skip::Default, "Print", attrs);
    }

    /// Debug record `"Printf"` with the formatted text under key `"0"`.
    #[track_caller]
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.log(
            Level::Debug,
            Skip::Default,
            "Printf",
            vec![Attr::new("0", fmt::format(args))],
        );
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink::new()))
    }
}

impl fmt::Debug for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogContext")
            .field("level", &self.level())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs;
    use crate::facade::sink::MemorySink;

    fn memory_context() -> (LogContext, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (LogContext::new(sink.clone()), sink)
    }

    #[test]
    fn test_level_filtering() {
        let (ctx, sink) = memory_context();
        ctx.debug("test1", attrs!["k1" => "v1", "k2" => 2]);
        ctx.set_level(Level::Info);
        ctx.debug("dropped", attrs![]);
        ctx.info("test2", attrs![]);

        assert_eq!(sink.messages(), ["test1", "test2"]);
        let stats = ctx.stats();
        assert_eq!((stats.debug, stats.info), (1, 1));
    }

    #[test]
    fn test_call_site_is_the_caller() {
        let (ctx, sink) = memory_context();
        let line = line!() + 1;
        ctx.warn("here", attrs![]);

        let record = &sink.records()[0];
        let site = record.call_site().unwrap();
        assert_eq!(site.line, line);
        assert_eq!(site.basename(), "context.rs");
    }

    #[test]
    fn test_print_and_printf() {
        let (ctx, sink) = memory_context();
        ctx.print(vec!["test5".into(), "msg5".into()]);
        ctx.printf(format_args!("{} - {}", "test6", "msg6"));

        let records = sink.records();
        assert_eq!(records[0].message(), "Print");
        assert_eq!(records[0].attr("1"), Some(&Value::Str("msg5".into())));
        assert_eq!(records[1].message(), "Printf");
        assert_eq!(records[1].attr("0"), Some(&Value::Str("test6 - msg6".into())));
        assert!(records.iter().all(|r| r.level() == Level::Debug));
    }

    #[test]
    fn test_set_default_swaps_sink() {
        let (ctx, first) = memory_context();
        ctx.info("one", attrs![]);

        let second = Arc::new(MemorySink::new());
        ctx.set_default(second.clone());
        ctx.info("two", attrs![]);

        assert_eq!(first.messages(), ["one"]);
        assert_eq!(second.messages(), ["two"]);
    }
}
