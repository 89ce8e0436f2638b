//! Process-wide context and the free-function logging API.
//!
//! The process-wide context is built on first use with a [`TracingSink`],
//! so there is always a usable sink. [`crate::init`] is the explicit entry
//! point that also installs the tracing subscriber and the panic hook.

use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::facade::context::LogContext;
use crate::facade::level::Level;
use crate::facade::record::{Attr, Value};
use crate::facade::sink::{LogSink, TracingSink};

static GLOBAL: LazyLock<Arc<LogContext>> =
    LazyLock::new(|| Arc::new(LogContext::new(Arc::new(TracingSink::new()))));

/// The process-wide context.
pub fn global() -> &'static Arc<LogContext> {
    &GLOBAL
}

/// Replace the sink of the process-wide context.
pub fn set_default(sink: Arc<dyn LogSink>) {
    GLOBAL.set_default(sink);
}

/// The sink of the process-wide context.
pub fn default_sink() -> Arc<dyn LogSink> {
    GLOBAL.sink()
}

pub fn set_level(level: Level) {
    GLOBAL.set_level(level);
}

#[track_caller]
pub fn debug(message: &str, attrs: Vec<Attr>) {
    GLOBAL.debug(message, attrs);
}

#[track_caller]
pub fn info(message: &str, attrs: Vec<Attr>) {
    GLOBAL.info(message, attrs);
}

#[track_caller]
pub fn warn(message: &str, attrs: Vec<Attr>) {
    GLOBAL.warn(message, attrs);
}

#[track_caller]
pub fn error(message: &str, attrs: Vec<Attr>) {
    GLOBAL.error(message, attrs);
}

#[track_caller]
pub fn print(values: Vec<Value>) {
    GLOBAL.print(values);
}

#[track_caller]
pub fn printf(args: fmt::Arguments<'_>) {
    GLOBAL.printf(args);
}
