//! Structured logging facade with a check-and-panic error protocol and a
//! signal-driven shutdown sequencer.
//!
//! # Architecture Overview
//!
//! ```text
//!  application ──▶ facade (level check, call site) ──▶ LogSink ──▶ tracing subscriber
//!       │
//!       ├── check_error / check ──▶ "checkError" record ──▶ unwind(CheckedPanic)
//!       │                                                        │
//!       └── recover(show_stack, cleanups, body) ◀────────────────┘
//!               (logs only unexpected panics, runs cleanups, absorbs)
//!
//!  OS signals ──▶ ShutdownSequencer ──▶ shutdown callbacks (in order)
//! ```

// Core subsystems
pub mod facade;
pub mod recovery;

// Cross-cutting concerns
pub mod config;
pub mod diagnostics;
pub mod lifecycle;
pub mod observability;

pub use facade::global::{debug, default_sink, error, global, info, print, printf, set_default, set_level, warn};
pub use facade::{Attr, CallSite, Level, LevelVar, LogContext, LogRecord, LogSink, MemorySink, TracingSink, Value};
pub use lifecycle::{init, notify, notify_blocking, ShutdownSequencer};
pub use recovery::{check, check_error, cleanup, recover, recover_async, wrap_to_err, CheckedPanic, Recovered};
