//! Leveled logging facade.
//!
//! # Data Flow
//! ```text
//! application code
//!     → context.rs (level check, call site, record)
//!     → sink.rs (LogSink: TracingSink by default)
//!     → tracing subscriber (observability/logging.rs)
//! ```
//!
//! # Design Decisions
//! - The sink is behind an `ArcSwap`, the level behind an atomic byte
//! - Call sites come from `#[track_caller]`, not stack walking
//! - `global.rs` holds the process-wide context; everything also works on
//!   an owned `LogContext`

pub mod callsite;
pub mod context;
pub mod global;
pub mod level;
pub mod record;
pub mod sink;

pub use callsite::{CallSite, Skip};
pub use context::{LogContext, StatsSnapshot};
pub use level::{Level, LevelVar};
pub use record::{Attr, AttrMap, LogRecord, Value};
pub use sink::{LogSink, MemorySink, TracingSink};
