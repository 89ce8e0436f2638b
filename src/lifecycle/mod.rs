//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → install subscriber + panic hook → configure context
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT/SIGQUIT → terminate
//!     SIGHUP → reload, keep waiting
//!
//! Sequencer (sequencer.rs):
//!     Wait → terminate signal → run shutdown callbacks in order → return
//!
//! Shutdown (shutdown.rs):
//!     Broadcast to background tasks, usually from a shutdown callback
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: callbacks run synchronously in registration order
//! - No shutdown timeout: a stuck callback keeps the process waiting

pub mod sequencer;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use sequencer::{callback, notify, notify_blocking, ShutdownCallback, ShutdownSequencer};
pub use shutdown::Shutdown;
pub use signals::{ProcessSignal, SignalClass, SignalSource};
pub use startup::{init, InitError};
