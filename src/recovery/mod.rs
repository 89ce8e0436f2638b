//! Checked-error protocol and recovery boundaries.
//!
//! # Data Flow
//! ```text
//! check_error(Some(err)) / check(Err(err))
//!     → "checkError" record (once)
//!     → unwind with CheckedPanic
//!     → recover(): recognizes CheckedPanic, logs nothing
//!
//! any other panic
//!     → hook.rs (backtrace stored while inside a boundary)
//!     → recover(): "recover" record (+ callStack), absorbed
//! ```
//!
//! # Design Decisions
//! - Two taxonomies: checked errors are logged where they are checked,
//!   unexpected panics where they are recovered
//! - A path without any boundary is fatal to the thread, as usual in Rust
//! - Cleanups always run, in order, once per recovered panic

pub mod checked;
pub mod coordinator;
pub mod foreign;
pub mod hook;

use std::future::Future;

pub use checked::{BoxError, CheckedPanic};
pub use coordinator::{async_cleanup, cleanup, spawn_recovered, AsyncCleanup, Cleanup, Recovered};
pub use foreign::{describe_payload, ForeignPanic};
pub use hook::install_panic_hook;

use crate::facade::global::global;
use crate::facade::record::Attr;

/// [`crate::LogContext::check_error`] on the process-wide context.
#[track_caller]
pub fn check_error<E>(err: Option<E>, attrs: Vec<Attr>)
where
    E: Into<BoxError>,
{
    global().check_error(err, attrs);
}

/// [`crate::LogContext::check`] on the process-wide context.
#[track_caller]
pub fn check<T, E>(result: Result<T, E>, attrs: Vec<Attr>) -> T
where
    E: Into<BoxError>,
{
    global().check(result, attrs)
}

/// [`crate::LogContext::recover`] on the process-wide context.
#[track_caller]
pub fn recover<T, F>(show_stack: bool, cleanups: Vec<Cleanup<'_>>, body: F) -> Result<T, Recovered>
where
    F: FnOnce() -> T,
{
    global().recover(show_stack, cleanups, body)
}

/// [`crate::LogContext::recover_async`] on the process-wide context.
#[track_caller]
pub fn recover_async<T, F>(
    show_stack: bool,
    cleanups: Vec<AsyncCleanup>,
    future: F,
) -> impl Future<Output = Result<T, Recovered>>
where
    F: Future<Output = T> + 'static,
    T: 'static,
{
    global().recover_async(show_stack, cleanups, future)
}

/// Wrap an arbitrary value, typically a panic payload, as an error.
pub fn wrap_to_err<T: std::any::Any + Send>(obj: T) -> BoxError {
    Box::new(ForeignPanic::wrap(obj))
}
