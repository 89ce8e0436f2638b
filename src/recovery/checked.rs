//! Check-and-panic: log an error once, then unwind with a tagged payload.

use std::error::Error as StdError;
use std::fmt;
use std::panic;

use crate::facade::callsite::Skip;
use crate::facade::context::LogContext;
use crate::facade::level::Level;
use crate::facade::record::{Attr, Value};
use crate::recovery::hook;

/// Boxed error carried by a [`CheckedPanic`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Panic payload raised by [`LogContext::check_error`].
///
/// Its type tells a recovery boundary that the error was already logged.
pub struct CheckedPanic {
    original: BoxError,
}

impl CheckedPanic {
    pub(crate) fn new(original: BoxError) -> Self {
        Self { original }
    }

    pub fn original(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.original
    }

    pub fn into_original(self) -> BoxError {
        self.original
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.original.downcast_ref::<E>()
    }
}

impl fmt::Display for CheckedPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.original, f)
    }
}

impl fmt::Debug for CheckedPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckedPanic")
            .field("original", &self.original)
            .finish()
    }
}

impl StdError for CheckedPanic {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.original.source()
    }
}

impl LogContext {
    /// Log `err` at Error level as `"checkError"` and unwind with a
    /// [`CheckedPanic`]. `None` is a no-op.
    ///
    /// The record carries `err` first, then `attrs`. Use this only for
    /// errors that end the current unit of work; the unwind must be caught
    /// by a recovery boundary ([`LogContext::recover`]).
    #[track_caller]
    pub fn check_error<E>(&self, err: Option<E>, attrs: Vec<Attr>)
    where
        E: Into<BoxError>,
    {
        if let Some(err) = err {
            self.raise(err.into(), attrs);
        }
    }

    /// `Result` form of [`LogContext::check_error`]: returns the `Ok` value.
    #[track_caller]
    pub fn check<T, E>(&self, result: Result<T, E>, attrs: Vec<Attr>) -> T
    where
        E: Into<BoxError>,
    {
        match result {
            Ok(value) => value,
            Err(err) => self.raise(err.into(), attrs),
        }
    }

    #[track_caller]
    fn raise(&self, err: BoxError, attrs: Vec<Attr>) -> ! {
        let mut all = Vec::with_capacity(attrs.len() + 1);
        all.push(Attr::new("err", Value::error(&*err)));
        all.extend(attrs);
        self.log(Level::Error, Skip::Default, "checkError", all);

        hook::install_panic_hook();
        panic::panic_any(CheckedPanic::new(err))
    }
}
