//! Recovery boundaries.
//!
//! # States
//! ```text
//! body returns       → Ok(value), nothing logged, no cleanup
//! body unwinds with
//!   CheckedPanic     → (already logged)      → cleanups → Err(Recovered::Checked)
//!   anything else    → Error "recover" record → cleanups → Err(Recovered::Unexpected)
//! ```
//!
//! A boundary never re-raises the panic it caught. A panicking cleanup does
//! not stop the remaining cleanups; once all of them ran, the first cleanup
//! panic is resumed and travels to the next outer boundary.

use std::any::Any;
use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe, Location};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread;

use futures_util::FutureExt;

use crate::facade::callsite::Skip;
use crate::facade::context::LogContext;
use crate::facade::level::Level;
use crate::facade::record::Attr;
use crate::recovery::checked::{BoxError, CheckedPanic};
use crate::recovery::foreign::{describe_payload, payload_value, ForeignPanic};
use crate::recovery::hook::{self, BoundaryGuard};

/// A panic caught by a recovery boundary.
pub enum Recovered {
    /// Raised by `check_error`/`check`; already logged.
    Checked(CheckedPanic),
    /// Any other payload, untouched.
    Unexpected(Box<dyn Any + Send>),
}

impl Recovered {
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<CheckedPanic>() {
            Ok(checked) => Recovered::Checked(*checked),
            Err(payload) => Recovered::Unexpected(payload),
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, Recovered::Checked(_))
    }

    pub fn checked(&self) -> Option<&CheckedPanic> {
        match self {
            Recovered::Checked(checked) => Some(checked),
            Recovered::Unexpected(_) => None,
        }
    }

    /// The raw payload as it was unwound.
    pub fn payload(&self) -> &(dyn Any + Send) {
        match self {
            Recovered::Checked(checked) => checked as &(dyn Any + Send),
            Recovered::Unexpected(payload) => &**payload,
        }
    }

    pub fn describe(&self) -> String {
        describe_payload(self.payload())
    }

    /// Error view: the original error for checked panics, a [`ForeignPanic`]
    /// otherwise.
    pub fn into_error(self) -> BoxError {
        match self {
            Recovered::Checked(checked) => checked.into_original(),
            Recovered::Unexpected(payload) => Box::new(ForeignPanic::from_payload(payload)),
        }
    }

    /// Payload suitable for `std::panic::resume_unwind`, for callers that
    /// want to rethrow.
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        match self {
            Recovered::Checked(checked) => Box::new(checked),
            Recovered::Unexpected(payload) => payload,
        }
    }
}

impl fmt::Debug for Recovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recovered::Checked(checked) => f.debug_tuple("Checked").field(checked).finish(),
            Recovered::Unexpected(_) => f.debug_tuple("Unexpected").field(&self.describe()).finish(),
        }
    }
}

impl fmt::Display for Recovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl StdError for Recovered {}

/// Cleanup run by a synchronous boundary.
pub type Cleanup<'a> = Box<dyn FnOnce(&Recovered) + 'a>;

/// Cleanup run by an async boundary; must be movable across threads.
pub type AsyncCleanup = Box<dyn FnOnce(&Recovered) + Send + 'static>;

pub fn cleanup<'a>(f: impl FnOnce(&Recovered) + 'a) -> Cleanup<'a> {
    Box::new(f)
}

pub fn async_cleanup(f: impl FnOnce(&Recovered) + Send + 'static) -> AsyncCleanup {
    Box::new(f)
}

/// Keeps the boundary depth raised for every poll of the inner future.
struct BoundaryScope<F> {
    inner: Pin<Box<F>>,
}

impl<F: Future> Future for BoundaryScope<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let _boundary = BoundaryGuard::enter();
        self.inner.as_mut().poll(cx)
    }
}

impl LogContext {
    /// Run `body` inside a recovery boundary.
    ///
    /// Returns `Ok` with the body's value when it does not panic. Otherwise
    /// the panic is absorbed: unexpected payloads are logged at Error level
    /// as `"recover"` with `recoverObj` (and `callStack` when `show_stack`),
    /// checked panics are not logged again, every cleanup runs in order with
    /// the payload, and `Err(Recovered)` is returned.
    #[track_caller]
    pub fn recover<T, F>(&self, show_stack: bool, cleanups: Vec<Cleanup<'_>>, body: F) -> Result<T, Recovered>
    where
        F: FnOnce() -> T,
    {
        let location = Location::caller();
        hook::install_panic_hook();

        let boundary = BoundaryGuard::enter();
        let result = panic::catch_unwind(AssertUnwindSafe(body));
        drop(boundary);

        self.settle(result, show_stack, location, cleanups)
    }

    /// [`LogContext::recover`] for a future.
    #[track_caller]
    pub fn recover_async<'a, T, F>(
        &'a self,
        show_stack: bool,
        cleanups: Vec<AsyncCleanup>,
        future: F,
    ) -> impl Future<Output = Result<T, Recovered>> + 'a
    where
        F: Future<Output = T> + 'a,
        T: 'a,
    {
        let location = Location::caller();
        hook::install_panic_hook();

        async move {
            let scoped = BoundaryScope {
                inner: Box::pin(future),
            };
            let result = AssertUnwindSafe(scoped).catch_unwind().await;
            self.settle(result, show_stack, location, cleanups)
        }
    }

    fn settle<T, I>(
        &self,
        result: thread::Result<T>,
        show_stack: bool,
        location: &'static Location<'static>,
        cleanups: I,
    ) -> Result<T, Recovered>
    where
        I: IntoIterator,
        I::Item: FnOnce(&Recovered),
    {
        // A panic the body caught itself still left its stack behind.
        let captured = hook::take_captured_stack();
        let payload = match result {
            Ok(value) => return Ok(value),
            Err(payload) => payload,
        };

        let recovered = Recovered::from_payload(payload);
        self.count_recovered(recovered.is_checked());

        if let Recovered::Unexpected(payload) = &recovered {
            let mut attrs = vec![Attr::new("recoverObj", payload_value(&**payload))];
            if show_stack {
                let stack = captured.unwrap_or_else(|| Backtrace::force_capture().to_string());
                attrs.push(Attr::new("callStack", stack));
            }
            self.log(Level::Error, Skip::Location(location), "recover", attrs);
        }

        run_cleanups(cleanups, &recovered);
        Err(recovered)
    }
}

fn run_cleanups<I>(cleanups: I, recovered: &Recovered)
where
    I: IntoIterator,
    I::Item: FnOnce(&Recovered),
{
    let mut first_panic = None;
    for cleanup in cleanups {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| cleanup(recovered))) {
            first_panic.get_or_insert(payload);
        }
    }
    if let Some(payload) = first_panic {
        panic::resume_unwind(payload);
    }
}

/// Spawn `future` on the Tokio runtime inside an async recovery boundary.
/// The task yields `None` when the future panicked.
#[track_caller]
pub fn spawn_recovered<T, F>(
    ctx: std::sync::Arc<LogContext>,
    show_stack: bool,
    future: F,
) -> tokio::task::JoinHandle<Option<T>>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let location = Location::caller();
    tokio::spawn(async move {
        let scoped = BoundaryScope {
            inner: Box::pin(future),
        };
        let result = AssertUnwindSafe(scoped).catch_unwind().await;
        ctx.settle(result, show_stack, location, Vec::<AsyncCleanup>::new())
            .ok()
    })
}
