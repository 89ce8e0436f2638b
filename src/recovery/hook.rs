//! Process panic hook cooperating with recovery boundaries.
//!
//! - `CheckedPanic` payloads print nothing: they were logged before unwinding.
//! - Any other panic raised inside a recovery boundary stores a backtrace for
//!   the boundary and prints nothing; the boundary logs it. This includes a
//!   panic that code inside the boundary catches with `catch_unwind` itself:
//!   it leaves no output, and the boundary discards its stored backtrace
//!   when the body returns normally.
//! - Panics outside every boundary go to the previously installed hook.

use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic;
use std::sync::Once;

use crate::recovery::checked::CheckedPanic;

static INSTALL: Once = Once::new();

thread_local! {
    static BOUNDARY_DEPTH: Cell<usize> = const { Cell::new(0) };
    static CAPTURED_STACK: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Install the hook once per process. Later calls are no-ops.
///
/// A hook installed afterwards with `std::panic::set_hook` replaces this one,
/// after which checked panics print the default panic message again.
pub fn install_panic_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if info.payload().is::<CheckedPanic>() {
                return;
            }
            if BOUNDARY_DEPTH.with(Cell::get) > 0 {
                let stack = Backtrace::force_capture().to_string();
                CAPTURED_STACK.with(|slot| *slot.borrow_mut() = Some(stack));
                return;
            }
            previous(info);
        }));
    });
}

pub fn is_installed() -> bool {
    INSTALL.is_completed()
}

/// Marks the current thread as running inside a recovery boundary.
pub(crate) struct BoundaryGuard {
    _private: (),
}

impl BoundaryGuard {
    pub(crate) fn enter() -> Self {
        BOUNDARY_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self { _private: () }
    }
}

impl Drop for BoundaryGuard {
    fn drop(&mut self) {
        BOUNDARY_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Backtrace stored by the hook for the most recent panic on this thread.
pub(crate) fn take_captured_stack() -> Option<String> {
    CAPTURED_STACK.with(|slot| slot.borrow_mut().take())
}
