//! Signal-driven shutdown sequencing.
//!
//! # States
//! ```text
//! Waiting → signal received → Evaluating ("notify" record)
//! Evaluating → terminate class → Draining (callbacks in order) → Done
//! Evaluating → reload class    → reload hook → Waiting
//! Waiting → source closed      → Draining → Done
//! ```
//!
//! There is no timeout and no cancellation: a callback that never returns
//! keeps the sequencer in Draining.

use std::io;
use std::sync::Arc;

use crate::attrs;
use crate::facade::context::LogContext;
use crate::facade::global::global;
use crate::lifecycle::signals::{classify, OsSignals, ProcessSignal, SignalClass, SignalSource};

/// Zero-argument callback run once when the process shuts down.
pub type ShutdownCallback = Box<dyn FnOnce() + Send + 'static>;

pub fn callback(f: impl FnOnce() + Send + 'static) -> ShutdownCallback {
    Box::new(f)
}

/// Blocks until a terminate-class signal arrives, then runs the shutdown
/// callbacks. One sequencer per process.
pub struct ShutdownSequencer {
    ctx: Arc<LogContext>,
    on_reload: Option<Box<dyn FnMut() + Send + 'static>>,
}

impl ShutdownSequencer {
    pub fn new(ctx: Arc<LogContext>) -> Self {
        Self {
            ctx,
            on_reload: None,
        }
    }

    /// Run `f` on every reload-class signal before waiting again.
    pub fn on_reload(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_reload = Some(Box::new(f));
        self
    }

    /// Register the OS signals, wait, and run `callbacks` on shutdown.
    pub async fn notify(self, callbacks: Vec<ShutdownCallback>) -> io::Result<Option<ProcessSignal>> {
        let mut source = OsSignals::register()?;
        Ok(self.notify_from(&mut source, callbacks).await)
    }

    /// Like [`ShutdownSequencer::notify`] with an explicit signal source.
    ///
    /// Returns the signal that ended the wait, or `None` if the source
    /// closed first (which also runs the callbacks).
    pub async fn notify_from<S>(mut self, source: &mut S, callbacks: Vec<ShutdownCallback>) -> Option<ProcessSignal>
    where
        S: SignalSource,
    {
        let received = loop {
            let Some(signal) = source.recv().await else {
                self.ctx.warn("notify", attrs!["notifyObj" => "signal source closed"]);
                break None;
            };

            self.ctx.info("notify", attrs!["notifyObj" => signal.to_string()]);
            match classify(signal) {
                SignalClass::Terminate => break Some(signal),
                SignalClass::Reload => {
                    if let Some(reload) = self.on_reload.as_mut() {
                        reload();
                    }
                }
            }
        };

        for callback in callbacks {
            callback();
        }
        received
    }
}

/// Wait on the process-wide context for a terminate signal, then run
/// `callbacks` in order.
pub async fn notify(callbacks: Vec<ShutdownCallback>) -> io::Result<Option<ProcessSignal>> {
    ShutdownSequencer::new(global().clone()).notify(callbacks).await
}

/// [`notify`] for code without a Tokio runtime. Builds a current-thread
/// runtime for the wait. Inside a runtime, use [`notify`] instead; calling
/// this there returns an error without waiting.
pub fn notify_blocking(callbacks: Vec<ShutdownCallback>) -> io::Result<Option<ProcessSignal>> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(io::Error::other(
            "notify_blocking called from inside a Tokio runtime; await notify instead",
        ));
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(notify(callbacks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::sink::MemorySink;
    use crate::lifecycle::signals::channel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_notify_blocking_inside_runtime_is_an_error() {
        let called = Arc::new(AtomicUsize::new(0));
        let counter = called.clone();

        let err = notify_blocking(vec![callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })])
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    fn memory_context() -> (Arc<LogContext>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Arc::new(LogContext::new(sink.clone())), sink)
    }

    fn recording(order: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> ShutdownCallback {
        let order = order.clone();
        callback(move || order.lock().unwrap().push(name))
    }

    #[tokio::test]
    async fn test_terminate_runs_callbacks_in_order() {
        let (ctx, sink) = memory_context();
        let order = Arc::new(Mutex::new(Vec::new()));
        let (tx, mut source) = channel(1);
        tx.send(ProcessSignal::Terminate).await.unwrap();

        let signal = ShutdownSequencer::new(ctx)
            .notify_from(&mut source, vec![recording(&order, "a"), recording(&order, "b")])
            .await;

        assert_eq!(signal, Some(ProcessSignal::Terminate));
        assert_eq!(*order.lock().unwrap(), ["a", "b"]);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message(), "notify");
        assert_eq!(records[0].attr("notifyObj").and_then(|v| v.as_str()), Some("SIGTERM"));
    }

    #[tokio::test]
    async fn test_reload_keeps_waiting() {
        let (ctx, sink) = memory_context();
        let reloads = Arc::new(AtomicUsize::new(0));
        let ran = Arc::new(AtomicUsize::new(0));
        let (tx, mut source) = channel(4);

        let sequencer = {
            let reloads = reloads.clone();
            ShutdownSequencer::new(ctx).on_reload(move || {
                reloads.fetch_add(1, Ordering::SeqCst);
            })
        };
        let ran_in_callback = ran.clone();
        let task = tokio::spawn(async move {
            sequencer
                .notify_from(
                    &mut source,
                    vec![callback(move || {
                        ran_in_callback.fetch_add(1, Ordering::SeqCst);
                    })],
                )
                .await
        });

        tx.send(ProcessSignal::Hangup).await.unwrap();
        tx.send(ProcessSignal::Hangup).await.unwrap();
        tokio::task::yield_now().await;
        assert_eq!(ran.load(Ordering::SeqCst), 0);

        tx.send(ProcessSignal::Interrupt).await.unwrap();
        assert_eq!(task.await.unwrap(), Some(ProcessSignal::Interrupt));

        assert_eq!(reloads.load(Ordering::SeqCst), 2);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(sink.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_signal_terminates() {
        let (ctx, _sink) = memory_context();
        let (tx, mut source) = channel(1);
        tx.send(ProcessSignal::Other(12)).await.unwrap();

        let signal = ShutdownSequencer::new(ctx).notify_from(&mut source, vec![]).await;
        assert_eq!(signal, Some(ProcessSignal::Other(12)));
    }

    #[tokio::test]
    async fn test_closed_source_still_shuts_down() {
        let (ctx, sink) = memory_context();
        let ran = Arc::new(AtomicUsize::new(0));
        let (tx, mut source) = channel(1);
        drop(tx);

        let counter = ran.clone();
        let signal = ShutdownSequencer::new(ctx)
            .notify_from(
                &mut source,
                vec![callback(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })],
            )
            .await;

        assert_eq!(signal, None);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(sink.records()[0].level(), crate::facade::level::Level::Warn);
    }
}
