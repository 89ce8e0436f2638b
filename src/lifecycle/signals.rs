//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGINT, SIGQUIT, SIGTERM and SIGHUP before waiting
//! - Translate signals to [`ProcessSignal`] values
//! - Classify them: terminate or reload
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe, nothing lost once registered)
//! - SIGHUP reloads, it never shuts down
//! - Anything unrecognized terminates rather than hanging forever

use std::fmt;
use std::future::Future;
use std::io;

use tokio::sync::mpsc;

/// A signal delivered to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessSignal {
    Interrupt,
    Quit,
    Terminate,
    Hangup,
    Other(i32),
}

impl fmt::Display for ProcessSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessSignal::Interrupt => f.write_str("SIGINT"),
            ProcessSignal::Quit => f.write_str("SIGQUIT"),
            ProcessSignal::Terminate => f.write_str("SIGTERM"),
            ProcessSignal::Hangup => f.write_str("SIGHUP"),
            ProcessSignal::Other(n) => write!(f, "signal {}", n),
        }
    }
}

/// What the shutdown sequencer does with a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalClass {
    Terminate,
    Reload,
}

pub fn classify(signal: ProcessSignal) -> SignalClass {
    match signal {
        ProcessSignal::Interrupt | ProcessSignal::Quit | ProcessSignal::Terminate => {
            SignalClass::Terminate
        }
        ProcessSignal::Hangup => SignalClass::Reload,
        ProcessSignal::Other(_) => SignalClass::Terminate,
    }
}

/// Something that yields signals. `None` means no more signals will arrive.
pub trait SignalSource {
    fn recv(&mut self) -> impl Future<Output = Option<ProcessSignal>> + Send;
}

/// The process's own signals, registered with the Tokio driver.
#[cfg(unix)]
pub struct OsSignals {
    interrupt: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// Register all four signals. Must run inside a Tokio runtime.
    pub fn register() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            quit: signal(SignalKind::quit())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }
}

#[cfg(unix)]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<ProcessSignal> {
        tokio::select! {
            s = self.interrupt.recv() => s.map(|_| ProcessSignal::Interrupt),
            s = self.quit.recv() => s.map(|_| ProcessSignal::Quit),
            s = self.terminate.recv() => s.map(|_| ProcessSignal::Terminate),
            s = self.hangup.recv() => s.map(|_| ProcessSignal::Hangup),
        }
    }
}

/// Ctrl-C only; the other signals do not exist on this platform.
#[cfg(not(unix))]
pub struct OsSignals {
    _private: (),
}

#[cfg(not(unix))]
impl OsSignals {
    pub fn register() -> io::Result<Self> {
        Ok(Self { _private: () })
    }
}

#[cfg(not(unix))]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<ProcessSignal> {
        tokio::signal::ctrl_c()
            .await
            .ok()
            .map(|_| ProcessSignal::Interrupt)
    }
}

/// Signals fed through a bounded channel.
pub struct ChannelSignals {
    rx: mpsc::Receiver<ProcessSignal>,
}

/// Create a channel-backed source. Capacity is at least one, so a signal
/// sent before anyone waits is kept.
pub fn channel(capacity: usize) -> (mpsc::Sender<ProcessSignal>, ChannelSignals) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (tx, ChannelSignals { rx })
}

impl SignalSource for ChannelSignals {
    async fn recv(&mut self) -> Option<ProcessSignal> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(classify(ProcessSignal::Interrupt), SignalClass::Terminate);
        assert_eq!(classify(ProcessSignal::Quit), SignalClass::Terminate);
        assert_eq!(classify(ProcessSignal::Terminate), SignalClass::Terminate);
        assert_eq!(classify(ProcessSignal::Hangup), SignalClass::Reload);
        assert_eq!(classify(ProcessSignal::Other(10)), SignalClass::Terminate);
    }

    #[tokio::test]
    async fn test_channel_keeps_early_signal() {
        let (tx, mut source) = channel(0);
        tx.send(ProcessSignal::Hangup).await.unwrap();
        drop(tx);

        assert_eq!(source.recv().await, Some(ProcessSignal::Hangup));
        assert_eq!(source.recv().await, None);
    }
}
