//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the tracing subscriber from the logging config
//! - Install the panic hook used by recovery boundaries
//! - Configure the process-wide context (sink, level)
//!
//! # Design Decisions
//! - Fail fast: a second `init` or a bad filter is an error
//! - The process-wide context exists before `init` (tracing sink, debug
//!   level); `init` only reconfigures it

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;

use crate::config::schema::Config;
use crate::facade::context::LogContext;
use crate::facade::global::global;
use crate::facade::sink::TracingSink;
use crate::observability::logging::init_subscriber;
use crate::recovery::hook::install_panic_hook;

#[derive(Debug, Error)]
pub enum InitError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Explicit initialization entry point. Returns the process-wide context.
pub fn init(config: &Config) -> Result<&'static Arc<LogContext>, InitError> {
    init_subscriber(&config.logging)?;
    install_panic_hook();

    let ctx = global();
    configure(ctx, config);
    Ok(ctx)
}

/// Point `ctx` at a tracing sink built from `config`.
pub fn configure(ctx: &LogContext, config: &Config) {
    let sink = if config.logging.source_basename {
        TracingSink::new()
    } else {
        TracingSink::new().with_full_paths()
    };
    ctx.set_default(Arc::new(sink));
    ctx.set_level(config.logging.level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::level::Level;
    use crate::facade::sink::MemorySink;

    #[test]
    fn test_configure_replaces_sink_and_level() {
        let memory = Arc::new(MemorySink::new());
        let ctx = LogContext::new(memory.clone());
        let mut config = Config::default();
        config.logging.level = Level::Error;

        configure(&ctx, &config);
        ctx.error("to tracing", vec![]);

        assert_eq!(ctx.level(), Level::Error);
        assert!(memory.is_empty());
    }
}
