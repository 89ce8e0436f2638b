//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! facade records (TracingSink)
//!     → logging.rs (tracing subscriber: EnvFilter + JSON/pretty fmt layer)
//!
//! facade and recovery counters
//!     → metrics.rs (records per level, recovered panics per kind)
//!     → Prometheus recorder, scraped through the diagnostics endpoint
//! ```
//!
//! # Design Decisions
//! - The facade's own level gates first; `EnvFilter` only narrows further
//! - Counters are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
