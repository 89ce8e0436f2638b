//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Config (validated, immutable)
//!
//! On change (watcher.rs) or SIGHUP (lifecycle):
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → apply_config: level swapped atomically on the LogContext
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; an empty file is valid
//! - Only the level is hot-reloadable; format and filter need a restart
//! - An invalid file on reload is logged and ignored

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{apply_config, load_config, parse_config, ConfigError};
pub use schema::{Config, DiagnosticsConfig, LogFormat, LoggingConfig};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
