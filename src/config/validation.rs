//! Configuration validation.
//!
//! Serde handles syntax; this checks values. Every problem is reported,
//! not just the first.

use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::Config;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("diagnostics.bind_address {address:?} is not a socket address")]
    InvalidBindAddress { address: String },

    #[error("logging.filter {filter:?} is invalid: {reason}")]
    InvalidFilter { filter: String, reason: String },
}

pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.diagnostics.enabled
        && config.diagnostics.bind_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidBindAddress {
            address: config.diagnostics.bind_address.clone(),
        });
    }

    if let Err(e) = EnvFilter::try_new(&config.logging.filter) {
        errors.push(ValidationError::InvalidFilter {
            filter: config.logging.filter.clone(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = Config::default();
        config.diagnostics.enabled = true;
        config.diagnostics.bind_address = "localhost".into();
        config.logging.filter = "recoverlog=loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::InvalidBindAddress { .. }));
        assert!(matches!(errors[1], ValidationError::InvalidFilter { .. }));
    }

    #[test]
    fn test_bind_address_ignored_when_disabled() {
        let mut config = Config::default();
        config.diagnostics.bind_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }
}
