//! Log levels and the shared, atomically updated minimum level.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Severity of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }

    fn as_u8(self) -> u8 {
        self as u8
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            _ => Level::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl From<Level> for tracing::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error => tracing::Level::ERROR,
        }
    }
}

/// Minimum level shared by every log call of a context.
///
/// The level is a single byte behind an atomic, so readers on the hot
/// logging path never block and always see either the old or the new value.
#[derive(Debug)]
pub struct LevelVar {
    raw: AtomicU8,
}

impl LevelVar {
    pub fn new(level: Level) -> Self {
        Self {
            raw: AtomicU8::new(level.as_u8()),
        }
    }

    pub fn get(&self) -> Level {
        Level::from_u8(self.raw.load(Ordering::Acquire))
    }

    pub fn set(&self, level: Level) {
        self.raw.store(level.as_u8(), Ordering::Release);
    }

    /// Whether a record at `level` passes the threshold.
    pub fn allows(&self, level: Level) -> bool {
        level >= self.get()
    }
}

impl Default for LevelVar {
    fn default() -> Self {
        Self::new(Level::Debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_level_ordering_and_parse() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert_eq!("WARNING".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!(" info ".parse::<Level>().unwrap(), Level::Info);
        assert!("trace".parse::<Level>().is_err());
    }

    #[test]
    fn test_level_var_threshold() {
        let var = LevelVar::default();
        assert!(var.allows(Level::Debug));

        var.set(Level::Warn);
        assert!(!var.allows(Level::Info));
        assert!(var.allows(Level::Warn));
        assert!(var.allows(Level::Error));
    }

    #[test]
    fn test_concurrent_reads_see_old_or_new_value() {
        let var = Arc::new(LevelVar::new(Level::Debug));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let var = var.clone();
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        let seen = var.get();
                        assert!(seen == Level::Debug || seen == Level::Error);
                    }
                })
            })
            .collect();

        for i in 0..10_000 {
            var.set(if i % 2 == 0 { Level::Error } else { Level::Debug });
        }

        for r in readers {
            r.join().unwrap();
        }
    }
}
