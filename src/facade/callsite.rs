//! Logical caller location.
//!
//! Public entry points of the facade are `#[track_caller]`, so the location
//! seen here is the application call site no matter how many annotated
//! wrapper layers sit in between. A wrapper that is not `#[track_caller]`
//! can capture `Location::caller()` itself and thread it down with
//! [`Skip::Location`].

use std::fmt;
use std::panic::Location;
use std::path::Path;

/// Source position reported with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    /// Location of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }

    /// File name without its directories.
    pub fn basename(&self) -> &'static str {
        Path::new(self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.file)
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// How a log call determines its call site.
#[derive(Debug, Clone, Copy, Default)]
pub enum Skip {
    /// The application call site, through `#[track_caller]` propagation.
    #[default]
    Default,
    /// A location captured earlier by a wrapper layer.
    Location(&'static Location<'static>),
}

impl Skip {
    #[track_caller]
    pub fn resolve(self) -> CallSite {
        match self {
            Skip::Default => CallSite::caller(),
            Skip::Location(location) => CallSite::from_location(location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn wrapper() -> CallSite {
        inner_wrapper()
    }

    #[track_caller]
    fn inner_wrapper() -> CallSite {
        Skip::Default.resolve()
    }

    #[test]
    fn test_wrappers_report_application_call_site() {
        let expected_line = line!() + 1;
        let site = wrapper();
        assert_eq!(site.line, expected_line);
        assert_eq!(site.basename(), "callsite.rs");
    }

    #[test]
    fn test_explicit_location_is_threaded_through() {
        let captured = Location::caller();
        let site = Skip::Location(captured).resolve();
        assert_eq!(site.line, captured.line());
        assert_eq!(site.file, captured.file());
    }
}
