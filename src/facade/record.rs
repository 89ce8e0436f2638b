//! Log records and their attributes.

use std::error::Error as StdError;
use std::fmt;
use std::time::SystemTime;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::facade::callsite::CallSite;
use crate::facade::level::Level;

/// Attribute value attached to a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// An error rendered together with its `source()` chain.
    Error(String),
    /// Any other value, rendered with `{:?}`.
    Debug(String),
}

impl Value {
    pub fn error<E>(err: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        let mut rendered = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        Value::Error(rendered)
    }

    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Value::Debug(format!("{:?}", value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Error(s) | Value::Debug(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) | Value::Error(s) | Value::Debug(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Uint(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Strings and rendered values serialize as JSON strings; numbers and
/// booleans keep their type.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Str(s) | Value::Error(s) | Value::Debug(s) => serializer.serialize_str(s),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Uint(v) => serializer.serialize_u64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )*
    };
}

impl_from_int!(Int, i64: i8, i16, i32, i64, isize);
impl_from_int!(Uint, u64: u8, u16, u32, u64, usize);

/// Key/value pair attached to a record.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Serializes a list of attributes as one map, keys in insertion order.
pub struct AttrMap<'a>(pub &'a [Attr]);

impl Serialize for AttrMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for attr in self.0 {
            map.serialize_entry(&attr.key, &attr.value)?;
        }
        map.end()
    }
}

/// Builds an ordered `Vec<Attr>` from `key => value` pairs.
///
/// ```
/// let attrs = recoverlog::attrs!["user" => "alice", "attempt" => 3];
/// assert_eq!(attrs.len(), 2);
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        ::std::vec::Vec::<$crate::Attr>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Attr::new($key, $value)),+]
    };
}

/// A single log event. Built once per log call and handed to the sink by
/// reference.
#[derive(Debug, Clone)]
pub struct LogRecord {
    timestamp: SystemTime,
    level: Level,
    message: String,
    attrs: Vec<Attr>,
    call_site: Option<CallSite>,
}

impl LogRecord {
    pub fn new(
        level: Level,
        message: impl Into<String>,
        attrs: Vec<Attr>,
        call_site: Option<CallSite>,
    ) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level,
            message: message.into(),
            attrs,
            call_site,
        }
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub fn call_site(&self) -> Option<&CallSite> {
        self.call_site.as_ref()
    }

    /// First attribute with the given key.
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.iter().find(|a| a.key == key).map(|a| &a.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("reading config")
        }
    }

    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_error_value_includes_source_chain() {
        let err = Outer(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"));
        assert_eq!(
            Value::error(&err),
            Value::Error("reading config: no such file".into())
        );
    }

    #[test]
    fn test_attrs_macro_keeps_order() {
        let attrs = attrs!["b" => 1, "a" => "x", "c" => true];
        let keys: Vec<_> = attrs.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["b", "a", "c"]);
        assert_eq!(attrs[0].value, Value::Int(1));
        assert_eq!(attrs[2].to_string(), "c=true");
    }

    #[test]
    fn test_record_attr_lookup() {
        let record = LogRecord::new(Level::Info, "hello", attrs!["k" => "v"], None);
        assert_eq!(record.attr("k").and_then(Value::as_str), Some("v"));
        assert!(record.attr("missing").is_none());
        assert!(record.call_site().is_none());
    }
}
