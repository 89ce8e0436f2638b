//! Error view of arbitrary panic payloads.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::sync::Mutex;

use crate::facade::record::Value;
use crate::recovery::checked::{BoxError, CheckedPanic};

/// An arbitrary panic payload wrapped as an error.
///
/// Built only on request through [`ForeignPanic::wrap`] or
/// [`ForeignPanic::from_payload`]; recovery boundaries never wrap on their own.
pub struct ForeignPanic {
    origin: Mutex<Box<dyn Any + Send>>,
    message: String,
}

impl ForeignPanic {
    pub fn wrap<T: Any + Send>(obj: T) -> Self {
        Self::from_payload(Box::new(obj))
    }

    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = describe_payload(&*payload);
        Self {
            origin: Mutex::new(payload),
            message,
        }
    }

    /// Run `f` against the original payload.
    pub fn with_origin<R>(&self, f: impl FnOnce(&(dyn Any + Send)) -> R) -> R {
        let origin = self.origin.lock().unwrap_or_else(|p| p.into_inner());
        f(&**origin)
    }

    pub fn into_origin(self) -> Box<dyn Any + Send> {
        self.origin.into_inner().unwrap_or_else(|p| p.into_inner())
    }
}

impl fmt::Display for ForeignPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for ForeignPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignPanic")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl StdError for ForeignPanic {}

type BoxSendError = Box<dyn StdError + Send>;

/// Downcasts `payload` to each listed type in turn and maps the first hit.
macro_rules! primitive_payload {
    ($payload:expr, $v:ident => $map:expr; $($ty:ty),+) => {
        $(
            if let Some($v) = $payload.downcast_ref::<$ty>() {
                return Some($map);
            }
        )+
    };
}

fn primitive_value(payload: &(dyn Any + Send)) -> Option<Value> {
    primitive_payload!(payload, v => Value::Int(*v as i64); i8, i16, i32, i64, isize);
    primitive_payload!(payload, v => Value::Uint(*v as u64); u8, u16, u32, u64, usize);
    primitive_payload!(payload, v => Value::Float(*v as f64); f32, f64);
    primitive_payload!(payload, v => Value::Bool(*v); bool);
    primitive_payload!(payload, v => Value::Str(v.to_string()); char, i128, u128);
    None
}

/// Human-readable text for a panic payload.
///
/// Strings, errors and primitive values are rendered as themselves. Any
/// other type cannot be formatted through `dyn Any`; it is reported with its
/// `TypeId`, so two different payload types never read the same.
pub fn describe_payload(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(err) = payload.downcast_ref::<BoxError>() {
        err.to_string()
    } else if let Some(err) = payload.downcast_ref::<BoxSendError>() {
        err.to_string()
    } else if let Some(err) = payload.downcast_ref::<io::Error>() {
        err.to_string()
    } else if let Some(checked) = payload.downcast_ref::<CheckedPanic>() {
        checked.to_string()
    } else if let Some(value) = primitive_value(payload) {
        value.to_string()
    } else {
        format!("panic payload of unknown type {:?}", payload.type_id())
    }
}

/// Attribute value for a panic payload: errors keep their source chain and
/// primitives keep their type.
pub(crate) fn payload_value(payload: &(dyn Any + Send)) -> Value {
    if let Some(err) = payload.downcast_ref::<BoxError>() {
        Value::error(&**err)
    } else if let Some(err) = payload.downcast_ref::<BoxSendError>() {
        Value::error(&**err)
    } else if let Some(err) = payload.downcast_ref::<io::Error>() {
        Value::error(err)
    } else if let Some(value) = primitive_value(payload) {
        value
    } else {
        Value::Str(describe_payload(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_common_payloads() {
        assert_eq!(describe_payload(&"boom"), "boom");
        assert_eq!(describe_payload(&String::from("owned")), "owned");
        assert_eq!(describe_payload(&42u8), "42");
        assert_eq!(describe_payload(&-7i32), "-7");
        assert_eq!(describe_payload(&'x'), "x");

        let err: BoxError = "boxed".into();
        assert_eq!(describe_payload(&err), "boxed");
    }

    #[test]
    fn test_payload_value_keeps_primitive_types() {
        assert_eq!(payload_value(&42i32), Value::Int(42));
        assert_eq!(payload_value(&7usize), Value::Uint(7));
        assert_eq!(payload_value(&1.5f64), Value::Float(1.5));
        assert_eq!(payload_value(&true), Value::Bool(true));

        let err: BoxSendError = Box::new(io::Error::other("send only"));
        assert_eq!(payload_value(&err), Value::Error("send only".into()));
    }

    #[test]
    fn test_unknown_payload_types_are_distinguished() {
        struct First;
        struct Second;

        let first = describe_payload(&First);
        let second = describe_payload(&Second);
        assert!(first.starts_with("panic payload of unknown type"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_wrap_keeps_origin() {
        let wrapped = ForeignPanic::wrap(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert_eq!(
            wrapped.to_string(),
            io::Error::from(io::ErrorKind::UnexpectedEof).to_string()
        );
        assert!(wrapped.with_origin(|o| o.is::<io::Error>()));

        let as_error: BoxError = Box::new(wrapped);
        assert!(as_error.downcast_ref::<ForeignPanic>().is_some());
    }
}
