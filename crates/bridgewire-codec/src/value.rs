use bytes::Bytes;

use crate::error::{DecodeError, Result};

/// Every value kind that can cross the wire.
///
/// `Map` keeps its pairs in write order. Keys are not deduplicated; the
/// codec reproduces exactly what it was given.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Bytes),
    Int32Array(Vec<i32>),
    Int64Array(Vec<i64>),
    Float64Array(Vec<f64>),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Record(RecordValue),
}

/// A record in its generic, positional form.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    /// Declared record name; the extended codec maps it to a tag.
    pub name: &'static str,
    /// Fields in declared order.
    pub fields: Vec<Value>,
}

impl RecordValue {
    pub fn new(name: &'static str, fields: Vec<Value>) -> Self {
        Self { name, fields }
    }
}

impl Value {
    /// Short name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Int32Array(_) => "int32 array",
            Value::Int64Array(_) => "int64 array",
            Value::Float64Array(_) => "float64 array",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up the first pair whose key equals `key`.
    pub fn map_get(&self, key: &Value) -> Option<&Value> {
        match self {
            Value::Map(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Positional cast to a concrete Rust type.
    pub fn cast<T: FromValue>(self) -> Result<T> {
        T::from_value(self)
    }
}

/// Conversion out of a [`Value`], failing with a [`DecodeError`] on kind mismatch.
///
/// Required positions reject `Null`; wrap the target in `Option` to accept it.
pub trait FromValue: Sized {
    /// Name of the expected kind, for error messages.
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! from_value_variant {
    ($ty:ty, $expected:literal, $variant:ident) => {
        impl FromValue for $ty {
            const EXPECTED: &'static str = $expected;

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(DecodeError::mismatch(Self::EXPECTED, other.kind_name())),
                }
            }
        }

        impl From<$ty> for Value {
            fn from(inner: $ty) -> Self {
                Value::$variant(inner)
            }
        }
    };
}

from_value_variant!(bool, "bool", Bool);
from_value_variant!(i64, "int", Int);
from_value_variant!(f64, "float64", Float);
from_value_variant!(String, "string", String);
from_value_variant!(Bytes, "bytes", Bytes);
from_value_variant!(Vec<i32>, "int32 array", Int32Array);
from_value_variant!(Vec<i64>, "int64 array", Int64Array);
from_value_variant!(Vec<f64>, "float64 array", Float64Array);
from_value_variant!(Vec<Value>, "list", List);
from_value_variant!(Vec<(Value, Value)>, "map", Map);
from_value_variant!(RecordValue, "record", Record);

impl FromValue for Value {
    const EXPECTED: &'static str = "any non-null value";

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Err(DecodeError::mismatch(Self::EXPECTED, "null")),
            other => Ok(other),
        }
    }
}

impl FromValue for () {
    const EXPECTED: &'static str = "null";

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(()),
            other => Err(DecodeError::mismatch(Self::EXPECTED, other.kind_name())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(bytes))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_position_rejects_null() {
        let err = bool::from_value(Value::Null).unwrap_err();
        assert_eq!(err, DecodeError::mismatch("bool", "null"));
    }

    #[test]
    fn optional_position_accepts_null() {
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<String>::from_value(Value::from("x")).unwrap(),
            Some("x".to_string())
        );
    }

    #[test]
    fn optional_position_still_checks_kind() {
        let err = Option::<i64>::from_value(Value::Bool(true)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TypeMismatch {
                expected: "int",
                found: "bool",
                ..
            }
        ));
    }

    #[test]
    fn any_value_rejects_only_null() {
        assert!(Value::from_value(Value::Null).is_err());
        assert_eq!(
            Value::from_value(Value::Int(3)).unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(7i64)), Value::Int(7));
        assert_eq!(Value::from(7i32), Value::Int(7));
    }

    #[test]
    fn map_lookup_uses_first_matching_key() {
        let map = Value::Map(vec![
            (Value::from("a"), Value::Int(1)),
            (Value::from("b"), Value::Int(2)),
        ]);
        assert_eq!(map.map_get(&Value::from("b")), Some(&Value::Int(2)));
        assert_eq!(map.map_get(&Value::from("c")), None);
    }
}
