use bridgewire_codec::{DecodeError, FromValue, Value};

/// Positional decoding of a request's argument list.
///
/// The request body is a list of arguments, or null when the method takes
/// none. Arguments beyond the handler's arity are ignored; missing trailing
/// arguments read as null, so nullable parameters decode to `None`.
pub trait FromArgs: Sized {
    fn from_args(args: Value) -> Result<Self, DecodeError>;
}

fn arg_list(args: Value) -> Result<Vec<Value>, DecodeError> {
    match args {
        Value::Null => Ok(Vec::new()),
        Value::List(items) => Ok(items),
        other => Err(DecodeError::mismatch("argument list", other.kind_name())),
    }
}

fn next_arg<T: FromValue>(
    items: &mut std::vec::IntoIter<Value>,
    index: usize,
) -> Result<T, DecodeError> {
    T::from_value(items.next().unwrap_or_default())
        .map_err(|err| err.in_context(format!("argument {index}")))
}

impl FromArgs for () {
    fn from_args(args: Value) -> Result<Self, DecodeError> {
        arg_list(args).map(|_| ())
    }
}

macro_rules! tuple_from_args {
    ($($ty:ident => $idx:literal),+) => {
        impl<$($ty: FromValue),+> FromArgs for ($($ty,)+) {
            fn from_args(args: Value) -> Result<Self, DecodeError> {
                let mut items = arg_list(args)?.into_iter();
                Ok(($(next_arg::<$ty>(&mut items, $idx)?,)+))
            }
        }
    };
}

tuple_from_args!(A => 0);
tuple_from_args!(A => 0, B => 1);
tuple_from_args!(A => 0, B => 1, C => 2);
tuple_from_args!(A => 0, B => 1, C => 2, D => 3);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_args_accepts_null_or_empty_list() {
        assert!(<()>::from_args(Value::Null).is_ok());
        assert!(<()>::from_args(Value::List(vec![])).is_ok());
        assert!(<()>::from_args(Value::Int(1)).is_err());
    }

    #[test]
    fn positional_decode() {
        let args = Value::List(vec![Value::Int(3), Value::from("x")]);
        let (n, s) = <(i64, String)>::from_args(args).unwrap();
        assert_eq!((n, s.as_str()), (3, "x"));
    }

    #[test]
    fn missing_nullable_is_none() {
        let args = Value::List(vec![Value::Int(3)]);
        let (n, s) = <(i64, Option<String>)>::from_args(args).unwrap();
        assert_eq!(n, 3);
        assert_eq!(s, None);
    }

    #[test]
    fn missing_required_is_error_with_position() {
        let err = <(i64, String)>::from_args(Value::List(vec![Value::Int(3)])).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TypeMismatch {
                expected: "string",
                found: "null",
                context: Some("argument 1".to_string())
            }
        );
    }

    #[test]
    fn extra_args_ignored() {
        let args = Value::List(vec![Value::Bool(true), Value::Int(9)]);
        let (b,) = <(bool,)>::from_args(args).unwrap();
        assert!(b);
    }
}
