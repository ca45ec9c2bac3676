//! Reply envelopes.
//!
//! Every reply body is a list whose shape tells success from failure:
//!
//! ```text
//! success   [ result ]
//! error     [ code: string, message: string, details: string | null ]
//! ```

use bridgewire_codec::{DecodeError, Value};

/// Error code sent when a request's arguments could not be decoded.
pub const DECODE_ERROR_CODE: &str = "decode-error";

/// Error code sent when a handler's result could not be encoded.
pub const ENCODE_ERROR_CODE: &str = "encode-error";

/// The error form of a reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// A decoded reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success(Value),
    Error(ErrorEnvelope),
}

impl Envelope {
    pub fn into_value(self) -> Value {
        match self {
            Envelope::Success(result) => Value::List(vec![result]),
            Envelope::Error(err) => Value::List(vec![
                Value::String(err.code),
                Value::String(err.message),
                Value::from(err.details),
            ]),
        }
    }

    /// Classify a reply by shape. Anything other than a one-element list or
    /// a well-formed three-element error list is a decode error.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let items = match value {
            Value::List(items) => items,
            other => {
                return Err(DecodeError::mismatch("envelope", other.kind_name()));
            }
        };
        match <[Value; 1]>::try_from(items) {
            Ok([result]) => Ok(Envelope::Success(result)),
            Err(items) => error_from_items(items).map(Envelope::Error),
        }
    }
}

fn error_from_items(items: Vec<Value>) -> Result<ErrorEnvelope, DecodeError> {
    let [code, message, details] = <[Value; 3]>::try_from(items)
        .map_err(|items| DecodeError::mismatch("envelope", list_shape(items.len())))?;
    let code = code
        .cast::<String>()
        .map_err(|err| err.in_context("envelope code"))?;
    let message = message
        .cast::<String>()
        .map_err(|err| err.in_context("envelope message"))?;
    let details = details
        .cast::<Option<String>>()
        .map_err(|err| err.in_context("envelope details"))?;
    Ok(ErrorEnvelope {
        code,
        message,
        details,
    })
}

fn list_shape(len: usize) -> &'static str {
    match len {
        0 => "empty list",
        2 => "two-element list",
        _ => "list of unexpected length",
    }
}
