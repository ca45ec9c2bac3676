use std::backtrace::Backtrace;
use std::fmt;

use bridgewire_codec::{DecodeError, EncodeError};

use crate::envelope::ErrorEnvelope;

/// A business error returned by a handler; sent to the caller as an error
/// envelope.
///
/// Any `std::error::Error` converts with `?`: the code is the error's type
/// name, the message its `Display`, and the details carry its source and a
/// captured backtrace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl HandlerError {
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

    /// Error to reply with when a nested call fails. A remote error
    /// envelope passes through unchanged.
    pub fn relay(err: CallError) -> Self {
        match err {
            CallError::Remote(envelope) => Self {
                code: envelope.code,
                message: envelope.message,
                details: envelope.details,
            },
            other => Self::from(other),
        }
    }

    pub fn into_envelope(self) -> ErrorEnvelope {
        ErrorEnvelope {
            code: self.code,
            message: self.message,
            details: self.details,
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl<E: std::error::Error> From<E> for HandlerError {
    fn from(err: E) -> Self {
        let cause = err
            .source()
            .map_or_else(|| "null".to_string(), |source| source.to_string());
        Self {
            code: short_type_name::<E>().to_string(),
            message: err.to_string(),
            details: Some(format!("Cause: {cause}, Trace: {}", Backtrace::capture())),
        }
    }
}

impl From<HandlerError> for ErrorEnvelope {
    fn from(err: HandlerError) -> Self {
        err.into_envelope()
    }
}

/// Last path segment of a type name, without generic arguments.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Errors surfaced to the caller of a remote method.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// Nothing is bound to the channel; the reply was empty.
    #[error("no handler bound to channel {0}")]
    ChannelUnavailable(String),

    /// The handler replied with an error envelope.
    #[error("remote error {0}")]
    Remote(ErrorEnvelope),

    /// The reply could not be decoded or did not have the expected type.
    #[error("failed to decode reply: {0}")]
    Decode(#[from] DecodeError),

    /// The arguments could not be encoded.
    #[error("failed to encode arguments: {0}")]
    Encode(#[from] EncodeError),

    /// The reply callback was dropped without being invoked.
    #[cfg(feature = "async")]
    #[error("call abandoned before a reply arrived")]
    Abandoned,
}

pub type Result<T> = std::result::Result<T, CallError>;
