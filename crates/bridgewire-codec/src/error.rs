/// Errors raised while decoding a message.
///
/// A decode error is never recovered inside the codec; it propagates to
/// whoever asked for the message to be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The tag byte does not name a known value kind.
    #[error("unknown type tag {tag} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    /// The message ended before the current value was complete.
    #[error("truncated message: needed {needed} bytes at offset {offset}, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A length prefix claims more elements than the buffer can hold.
    #[error("{kind} count {count} overruns message ({remaining} bytes remaining)")]
    CountOverrun {
        kind: &'static str,
        count: usize,
        remaining: usize,
    },

    /// String payload is not valid UTF-8.
    #[error("invalid utf-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// Containers nest deeper than the configured limit.
    #[error("nesting depth exceeds {max}")]
    DepthExceeded { max: usize },

    /// Message is larger than the configured limit.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// Bytes remain after the single top-level value.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// A value had a different kind than the position requires.
    #[error("expected {expected}, found {found}{}", context_suffix(.context))]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        context: Option<String>,
    },

    /// A required positional slot is absent.
    #[error("missing field {index} ({field}) of {owner}")]
    MissingField {
        owner: &'static str,
        field: &'static str,
        index: usize,
    },

    /// Enum ordinal outside the declared range.
    #[error("{name} ordinal {ordinal} out of range 0..{count}{}", context_suffix(.context))]
    EnumOutOfRange {
        name: &'static str,
        ordinal: i64,
        count: usize,
        context: Option<String>,
    },

    /// A record value carried a different record name than requested.
    #[error("expected record {expected}, found {found}")]
    RecordMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl DecodeError {
    /// Shorthand for a kind mismatch without positional context.
    pub fn mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch {
            expected,
            found,
            context: None,
        }
    }

    /// Attach a position description (e.g. `"AllTypes.aBool"`) to a mismatch
    /// or an out-of-range enum ordinal.
    pub fn in_context(self, context: impl Into<String>) -> Self {
        match self {
            Self::TypeMismatch {
                expected,
                found,
                context: None,
            } => Self::TypeMismatch {
                expected,
                found,
                context: Some(context.into()),
            },
            Self::EnumOutOfRange {
                name,
                ordinal,
                count,
                context: None,
            } => Self::EnumOutOfRange {
                name,
                ordinal,
                count,
                context: Some(context.into()),
            },
            other => other,
        }
    }
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(ctx) => format!(" at {ctx}"),
        None => String::new(),
    }
}

/// Errors raised while encoding a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A string, buffer or container is too long for the size prefix.
    #[error("{kind} too large for wire size prefix ({len} elements)")]
    TooLarge { kind: &'static str, len: usize },

    /// The codec has no tag for this record type.
    #[error("record type {0} is not registered with this codec")]
    UnregisteredRecord(String),

    /// Containers nest deeper than the configured limit.
    #[error("nesting depth exceeds {max}")]
    DepthExceeded { max: usize },

    /// The encoded message is larger than the configured limit.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

/// Errors raised while building an extended codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The same record name was declared twice.
    #[error("record type {0} declared more than once")]
    DuplicateRecord(&'static str),

    /// More record types than the custom tag range can hold.
    #[error("too many record types ({count}, max {max})")]
    TagRangeExhausted { count: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
