//! Self-describing tagged binary value codec.
//!
//! Every value is written as a one-byte type tag followed by a payload:
//! - Little-endian fixed-width scalars, 8-byte aligned floats
//! - Variable-width size prefixes (1, 3 or 5 bytes) for strings, buffers,
//!   typed arrays, lists and maps
//! - Alignment measured from the start of the message, never the buffer
//!
//! [`StandardCodec`] handles the base kinds. [`ExtendedCodec`] adds declared
//! [`Record`] types on tags 128 and up.

pub mod codec;
pub mod error;
pub mod extended;
pub mod reader;
pub mod record;
pub mod tag;
pub mod value;
pub mod writer;

pub use codec::{
    read_standard_value_of_type, write_standard_value, CodecConfig, StandardCodec, ValueCodec,
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_MESSAGE_SIZE,
};
pub use error::{DecodeError, EncodeError, RegistryError, Result};
pub use extended::{ExtendedCodec, ExtendedCodecBuilder};
pub use reader::ValueReader;
pub use record::{record_from_value, Fields, Record, WireEnum};
pub use value::{FromValue, RecordValue, Value};
pub use writer::ValueWriter;
