use bytes::{Buf, Bytes};

use crate::error::{DecodeError, EncodeError, Result};
use crate::reader::ValueReader;
use crate::tag;
use crate::value::Value;
use crate::writer::ValueWriter;

/// Default maximum message size: 16 MiB.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Default maximum container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits applied by a codec instance.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Maximum encoded message size in bytes. Default: 16 MiB.
    pub max_message_size: usize,
    /// Maximum nesting of lists, maps and records. Default: 64.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A message codec.
///
/// Implementors override [`write_value`](ValueCodec::write_value) and
/// [`read_value_of_type`](ValueCodec::read_value_of_type) to add kinds and
/// fall back to [`write_standard_value`] / [`read_standard_value_of_type`]
/// for everything else. Nested values always recurse through `self`, so an
/// override also applies inside lists and maps.
pub trait ValueCodec: Send + Sync {
    /// Limits for this codec instance.
    fn config(&self) -> &CodecConfig;

    /// Write a tag byte and payload for `value`.
    fn write_value(
        &self,
        writer: &mut ValueWriter,
        value: &Value,
    ) -> std::result::Result<(), EncodeError> {
        write_standard_value(self, writer, value)
    }

    /// Read the payload of a value whose tag byte has already been consumed.
    fn read_value_of_type(&self, type_tag: u8, reader: &mut ValueReader) -> Result<Value> {
        read_standard_value_of_type(self, type_tag, reader)
    }

    /// Read one tagged value.
    fn read_value(&self, reader: &mut ValueReader) -> Result<Value> {
        let type_tag = reader.read_u8()?;
        self.read_value_of_type(type_tag, reader)
    }

    /// Encode a complete message.
    fn encode_message(&self, value: &Value) -> std::result::Result<Bytes, EncodeError> {
        let mut writer = ValueWriter::new(self.config());
        self.write_value(&mut writer, value)?;
        writer.finish()
    }

    /// Decode a complete message holding exactly one value.
    fn decode_message(&self, message: Bytes) -> Result<Value> {
        let max = self.config().max_message_size;
        if message.len() > max {
            return Err(DecodeError::MessageTooLarge {
                size: message.len(),
                max,
            });
        }
        let mut reader = ValueReader::new(message, self.config());
        let value = self.read_value(&mut reader)?;
        if reader.remaining() > 0 {
            return Err(DecodeError::TrailingBytes(reader.remaining()));
        }
        Ok(value)
    }
}

/// The base codec: primitive and container kinds only.
///
/// Writing a [`Value::Record`] fails because no record tags are known.
#[derive(Debug, Clone, Default)]
pub struct StandardCodec {
    config: CodecConfig,
}

impl StandardCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }
}

impl ValueCodec for StandardCodec {
    fn config(&self) -> &CodecConfig {
        &self.config
    }
}

/// Base encoding of every non-record kind.
///
/// ```text
/// ┌──────────┬──────────────────────────────────────────────┐
/// │ Tag (1B) │ Payload                                      │
/// ├──────────┼──────────────────────────────────────────────┤
/// │ 0/1/2    │ none (null / true / false)                   │
/// │ 3        │ i32 LE                                       │
/// │ 4        │ i64 LE                                       │
/// │ 6        │ pad to 8, f64 LE                             │
/// │ 7 / 8    │ size, raw bytes                              │
/// │ 9        │ size, pad to 4, i32 LE × n                   │
/// │ 10 / 11  │ size, pad to 8, i64 / f64 LE × n             │
/// │ 12       │ size, value × n                              │
/// │ 13       │ size, (key, value) × n                       │
/// └──────────┴──────────────────────────────────────────────┘
/// ```
pub fn write_standard_value<C: ValueCodec + ?Sized>(
    codec: &C,
    writer: &mut ValueWriter,
    value: &Value,
) -> std::result::Result<(), EncodeError> {
    match value {
        Value::Null => writer.put_u8(tag::NULL),
        Value::Bool(true) => writer.put_u8(tag::TRUE),
        Value::Bool(false) => writer.put_u8(tag::FALSE),
        Value::Int(n) => match i32::try_from(*n) {
            Ok(small) => {
                writer.put_u8(tag::INT32);
                writer.put_i32(small);
            }
            Err(_) => {
                writer.put_u8(tag::INT64);
                writer.put_i64(*n);
            }
        },
        Value::Float(f) => {
            writer.put_u8(tag::FLOAT64);
            writer.align(8);
            writer.put_f64(*f);
        }
        Value::String(s) => {
            writer.put_u8(tag::STRING);
            writer.put_size(s.len(), "string")?;
            writer.put_slice(s.as_bytes());
        }
        Value::Bytes(b) => {
            writer.put_u8(tag::BYTES);
            writer.put_size(b.len(), "bytes")?;
            writer.put_slice(b);
        }
        Value::Int32Array(items) => {
            writer.put_u8(tag::INT32_ARRAY);
            writer.put_size(items.len(), "int32 array")?;
            writer.align(4);
            items.iter().for_each(|n| writer.put_i32(*n));
        }
        Value::Int64Array(items) => {
            writer.put_u8(tag::INT64_ARRAY);
            writer.put_size(items.len(), "int64 array")?;
            writer.align(8);
            items.iter().for_each(|n| writer.put_i64(*n));
        }
        Value::Float64Array(items) => {
            writer.put_u8(tag::FLOAT64_ARRAY);
            writer.put_size(items.len(), "float64 array")?;
            writer.align(8);
            items.iter().for_each(|n| writer.put_f64(*n));
        }
        Value::List(items) => {
            writer.put_u8(tag::LIST);
            writer.put_size(items.len(), "list")?;
            writer.enter()?;
            for item in items {
                codec.write_value(writer, item)?;
            }
            writer.leave();
        }
        Value::Map(pairs) => {
            writer.put_u8(tag::MAP);
            writer.put_size(pairs.len(), "map")?;
            writer.enter()?;
            for (key, item) in pairs {
                codec.write_value(writer, key)?;
                codec.write_value(writer, item)?;
            }
            writer.leave();
        }
        Value::Record(record) => {
            return Err(EncodeError::UnregisteredRecord(record.name.to_string()));
        }
    }
    Ok(())
}

/// Base decoding for tags 0-127. Any other tag is [`DecodeError::UnknownTag`].
pub fn read_standard_value_of_type<C: ValueCodec + ?Sized>(
    codec: &C,
    type_tag: u8,
    reader: &mut ValueReader,
) -> Result<Value> {
    let value = match type_tag {
        tag::NULL => Value::Null,
        tag::TRUE => Value::Bool(true),
        tag::FALSE => Value::Bool(false),
        tag::INT32 => Value::Int(i64::from(reader.read_i32()?)),
        tag::INT64 => Value::Int(reader.read_i64()?),
        tag::FLOAT64 => {
            reader.skip_alignment(8)?;
            Value::Float(reader.read_f64()?)
        }
        tag::STRING => {
            let len = reader.read_size()?;
            let offset = reader.position();
            let raw = reader.take_counted(len, 1, "string")?;
            let s = std::str::from_utf8(&raw).map_err(|_| DecodeError::InvalidUtf8 { offset })?;
            Value::String(s.to_string())
        }
        tag::BYTES => {
            let len = reader.read_size()?;
            Value::Bytes(reader.take_counted(len, 1, "bytes")?)
        }
        tag::INT32_ARRAY => {
            let count = reader.read_size()?;
            reader.skip_alignment(4)?;
            let mut raw = reader.take_counted(count, 4, "int32 array")?;
            Value::Int32Array((0..count).map(|_| raw.get_i32_le()).collect())
        }
        tag::INT64_ARRAY => {
            let count = reader.read_size()?;
            reader.skip_alignment(8)?;
            let mut raw = reader.take_counted(count, 8, "int64 array")?;
            Value::Int64Array((0..count).map(|_| raw.get_i64_le()).collect())
        }
        tag::FLOAT64_ARRAY => {
            let count = reader.read_size()?;
            reader.skip_alignment(8)?;
            let mut raw = reader.take_counted(count, 8, "float64 array")?;
            Value::Float64Array((0..count).map(|_| raw.get_f64_le()).collect())
        }
        tag::LIST => {
            let count = reader.read_size()?;
            reader.check_count(count, 1, "list")?;
            reader.enter()?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(codec.read_value(reader)?);
            }
            reader.leave();
            Value::List(items)
        }
        tag::MAP => {
            let count = reader.read_size()?;
            reader.check_count(count, 2, "map")?;
            reader.enter()?;
            let mut pairs = Vec::with_capacity(count);
            for _ in 0..count {
                let key = codec.read_value(reader)?;
                let item = codec.read_value(reader)?;
                pairs.push((key, item));
            }
            reader.leave();
            Value::Map(pairs)
        }
        unknown => {
            return Err(DecodeError::UnknownTag {
                tag: unknown,
                offset: reader.position().saturating_sub(1),
            })
        }
    };
    Ok(value)
}
