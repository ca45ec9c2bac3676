//! Codec extension carrying declared record types.
//!
//! Each registered record gets the next tag from 128 upward, in declaration
//! order. A record is written as its tag followed by the base encoding of
//! its field list:
//!
//! ```text
//! ┌────────────────┬───────────┬──────────┬─────────────────────┐
//! │ Record tag (1B)│ 12 (list) │ size     │ field × n           │
//! └────────────────┴───────────┴──────────┴─────────────────────┘
//! ```
//!
//! Only the record branch is overridden; every other kind and all nested
//! values go through the base codec with this codec as the recursion target.

use tracing::debug;

use crate::codec::{
    read_standard_value_of_type, write_standard_value, CodecConfig, ValueCodec,
};
use crate::error::{DecodeError, EncodeError, RegistryError, Result};
use crate::reader::ValueReader;
use crate::record::Record;
use crate::tag;
use crate::value::{RecordValue, Value};
use crate::writer::ValueWriter;

type NormalizeFn = fn(Vec<Value>) -> Result<Vec<Value>>;

struct RecordEntry {
    name: &'static str,
    normalize: NormalizeFn,
}

fn normalize_fields<R: Record>(fields: Vec<Value>) -> Result<Vec<Value>> {
    R::from_list(fields).map(|record| record.to_list())
}

/// Builder for [`ExtendedCodec`].
#[derive(Default)]
pub struct ExtendedCodecBuilder {
    config: CodecConfig,
    entries: Vec<RecordEntry>,
}

impl ExtendedCodecBuilder {
    /// Register the next record type. Order determines the tag.
    pub fn record<R: Record>(mut self) -> Self {
        self.entries.push(RecordEntry {
            name: R::NAME,
            normalize: normalize_fields::<R>,
        });
        self
    }

    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> std::result::Result<ExtendedCodec, RegistryError> {
        if self.entries.len() > tag::MAX_CUSTOM_TAGS {
            return Err(RegistryError::TagRangeExhausted {
                count: self.entries.len(),
                max: tag::MAX_CUSTOM_TAGS,
            });
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|e| e.name == entry.name) {
                return Err(RegistryError::DuplicateRecord(entry.name));
            }
        }
        debug!(records = self.entries.len(), "extended codec built");
        Ok(ExtendedCodec {
            config: self.config,
            entries: self.entries,
        })
    }
}

/// The base codec plus a fixed, ordered set of record types.
pub struct ExtendedCodec {
    config: CodecConfig,
    entries: Vec<RecordEntry>,
}

impl ExtendedCodec {
    pub fn builder() -> ExtendedCodecBuilder {
        ExtendedCodecBuilder::default()
    }

    /// Tag assigned to the named record type.
    pub fn tag_of(&self, name: &str) -> Option<u8> {
        self.entries
            .iter()
            .position(|e| e.name == name)
            .map(|idx| tag::CUSTOM_TAG_START + idx as u8)
    }

    /// Registered record names in tag order.
    pub fn record_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    fn entry_for(&self, type_tag: u8) -> Option<&RecordEntry> {
        if !tag::is_custom(type_tag) {
            return None;
        }
        self.entries
            .get((type_tag - tag::CUSTOM_TAG_START) as usize)
    }
}

impl ValueCodec for ExtendedCodec {
    fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn write_value(
        &self,
        writer: &mut ValueWriter,
        value: &Value,
    ) -> std::result::Result<(), EncodeError> {
        let Value::Record(record) = value else {
            return write_standard_value(self, writer, value);
        };
        let record_tag = self
            .tag_of(record.name)
            .ok_or_else(|| EncodeError::UnregisteredRecord(record.name.to_string()))?;

        writer.put_u8(record_tag);
        writer.put_u8(tag::LIST);
        writer.put_size(record.fields.len(), "record")?;
        writer.enter()?;
        for field in &record.fields {
            self.write_value(writer, field)?;
        }
        writer.leave();
        Ok(())
    }

    fn read_value_of_type(&self, type_tag: u8, reader: &mut ValueReader) -> Result<Value> {
        if !tag::is_custom(type_tag) {
            return read_standard_value_of_type(self, type_tag, reader);
        }
        let offset = reader.position().saturating_sub(1);
        let entry = self
            .entry_for(type_tag)
            .ok_or(DecodeError::UnknownTag {
                tag: type_tag,
                offset,
            })?;

        let body = self.read_value(reader)?;
        let Value::List(fields) = body else {
            return Err(DecodeError::mismatch("list", body.kind_name()).in_context(entry.name));
        };
        let fields = (entry.normalize)(fields)?;
        Ok(Value::Record(RecordValue::new(entry.name, fields)))
    }
}
