//! Positional record marshalling.
//!
//! A record crosses the wire as the ordered list of its fields. Field `i`
//! of the list is field `i` of the declaration on both ends; renaming a
//! field is safe, reordering or removing one is not.

use crate::error::{DecodeError, Result};
use crate::value::{FromValue, RecordValue, Value};

/// A user-defined record type with a fixed positional layout.
pub trait Record: Sized {
    /// Declared name; also the key the extended codec assigns a tag to.
    const NAME: &'static str;

    /// Fields in declared order. Absent nullable fields are `Value::Null`,
    /// enums are their ordinal.
    fn to_list(&self) -> Vec<Value>;

    /// Rebuild the record from its positional fields.
    fn from_list(list: Vec<Value>) -> Result<Self>;

    /// The record as a tagged [`Value`].
    fn to_value(&self) -> Value {
        Value::Record(RecordValue::new(Self::NAME, self.to_list()))
    }
}

/// An enum carried on the wire as its ordinal.
pub trait WireEnum: Sized + Copy + 'static {
    const NAME: &'static str;

    /// All variants, indexed by ordinal.
    const VARIANTS: &'static [Self];

    fn ordinal(self) -> i64;

    fn from_ordinal(ordinal: i64) -> Result<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|idx| Self::VARIANTS.get(idx).copied())
            .ok_or(DecodeError::EnumOutOfRange {
                name: Self::NAME,
                ordinal,
                count: Self::VARIANTS.len(),
                context: None,
            })
    }
}

/// Cast a value into a record.
///
/// Accepts a tagged record of the same name, or a bare field list (the form
/// a record takes when nested inside another record's fields).
pub fn record_from_value<R: Record>(value: Value) -> Result<R> {
    match value {
        Value::Record(record) if record.name == R::NAME => R::from_list(record.fields),
        Value::Record(record) => Err(DecodeError::RecordMismatch {
            expected: R::NAME,
            found: record.name,
        }),
        Value::List(fields) => R::from_list(fields),
        other => Err(DecodeError::mismatch(R::NAME, other.kind_name())),
    }
}

/// Implements [`FromValue`](crate::FromValue) and `From<T> for Value` for a
/// [`Record`] type.
#[macro_export]
macro_rules! impl_record_value {
    ($ty:ty) => {
        impl $crate::FromValue for $ty {
            const EXPECTED: &'static str = <$ty as $crate::Record>::NAME;

            fn from_value(value: $crate::Value) -> $crate::error::Result<Self> {
                $crate::record::record_from_value(value)
            }
        }

        impl From<$ty> for $crate::Value {
            fn from(record: $ty) -> Self {
                $crate::Record::to_value(&record)
            }
        }
    };
}

/// Sequential reader over a record's positional fields.
pub struct Fields {
    owner: &'static str,
    items: std::vec::IntoIter<Value>,
    index: usize,
}

impl Fields {
    pub fn new(owner: &'static str, list: Vec<Value>) -> Self {
        Self {
            owner,
            items: list.into_iter(),
            index: 0,
        }
    }

    fn next_slot(&mut self) -> (usize, Option<Value>) {
        let index = self.index;
        self.index += 1;
        (index, self.items.next())
    }

    fn context(&self, field: &'static str) -> String {
        format!("{}.{}", self.owner, field)
    }

    /// A field that must be present and non-null.
    pub fn required<T: FromValue>(&mut self, field: &'static str) -> Result<T> {
        let (index, slot) = self.next_slot();
        let value = slot.ok_or(DecodeError::MissingField {
            owner: self.owner,
            field,
            index,
        })?;
        T::from_value(value).map_err(|err| err.in_context(self.context(field)))
    }

    /// A field that decodes to `None` when absent or null.
    pub fn nullable<T: FromValue>(&mut self, field: &'static str) -> Result<Option<T>> {
        match self.next_slot() {
            (_, None) | (_, Some(Value::Null)) => Ok(None),
            (_, Some(value)) => T::from_value(value)
                .map(Some)
                .map_err(|err| err.in_context(self.context(field))),
        }
    }

    pub fn required_enum<E: WireEnum>(&mut self, field: &'static str) -> Result<E> {
        let ordinal: i64 = self.required(field)?;
        E::from_ordinal(ordinal).map_err(|err| err.in_context(self.context(field)))
    }

    pub fn nullable_enum<E: WireEnum>(&mut self, field: &'static str) -> Result<Option<E>> {
        self.nullable::<i64>(field)?
            .map(E::from_ordinal)
            .transpose()
            .map_err(|err| err.in_context(self.context(field)))
    }
}
