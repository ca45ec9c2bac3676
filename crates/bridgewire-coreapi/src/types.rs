//! Records and enums carried by the core API.

use bridgewire_codec::{
    impl_record_value, CodecConfig, DecodeError, ExtendedCodec, Fields, Record, RegistryError,
    Value, WireEnum,
};
use bytes::Bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnEnum {
    One,
    Two,
    Three,
}

impl WireEnum for AnEnum {
    const NAME: &'static str = "AnEnum";
    const VARIANTS: &'static [Self] = &[AnEnum::One, AnEnum::Two, AnEnum::Three];

    fn ordinal(self) -> i64 {
        self as i64
    }
}

/// One non-null value of every kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AllTypes {
    pub a_bool: bool,
    pub an_int: i64,
    pub a_double: f64,
    pub a_string: String,
    pub a_byte_array: Bytes,
    pub a4_byte_array: Vec<i32>,
    pub a8_byte_array: Vec<i64>,
    pub a_float_array: Vec<f64>,
    pub a_list: Vec<Value>,
    pub a_map: Vec<(Value, Value)>,
    pub an_enum: AnEnum,
}

impl Record for AllTypes {
    const NAME: &'static str = "AllTypes";

    fn to_list(&self) -> Vec<Value> {
        vec![
            Value::Bool(self.a_bool),
            Value::Int(self.an_int),
            Value::Float(self.a_double),
            Value::String(self.a_string.clone()),
            Value::Bytes(self.a_byte_array.clone()),
            Value::Int32Array(self.a4_byte_array.clone()),
            Value::Int64Array(self.a8_byte_array.clone()),
            Value::Float64Array(self.a_float_array.clone()),
            Value::List(self.a_list.clone()),
            Value::Map(self.a_map.clone()),
            Value::Int(self.an_enum.ordinal()),
        ]
    }

    fn from_list(list: Vec<Value>) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(Self::NAME, list);
        Ok(Self {
            a_bool: fields.required("aBool")?,
            an_int: fields.required("anInt")?,
            a_double: fields.required("aDouble")?,
            a_string: fields.required("aString")?,
            a_byte_array: fields.required("aByteArray")?,
            a4_byte_array: fields.required("a4ByteArray")?,
            a8_byte_array: fields.required("a8ByteArray")?,
            a_float_array: fields.required("aFloatArray")?,
            a_list: fields.required("aList")?,
            a_map: fields.required("aMap")?,
            an_enum: fields.required_enum("anEnum")?,
        })
    }
}

impl_record_value!(AllTypes);

/// Every kind again, each one optional, plus nested containers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllNullableTypes {
    pub a_nullable_bool: Option<bool>,
    pub a_nullable_int: Option<i64>,
    pub a_nullable_double: Option<f64>,
    pub a_nullable_string: Option<String>,
    pub a_nullable_byte_array: Option<Bytes>,
    pub a_nullable4_byte_array: Option<Vec<i32>>,
    pub a_nullable8_byte_array: Option<Vec<i64>>,
    pub a_nullable_float_array: Option<Vec<f64>>,
    pub a_nullable_list: Option<Vec<Value>>,
    pub a_nullable_map: Option<Vec<(Value, Value)>>,
    pub nullable_nested_list: Option<Vec<Value>>,
    pub nullable_map_with_annotations: Option<Vec<(Value, Value)>>,
    pub nullable_map_with_object: Option<Vec<(Value, Value)>>,
    pub a_nullable_enum: Option<AnEnum>,
}

impl Record for AllNullableTypes {
    const NAME: &'static str = "AllNullableTypes";

    fn to_list(&self) -> Vec<Value> {
        vec![
            Value::from(self.a_nullable_bool),
            Value::from(self.a_nullable_int),
            Value::from(self.a_nullable_double),
            Value::from(self.a_nullable_string.clone()),
            Value::from(self.a_nullable_byte_array.clone()),
            Value::from(self.a_nullable4_byte_array.clone()),
            Value::from(self.a_nullable8_byte_array.clone()),
            Value::from(self.a_nullable_float_array.clone()),
            Value::from(self.a_nullable_list.clone()),
            Value::from(self.a_nullable_map.clone()),
            Value::from(self.nullable_nested_list.clone()),
            Value::from(self.nullable_map_with_annotations.clone()),
            Value::from(self.nullable_map_with_object.clone()),
            Value::from(self.a_nullable_enum.map(WireEnum::ordinal)),
        ]
    }

    fn from_list(list: Vec<Value>) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(Self::NAME, list);
        Ok(Self {
            a_nullable_bool: fields.nullable("aNullableBool")?,
            a_nullable_int: fields.nullable("aNullableInt")?,
            a_nullable_double: fields.nullable("aNullableDouble")?,
            a_nullable_string: fields.nullable("aNullableString")?,
            a_nullable_byte_array: fields.nullable("aNullableByteArray")?,
            a_nullable4_byte_array: fields.nullable("aNullable4ByteArray")?,
            a_nullable8_byte_array: fields.nullable("aNullable8ByteArray")?,
            a_nullable_float_array: fields.nullable("aNullableFloatArray")?,
            a_nullable_list: fields.nullable("aNullableList")?,
            a_nullable_map: fields.nullable("aNullableMap")?,
            nullable_nested_list: fields.nullable("nullableNestedList")?,
            nullable_map_with_annotations: fields.nullable("nullableMapWithAnnotations")?,
            nullable_map_with_object: fields.nullable("nullableMapWithObject")?,
            a_nullable_enum: fields.nullable_enum("aNullableEnum")?,
        })
    }
}

impl_record_value!(AllNullableTypes);

/// Wraps [`AllNullableTypes`] to exercise a record nested in a record.
///
/// The inner record travels as its bare field list, not as a tagged record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllNullableTypesWrapper {
    pub values: AllNullableTypes,
}

impl Record for AllNullableTypesWrapper {
    const NAME: &'static str = "AllNullableTypesWrapper";

    fn to_list(&self) -> Vec<Value> {
        vec![Value::List(self.values.to_list())]
    }

    fn from_list(list: Vec<Value>) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(Self::NAME, list);
        Ok(Self {
            values: fields.required("values")?,
        })
    }
}

impl_record_value!(AllNullableTypesWrapper);

/// The codec shared by every core API channel.
///
/// Declaration order fixes the tags: `AllNullableTypes` 128,
/// `AllNullableTypesWrapper` 129, `AllTypes` 130.
pub fn core_api_codec(config: CodecConfig) -> Result<ExtendedCodec, RegistryError> {
    ExtendedCodec::builder()
        .config(config)
        .record::<AllNullableTypes>()
        .record::<AllNullableTypesWrapper>()
        .record::<AllTypes>()
        .build()
}
