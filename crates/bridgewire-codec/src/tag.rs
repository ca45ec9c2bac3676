//! Wire type tags.
//!
//! Tags 0-127 are reserved for the base codec.
//! Tags 128-255 are assigned to record types by the extended codec.

pub const NULL: u8 = 0;
pub const TRUE: u8 = 1;
pub const FALSE: u8 = 2;
/// Integer that fits in 32 bits.
pub const INT32: u8 = 3;
pub const INT64: u8 = 4;
pub const FLOAT64: u8 = 6;
pub const STRING: u8 = 7;
pub const BYTES: u8 = 8;
pub const INT32_ARRAY: u8 = 9;
pub const INT64_ARRAY: u8 = 10;
pub const FLOAT64_ARRAY: u8 = 11;
pub const LIST: u8 = 12;
pub const MAP: u8 = 13;

/// First tag available to record types.
pub const CUSTOM_TAG_START: u8 = 128;

/// Number of record types a single codec can carry.
pub const MAX_CUSTOM_TAGS: usize = 256 - CUSTOM_TAG_START as usize;

/// Size prefix escape: a u16 follows.
pub(crate) const SIZE_U16: u8 = 254;
/// Size prefix escape: a u32 follows.
pub(crate) const SIZE_U32: u8 = 255;

/// Returns a human-readable name for a tag byte.
pub fn tag_name(tag: u8) -> &'static str {
    match tag {
        NULL => "null",
        TRUE | FALSE => "bool",
        INT32 => "int32",
        INT64 => "int64",
        FLOAT64 => "float64",
        STRING => "string",
        BYTES => "bytes",
        INT32_ARRAY => "int32 array",
        INT64_ARRAY => "int64 array",
        FLOAT64_ARRAY => "float64 array",
        LIST => "list",
        MAP => "map",
        CUSTOM_TAG_START..=u8::MAX => "record",
        _ => "reserved",
    }
}

/// Returns true if the tag belongs to the record range.
pub fn is_custom(tag: u8) -> bool {
    tag >= CUSTOM_TAG_START
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_range_boundaries() {
        assert!(!is_custom(127));
        assert!(is_custom(128));
        assert!(is_custom(255));
        assert_eq!(MAX_CUSTOM_TAGS, 128);
    }

    #[test]
    fn names_cover_reserved_gaps() {
        assert_eq!(tag_name(5), "reserved");
        assert_eq!(tag_name(14), "reserved");
        assert_eq!(tag_name(INT32), "int32");
        assert_eq!(tag_name(200), "record");
    }
}
