/// Boolean tag, -126
pub(crate) const TAG_BOOLEAN: i8 = -126;
/// Byte blob tag, -125
pub(crate) const TAG_BYTES: i8 = -125;
/// Datetime tag, -124
pub(crate) const TAG_DATETIME: i8 = -124;
/// Double tag, -123
pub(crate) const TAG_DOUBLE: i8 = -123;
/// 32-bit integer tag, -122
pub(crate) const TAG_INT: i8 = -122;
/// 64-bit integer tag, -121
pub(crate) const TAG_LONG: i8 = -121;
/// Unordered map tag, -120
pub(crate) const TAG_MAP: i8 = -120;
/// [`Value::Null`](crate::Value::Null) tag, -119
pub(crate) const TAG_NULL: i8 = -119;
/// Sorted map tag, -118
pub(crate) const TAG_SORTED_MAP: i8 = -118;
/// Text tag, -117
pub(crate) const TAG_TEXT: i8 = -117;
/// Tuple tag, -116
pub(crate) const TAG_TUPLE: i8 = -116;

/// Largest number of dynamic tags a single registry can hand out.
pub const MAX_DYNAMIC_TAGS: u8 = i8::max_value() as u8;

/// Longest encoded type name, in bytes.
pub(crate) const MAX_UTF_LEN: usize = u16::max_value() as usize;

/// Single-byte varints cover `VINT_MIN..=127`.
pub(crate) const VINT_MIN: i64 = -112;
/// Length markers below this one flag negative varints.
pub(crate) const VINT_NEG_MARKER: i8 = -120;

/// Deepest nesting of maps and tuples a decoder accepts.
pub const MAX_NESTING: usize = 64;
