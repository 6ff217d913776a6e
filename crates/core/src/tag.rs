//! Typed key/value documents attached to item stacks.
//!
//! A [`TagCompound`] is the extended state a stack carries beyond its item,
//! count and damage: custom names, enchantments, attribute modifiers and so
//! on. Each value carries a stable integer type id so persisted documents can
//! be checked for shape before they are read. Keys are kept in a `BTreeMap`
//! so iteration and serialization order are deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Type id of the terminator tag (never stored).
pub const TAG_END: u8 = 0;
/// Type id of [`Tag::Byte`].
pub const TAG_BYTE: u8 = 1;
/// Type id of [`Tag::Short`].
pub const TAG_SHORT: u8 = 2;
/// Type id of [`Tag::Int`].
pub const TAG_INT: u8 = 3;
/// Type id of [`Tag::Long`].
pub const TAG_LONG: u8 = 4;
/// Type id of [`Tag::Float`].
pub const TAG_FLOAT: u8 = 5;
/// Type id of [`Tag::Double`].
pub const TAG_DOUBLE: u8 = 6;
/// Type id of [`Tag::ByteArray`].
pub const TAG_BYTE_ARRAY: u8 = 7;
/// Type id of [`Tag::String`].
pub const TAG_STRING: u8 = 8;
/// Type id of [`Tag::List`].
pub const TAG_LIST: u8 = 9;
/// Type id of [`Tag::Compound`].
pub const TAG_COMPOUND: u8 = 10;
/// Type id of [`Tag::IntArray`].
pub const TAG_INT_ARRAY: u8 = 11;
/// Type id of [`Tag::LongArray`].
pub const TAG_LONG_ARRAY: u8 = 12;
/// Pseudo type id accepted by [`TagCompound::contains`] for any numeric tag.
pub const TAG_ANY_NUMERIC: u8 = 99;

/// A single typed value inside a [`TagCompound`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Tag {
    /// Signed 8-bit integer (also used for booleans).
    Byte(i8),
    /// Signed 16-bit integer.
    Short(i16),
    /// Signed 32-bit integer.
    Int(i32),
    /// Signed 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Raw bytes.
    ByteArray(Vec<i8>),
    /// UTF-8 string.
    String(String),
    /// Homogeneous list; the element type is the type of its first entry.
    List(Vec<Tag>),
    /// Nested document.
    Compound(TagCompound),
    /// Packed 32-bit integers.
    IntArray(Vec<i32>),
    /// Packed 64-bit integers.
    LongArray(Vec<i64>),
}

impl Tag {
    /// Stable numeric type id.
    pub fn type_id(&self) -> u8 {
        match self {
            Tag::Byte(_) => TAG_BYTE,
            Tag::Short(_) => TAG_SHORT,
            Tag::Int(_) => TAG_INT,
            Tag::Long(_) => TAG_LONG,
            Tag::Float(_) => TAG_FLOAT,
            Tag::Double(_) => TAG_DOUBLE,
            Tag::ByteArray(_) => TAG_BYTE_ARRAY,
            Tag::String(_) => TAG_STRING,
            Tag::List(_) => TAG_LIST,
            Tag::Compound(_) => TAG_COMPOUND,
            Tag::IntArray(_) => TAG_INT_ARRAY,
            Tag::LongArray(_) => TAG_LONG_ARRAY,
        }
    }

    /// Element type of a list tag ([`TAG_END`] for empty lists and non-lists).
    pub fn element_type(&self) -> u8 {
        match self {
            Tag::List(items) => items.first().map(Tag::type_id).unwrap_or(TAG_END),
            _ => TAG_END,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match *self {
            Tag::Byte(v) => Some(i64::from(v)),
            Tag::Short(v) => Some(i64::from(v)),
            Tag::Int(v) => Some(i64::from(v)),
            Tag::Long(v) => Some(v),
            Tag::Float(v) => Some(v as i64),
            Tag::Double(v) => Some(v as i64),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match *self {
            Tag::Float(v) => Some(f64::from(v)),
            Tag::Double(v) => Some(v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    /// Borrow the string payload of a string tag.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the payload of a compound tag.
    pub fn as_compound(&self) -> Option<&TagCompound> {
        match self {
            Tag::Compound(c) => Some(c),
            _ => None,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            Tag::Byte(_) | Tag::Short(_) | Tag::Int(_) | Tag::Long(_) | Tag::Float(_) | Tag::Double(_)
        )
    }
}

impl From<TagCompound> for Tag {
    fn from(value: TagCompound) -> Self {
        Tag::Compound(value)
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::String(value)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::String(value.to_string())
    }
}

/// Ordered string-keyed document of [`Tag`] values.
///
/// Getters never fail: a missing key or a value of the wrong type yields the
/// type's default, which is what persisted data from older versions needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagCompound {
    entries: BTreeMap<String, Tag>,
}

impl TagCompound {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Tag>) -> Option<Tag> {
        self.entries.insert(key.into(), value.into())
    }

    /// Borrow a raw value.
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.entries.get(key)
    }

    /// Mutably borrow a raw value.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Tag> {
        self.entries.get_mut(key)
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        self.entries.remove(key)
    }

    /// True when `key` exists with the given type id ([`TAG_ANY_NUMERIC`]
    /// accepts every numeric type).
    pub fn contains(&self, key: &str, type_id: u8) -> bool {
        match self.entries.get(key) {
            Some(tag) if type_id == TAG_ANY_NUMERIC => tag.is_numeric(),
            Some(tag) => tag.type_id() == type_id,
            None => false,
        }
    }

    /// True when `key` exists with any type.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Tag)> {
        self.entries.iter()
    }

    /// Returns true if the document has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Read a numeric value truncated to 8 bits.
    pub fn get_byte(&self, key: &str) -> i8 {
        self.numeric(key) as i8
    }

    /// Read a numeric value truncated to 16 bits.
    pub fn get_short(&self, key: &str) -> i16 {
        self.numeric(key) as i16
    }

    /// Read a numeric value truncated to 32 bits.
    pub fn get_int(&self, key: &str) -> i32 {
        self.numeric(key) as i32
    }

    /// Read a numeric value as 64 bits.
    pub fn get_long(&self, key: &str) -> i64 {
        self.numeric(key)
    }

    /// Read a numeric value as a double.
    pub fn get_double(&self, key: &str) -> f64 {
        self.entries.get(key).and_then(Tag::as_f64).unwrap_or(0.0)
    }

    /// Read a byte flag.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get_byte(key) != 0
    }

    /// Read a string, or `""`.
    pub fn get_string(&self, key: &str) -> &str {
        self.entries.get(key).and_then(Tag::as_str).unwrap_or("")
    }

    /// Borrow a nested compound.
    pub fn get_compound(&self, key: &str) -> Option<&TagCompound> {
        self.entries.get(key).and_then(Tag::as_compound)
    }

    /// Mutably borrow a nested compound.
    pub fn get_compound_mut(&mut self, key: &str) -> Option<&mut TagCompound> {
        match self.entries.get_mut(key) {
            Some(Tag::Compound(c)) => Some(c),
            _ => None,
        }
    }

    /// Borrow a list whose elements all have `element_type`.
    ///
    /// Lists of another element type read as empty.
    pub fn get_list(&self, key: &str, element_type: u8) -> &[Tag] {
        match self.entries.get(key) {
            Some(Tag::List(items)) if items.iter().all(|t| t.type_id() == element_type) => items,
            _ => &[],
        }
    }

    /// Mutably borrow a list, creating an empty one when the key is missing
    /// or holds another type.
    pub fn list_mut(&mut self, key: &str) -> &mut Vec<Tag> {
        if !self.contains(key, TAG_LIST) {
            self.entries.insert(key.to_string(), Tag::List(Vec::new()));
        }
        match self.entries.get_mut(key) {
            Some(Tag::List(items)) => items,
            _ => unreachable!("list inserted above"),
        }
    }

    /// Mutably borrow a nested compound, creating it when missing or when
    /// the key holds another type.
    pub fn compound_mut(&mut self, key: &str) -> &mut TagCompound {
        if !self.contains(key, TAG_COMPOUND) {
            self.entries.insert(key.to_string(), Tag::Compound(TagCompound::new()));
        }
        match self.entries.get_mut(key) {
            Some(Tag::Compound(c)) => c,
            _ => unreachable!("compound inserted above"),
        }
    }

    /// Store an 8-bit value.
    pub fn put_byte(&mut self, key: &str, value: i8) {
        self.insert(key, Tag::Byte(value));
    }

    /// Store a 16-bit value.
    pub fn put_short(&mut self, key: &str, value: i16) {
        self.insert(key, Tag::Short(value));
    }

    /// Store a 32-bit value.
    pub fn put_int(&mut self, key: &str, value: i32) {
        self.insert(key, Tag::Int(value));
    }

    /// Store a 64-bit value.
    pub fn put_long(&mut self, key: &str, value: i64) {
        self.insert(key, Tag::Long(value));
    }

    /// Store a double.
    pub fn put_double(&mut self, key: &str, value: f64) {
        self.insert(key, Tag::Double(value));
    }

    /// Store a flag as a byte.
    pub fn put_bool(&mut self, key: &str, value: bool) {
        self.put_byte(key, i8::from(value));
    }

    /// Store a string.
    pub fn put_string(&mut self, key: &str, value: impl Into<String>) {
        self.insert(key, Tag::String(value.into()));
    }

    fn numeric(&self, key: &str) -> i64 {
        self.entries.get(key).and_then(Tag::as_i64).unwrap_or(0)
    }
}

impl fmt::Display for TagCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{key}:{value}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Byte(v) => write!(f, "{v}b"),
            Tag::Short(v) => write!(f, "{v}s"),
            Tag::Int(v) => write!(f, "{v}"),
            Tag::Long(v) => write!(f, "{v}L"),
            Tag::Float(v) => write!(f, "{v}f"),
            Tag::Double(v) => write!(f, "{v}d"),
            Tag::ByteArray(v) => write!(f, "[B;{}]", join(v)),
            Tag::String(v) => write!(f, "{v:?}"),
            Tag::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Tag::Compound(c) => write!(f, "{c}"),
            Tag::IntArray(v) => write!(f, "[I;{}]", join(v)),
            Tag::LongArray(v) => write!(f, "[L;{}]", join(v)),
        }
    }
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
