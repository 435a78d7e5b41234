//! # tagmap
//!
//! tagmap stores heterogeneous, polymorphic values in maps that write themselves to a
//! single self-describing binary stream. A reader does not need to know ahead of time
//! which concrete types may appear: every map carries a small table naming the types
//! it uses, and each entry only pays one tag byte for its type.
//!
//! # Usage
//!
//! Built-in kinds go straight in:
//!
//! ```
//! use tagmap::prelude::*;
//!
//! let mut map = MapWritable::new();
//! map.put("answer", 42).unwrap();
//! map.put("pi", 3.14).unwrap();
//! map.put(true, Value::Null).unwrap();
//!
//! let bytes = encode_full(&map).unwrap();
//!
//! let mut decoded = MapWritable::new();
//! decode_full(&mut decoded, bytes).unwrap();
//!
//! assert_eq!(decoded, map);
//! assert_eq!(decoded.get(&Value::from("answer")), Some(&Value::Int(42)));
//! ```
//!
//! Any other type implements [`Writable`](rep::Writable) and is made known to the
//! reading side through a [`TypeCatalog`](catalog::TypeCatalog):
//!
//! ```
//! use std::sync::Arc;
//! use tagmap::prelude::*;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Streamable for Point {
//!     fn write_to(&self, out: &mut dyn Serializer) -> Result<(), Error> {
//!         out.put_i32(self.x);
//!         out.put_i32(self.y);
//!         Ok(())
//!     }
//!
//!     fn read_from(&mut self, input: &mut Input) -> Result<(), Error> {
//!         self.x = input.read_i32()?;
//!         self.y = input.read_i32()?;
//!         Ok(())
//!     }
//! }
//!
//! impl Writable for Point {
//!     fn descriptor(&self) -> TypeDescriptor { TypeDescriptor::of::<Point>("demo::Point") }
//! }
//!
//! let catalog = DescriptorTable::new().with::<Point>().unwrap().into_shared();
//!
//! let mut map = MapWritable::with_catalog(catalog.clone());
//! map.put("origin", Value::ext(Point { x: 0, y: 0 })).unwrap();
//!
//! // `Point` got the first dynamic tag
//! assert_eq!(map.registry().tag_of("demo::Point"), Some(TypeTag::new(1)));
//!
//! let copy = map.try_clone().unwrap();
//! assert_eq!(copy, map);
//! ```
//!
//! # Specification
//!
//! This section describes the binary format.
//!
//! ## Tags
//!
//! A tag is one signed byte standing in for a type. The eleven built-in kinds have
//! fixed negative tags which are never transmitted:
//!
//! | Tag    | Kind        |
//! | ---    | ---         |
//! | `-126` | boolean     |
//! | `-125` | bytes       |
//! | `-124` | datetime    |
//! | `-123` | double      |
//! | `-122` | int         |
//! | `-121` | long        |
//! | `-120` | map         |
//! | `-119` | null        |
//! | `-118` | sorted map  |
//! | `-117` | text        |
//! | `-116` | tuple       |
//!
//! Every other type gets a positive tag from `1` to `127`, handed out per map in the
//! order the map first sees the type.
//!
//! ## Extension table
//!
//! A map starts with its extension table: one byte holding the number of dynamic
//! types, then for each of them in tag order its tag byte and its name as a `u16`
//! big-endian length followed by modified UTF-8.
//!
//! ## Entries
//!
//! After the table comes the entry count as a big-endian `i32`, then every entry as
//! `keyTag key valueTag value`. Payloads are:
//!
//! | Kind     | Payload                                                    |
//! | ---      | ---                                                        |
//! | boolean  | one byte, `0` or `1`                                       |
//! | bytes    | `i32` length, then the bytes                               |
//! | datetime | `i64` milliseconds since the Unix epoch                    |
//! | double   | `i64` IEEE 754 bits                                        |
//! | int      | `i32`                                                      |
//! | long     | `i64`                                                      |
//! | map      | a whole nested map, extension table included               |
//! | null     | nothing                                                    |
//! | text     | varint length, then UTF-8                                  |
//! | tuple    | varint field count, then each field as `tag payload`       |
//! | other    | whatever the type's [`Writable`](rep::Writable) writes     |
//!
//! All fixed-width integers are big-endian. Varints take one byte for values in
//! `-112..=127` and otherwise a length marker followed by the big-endian magnitude.

#![warn(
//    missing_docs,
    unsafe_code,
    unused_labels,
    keyword_idents,
    missing_copy_implementations,
    missing_debug_implementations,
    macro_use_extern_crate,
    unreachable_pub,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces
)]
#![allow(clippy::cast_lossless)]

#[macro_use]
pub mod util;

pub mod catalog;
pub mod clone;
pub mod conf;
pub mod encoding;
pub mod errors;
pub mod exttable;
mod map_core;
pub mod map;
pub mod prelude;
pub mod registry;
pub mod rep;
pub mod sorted_map;
pub mod tuple;

use bytes::Bytes;
use failure::*;
use map::MapWritable;
use registry::{BuiltinKind, TypeHandle};
use rep::Writable;
use sorted_map::SortedMapWritable;
use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};
use tuple::Tuple;

#[derive(Debug)]
/// A value a map can hold: one of the built-in kinds, or any [`Writable`].
///
/// Values are totally ordered and hashable, so any of them can be a key. Values of
/// types that are not built in compare by type name, then by their encoding.
///
/// # Example
///
/// ```
/// use tagmap::prelude::*;
///
/// let v = Value::from("hello");
///
/// assert_eq!(v.to_text().unwrap(), "hello");
/// assert_eq!(v.kind(), Some(BuiltinKind::Text));
/// assert!(v.to_int().is_err());
/// ```
pub enum Value {
    /// `true` or `false`.
    Boolean(bool),
    /// A byte blob.
    Bytes(Bytes),
    /// Milliseconds since the Unix epoch.
    Datetime(i64),
    /// A double-precision float.
    Double(f64),
    /// A 32-bit integer.
    Int(i32),
    /// A 64-bit integer.
    Long(i64),
    /// An unordered map.
    Map(MapWritable),
    /// The null marker.
    Null,
    /// A map ordered by key.
    SortedMap(SortedMapWritable),
    /// UTF-8 text.
    Text(String),
    /// A fixed sequence of built-in values.
    Tuple(Box<Tuple>),
    /// A value of a type that is not built in.
    Ext(Box<dyn Writable>),
}

impl Value {
    /// Wraps a [`Writable`].
    pub fn ext<W: Writable + 'static>(w: W) -> Value { Value::Ext(Box::new(w)) }

    /// The built-in kind of this value, or `None` for [`Value::Ext`].
    pub fn kind(&self) -> Option<BuiltinKind> {
        match self.handle() {
            TypeHandle::Builtin(kind) => Some(kind),
            TypeHandle::Dynamic(_) => None,
        }
    }

    /// The type handle a registry binds for this value.
    pub fn handle(&self) -> TypeHandle {
        TypeHandle::Builtin(match self {
            Value::Boolean(_) => BuiltinKind::Boolean,
            Value::Bytes(_) => BuiltinKind::Bytes,
            Value::Datetime(_) => BuiltinKind::Datetime,
            Value::Double(_) => BuiltinKind::Double,
            Value::Int(_) => BuiltinKind::Int,
            Value::Long(_) => BuiltinKind::Long,
            Value::Map(_) => BuiltinKind::Map,
            Value::Null => BuiltinKind::Null,
            Value::SortedMap(_) => BuiltinKind::SortedMap,
            Value::Text(_) => BuiltinKind::Text,
            Value::Tuple(_) => BuiltinKind::Tuple,
            Value::Ext(w) => return TypeHandle::Dynamic(w.descriptor()),
        })
    }

    /// The stable type name of this value.
    pub fn type_name(&self) -> &'static str { self.handle().name() }

    /// Indicates whether a value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            _ => false,
        }
    }

    /// Tries to read the value as a [`bool`].
    pub fn to_bool(&self) -> Result<bool, Error> {
        match self {
            Value::Boolean(b) => Ok(*b),
            _ => bail!("This value is not a `Boolean`"),
        }
    }

    /// Tries to read the value as an [`i32`].
    pub fn to_int(&self) -> Result<i32, Error> {
        match self {
            Value::Int(i) => Ok(*i),
            _ => bail!("This value is not an `Int`"),
        }
    }

    /// Tries to read the value as an [`i64`].
    pub fn to_long(&self) -> Result<i64, Error> {
        match self {
            Value::Long(i) => Ok(*i),
            _ => bail!("This value is not a `Long`"),
        }
    }

    /// Tries to read the value as an [`f64`].
    pub fn to_double(&self) -> Result<f64, Error> {
        match self {
            Value::Double(d) => Ok(*d),
            _ => bail!("This value is not a `Double`"),
        }
    }

    /// Tries to read the value as milliseconds since the Unix epoch.
    pub fn to_datetime(&self) -> Result<i64, Error> {
        match self {
            Value::Datetime(ms) => Ok(*ms),
            _ => bail!("This value is not a `Datetime`"),
        }
    }

    /// Tries to read the value as text.
    pub fn to_text(&self) -> Result<&str, Error> {
        match self {
            Value::Text(s) => Ok(s),
            _ => bail!("This value is not `Text`"),
        }
    }

    /// Tries to read the value as a byte blob.
    pub fn to_bytes(&self) -> Result<&Bytes, Error> {
        match self {
            Value::Bytes(b) => Ok(b),
            _ => bail!("This value is not `Bytes`"),
        }
    }

    /// Tries to read the value as a [`MapWritable`].
    pub fn to_map(&self) -> Result<&MapWritable, Error> {
        match self {
            Value::Map(m) => Ok(m),
            _ => bail!("This value is not a `Map`"),
        }
    }

    /// Tries to read the value as a [`SortedMapWritable`].
    pub fn to_sorted_map(&self) -> Result<&SortedMapWritable, Error> {
        match self {
            Value::SortedMap(m) => Ok(m),
            _ => bail!("This value is not a `SortedMap`"),
        }
    }

    /// Tries to read the value as a [`Tuple`].
    pub fn to_tuple(&self) -> Result<&Tuple, Error> {
        match self {
            Value::Tuple(t) => Ok(&**t),
            _ => bail!("This value is not a `Tuple`"),
        }
    }

    /// Tries to read the value as a [`Writable`] of a type that is not built in.
    pub fn to_ext(&self) -> Result<&dyn Writable, Error> {
        match self {
            Value::Ext(w) => Ok(&**w),
            _ => bail!("This value is a built-in kind"),
        }
    }

    /// Makes an independent copy of the value.
    ///
    /// Maps and values of types that are not built in are copied by writing them to a
    /// buffer and reading them back.
    pub fn try_clone(&self) -> Result<Value, Error> {
        Ok(match self {
            Value::Boolean(b) => Value::Boolean(*b),
            Value::Bytes(b) => Value::Bytes(b.clone()),
            Value::Datetime(ms) => Value::Datetime(*ms),
            Value::Double(d) => Value::Double(*d),
            Value::Int(i) => Value::Int(*i),
            Value::Long(i) => Value::Long(*i),
            Value::Map(m) => Value::Map(m.try_clone()?),
            Value::Null => Value::Null,
            Value::SortedMap(m) => Value::SortedMap(m.try_clone()?),
            Value::Text(s) => Value::Text(s.clone()),
            Value::Tuple(t) => Value::Tuple(Box::new(t.try_clone()?)),
            Value::Ext(w) => Value::Ext(clone::clone_writable(&**w)?),
        })
    }

    fn rank(&self) -> i8 {
        match self.kind() {
            Some(kind) => kind.tag().get(),
            None => 0,
        }
    }
}

/// Identity of an extension value: its type name and its encoding.
fn ext_key(w: &dyn Writable) -> (&'static str, Vec<u8>) {
    let mut out: Vec<u8> = Vec::new();
    if w.write_to(&mut out).is_err() {
        // unencodable values compare by name alone
        out.clear();
    }
    (w.descriptor().name(), out)
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::Datetime(a), Value::Datetime(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Long(a), Value::Long(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => a.cmp_entries(b),
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::SortedMap(a), Value::SortedMap(b)) => a.iter().cmp(b.iter()),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Tuple(a), Value::Tuple(b)) => a.cmp(b),
            (Value::Ext(a), Value::Ext(b)) => ext_key(&**a).cmp(&ext_key(&**b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Boolean(b) => b.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::Datetime(i) | Value::Long(i) => i.hash(state),
            Value::Double(d) => d.to_bits().hash(state),
            Value::Int(i) => i.hash(state),
            // entry order is unspecified, so only the size takes part
            Value::Map(m) => m.len().hash(state),
            Value::Null => {}
            Value::SortedMap(m) => m.iter().for_each(|e| e.hash(state)),
            Value::Text(s) => s.hash(state),
            Value::Tuple(t) => t.hash(state),
            Value::Ext(w) => ext_key(&**w).hash(state),
        }
    }
}

from_fn!(Value, bool, Value::Boolean);
from_fn!(Value, i32, Value::Int);
from_fn!(Value, i64, Value::Long);
from_fn!(Value, f64, Value::Double);
from_fn!(Value, String, Value::Text);
from_fn!(Value, &str, |s: &str| Value::Text(s.to_string()));
from_fn!(Value, Bytes, Value::Bytes);
from_fn!(Value, Vec<u8>, |v: Vec<u8>| Value::Bytes(Bytes::from(v)));
from_fn!(Value, MapWritable, Value::Map);
from_fn!(Value, SortedMapWritable, Value::SortedMap);
from_fn!(Value, Tuple, |t| Value::Tuple(Box::new(t)));
from_fn!(Value, Box<dyn Writable>, Value::Ext);
from_fn!(Value, (), |_| Value::Null);
