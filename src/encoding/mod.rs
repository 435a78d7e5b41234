//! # Binary encoder and decoder
//!
//! Low-level readers and writers for the wire format, plus the payload codec of every
//! built-in [`Value`] kind.
//!
//! # Example
//!
//! ```
//! use tagmap::prelude::*;
//!
//! let mut map = SortedMapWritable::new();
//! map.put(1, "one").unwrap();
//!
//! // encode into a fresh buffer
//! let enc_full = encode_full(&map).unwrap();
//!
//! // or into one we already have
//! let out: &mut Vec<u8> = &mut Vec::new();
//! map.write_to(out).unwrap();
//!
//! // they are equivalent
//! assert_eq!(*out, enc_full);
//!
//! let mut dec = SortedMapWritable::new();
//! decode_full(&mut dec, enc_full).unwrap();
//! assert_eq!(dec, map);
//! ```

use crate::{
    catalog::TypeCatalog,
    errors::RegistryError,
    map::MapWritable,
    registry::{BuiltinKind, TypeHandle, TypeTag},
    rep::Streamable,
    sorted_map::SortedMapWritable,
    tuple::Tuple,
    util::*,
    Value,
};
use bytes::Bytes;
use failure::Error;
use std::sync::Arc;

pub(crate) mod constants;
pub use constants::{MAX_DYNAMIC_TAGS, MAX_NESTING};
use constants::*;
pub mod ser;
pub use ser::*;
pub mod de;
pub use de::*;

/// Encodes a [`Streamable`] value into a vector of bytes.
///
/// # Arguments
///
/// * `t` - A reference to the value to be encoded.
///
/// # Example
///
/// ```
/// use tagmap::prelude::*;
///
/// let enc: Vec<u8> = encode_full(&MapWritable::new()).unwrap();
///
/// // empty extension table, zero entries
/// assert_eq!(enc, vec![0, 0, 0, 0, 0]);
/// ```
pub fn encode_full<T: Streamable + ?Sized>(t: &T) -> Result<Vec<u8>, Error> {
    let mut out: Vec<u8> = Vec::new();
    t.write_to(&mut out)?;
    Ok(out)
}

/// Decodes a bytestring into `target`.
///
/// # Errors
///
/// Fails if `target` rejects the input or if bytes are left over once it is done.
/// Maps check for leftovers before replacing anything, so a failed decode leaves
/// them as they were.
pub fn decode_full<T: Streamable + ?Sized, B: Into<Input>>(target: &mut T, bs: B) -> Result<(), Error> {
    let mut input: Input = bs.into();
    target.read_whole(&mut input)
}

impl Value {
    /// Writes the payload of this value, without its tag.
    pub fn write_payload(&self, out: &mut dyn Serializer) -> Result<(), Error> {
        match self {
            Value::Boolean(b) => out.put_bool(*b),
            Value::Bytes(b) => out.put_blob(b)?,
            Value::Datetime(ms) => out.put_i64(*ms),
            Value::Double(d) => out.put_f64(*d),
            Value::Int(i) => out.put_i32(*i),
            Value::Long(i) => out.put_i64(*i),
            Value::Map(m) => m.write_to(out)?,
            Value::Null => {}
            Value::SortedMap(m) => m.write_to(out)?,
            Value::Text(s) => out.put_text(s),
            Value::Tuple(t) => t.write_fields(out)?,
            Value::Ext(w) => w.write_to(out)?,
        }
        Ok(())
    }

    /// Reads the payload of a value whose type is `handle`.
    ///
    /// Nested maps look up their extension types in `catalog`.
    pub fn read_payload(
        handle: TypeHandle,
        input: &mut Input,
        catalog: &Arc<dyn TypeCatalog>,
    ) -> Result<Value, Error> {
        let kind = match handle {
            TypeHandle::Builtin(kind) => kind,
            TypeHandle::Dynamic(desc) => {
                let mut w = desc.instantiate();
                w.read_from(input)?;
                return Ok(Value::Ext(w));
            }
        };

        Ok(match kind {
            BuiltinKind::Boolean => Value::Boolean(input.read_bool()?),
            BuiltinKind::Bytes => Value::Bytes(input.read_blob()?),
            BuiltinKind::Datetime => Value::Datetime(input.read_i64()?),
            BuiltinKind::Double => Value::Double(input.read_f64()?),
            BuiltinKind::Int => Value::Int(input.read_i32()?),
            BuiltinKind::Long => Value::Long(input.read_i64()?),
            BuiltinKind::Map => input.nested(|input| {
                let mut m = MapWritable::with_catalog(catalog.clone());
                m.read_from(input)?;
                Ok(Value::Map(m))
            })?,
            BuiltinKind::Null => Value::Null,
            BuiltinKind::SortedMap => input.nested(|input| {
                let mut m = SortedMapWritable::with_catalog(catalog.clone());
                m.read_from(input)?;
                Ok(Value::SortedMap(m))
            })?,
            BuiltinKind::Text => Value::Text(input.read_text()?),
            BuiltinKind::Tuple => {
                Value::from(input.nested(|input| Tuple::read_fields(input, catalog))?)
            }
        })
    }
}
