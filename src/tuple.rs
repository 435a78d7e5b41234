//! Fixed sequences of built-in values.

use crate::{
    catalog::TypeCatalog,
    encoding::{Input, Serializer, SerializerExt},
    errors::RegistryError,
    registry::{BuiltinKind, TypeHandle},
    Value,
};
use failure::Error;
use smallvec::SmallVec;
use std::{slice, sync::Arc};

#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// An ordered sequence of values of built-in kinds.
///
/// Fields carry their built-in tags inline, so a tuple needs no extension table and
/// cannot hold values of other types.
///
/// # Example
///
/// ```
/// use tagmap::prelude::*;
///
/// let t = Tuple::new().with(1).unwrap().with("two").unwrap();
///
/// assert_eq!(t.len(), 2);
/// assert_eq!(t.get(1), Some(&Value::from("two")));
/// ```
pub struct Tuple {
    fields: SmallVec<[Value; 2]>,
}

impl Tuple {
    /// Creates an empty tuple.
    pub fn new() -> Self { Self::default() }

    /// Builds a tuple from `values`.
    ///
    /// # Errors
    ///
    /// Fails on the first value that is not of a built-in kind.
    pub fn from_values<I, V>(values: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut t = Tuple::new();
        for v in values {
            t.push(v)?;
        }
        Ok(t)
    }

    /// Appends a field.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::Encode`] if `v` is not of a built-in kind.
    pub fn push<V: Into<Value>>(&mut self, v: V) -> Result<(), Error> {
        let v = v.into();
        if v.kind().is_none() {
            return Err(RegistryError::Encode(format!(
                "tuple fields must be built-in kinds, not {}",
                v.type_name()
            ))
            .into());
        }
        self.fields.push(v);
        Ok(())
    }

    /// Builder form of [`push`](Tuple::push).
    pub fn with<V: Into<Value>>(mut self, v: V) -> Result<Self, Error> {
        self.push(v)?;
        Ok(self)
    }

    /// The field at `ix`.
    pub fn get(&self, ix: usize) -> Option<&Value> { self.fields.get(ix) }

    /// Number of fields.
    pub fn len(&self) -> usize { self.fields.len() }

    /// Whether the tuple has no fields.
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    /// Iterates over the fields.
    pub fn iter(&self) -> slice::Iter<Value> { self.fields.iter() }

    /// A deep copy of this tuple.
    pub fn try_clone(&self) -> Result<Tuple, Error> {
        let fields = self
            .fields
            .iter()
            .map(Value::try_clone)
            .collect::<Result<_, Error>>()?;
        Ok(Tuple { fields })
    }

    pub(crate) fn write_fields(&self, out: &mut dyn Serializer) -> Result<(), Error> {
        out.put_vlong(self.fields.len() as i64);
        for field in self.fields.iter() {
            match field.kind() {
                Some(kind) => out.put_tag(kind.tag()),
                None => {
                    return Err(RegistryError::Encode(format!(
                        "tuple field of type {} has no built-in tag",
                        field.type_name()
                    ))
                    .into())
                }
            }
            field.write_payload(out)?;
        }
        Ok(())
    }

    pub(crate) fn read_fields(input: &mut Input, catalog: &Arc<dyn TypeCatalog>) -> Result<Tuple, Error> {
        let len = input.read_len()?;
        let mut fields = SmallVec::with_capacity(len.min(input.len()));
        for _ in 0..len {
            let tag = input.read_tag()?;
            let kind = match BuiltinKind::from_tag(tag) {
                Some(kind) => kind,
                None => {
                    return Err(RegistryError::Protocol(format!(
                        "tuple field tag {} is not a built-in kind",
                        tag
                    ))
                    .into())
                }
            };
            fields.push(Value::read_payload(TypeHandle::Builtin(kind), input, catalog)?);
        }
        Ok(Tuple { fields })
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter { self.fields.iter() }
}
