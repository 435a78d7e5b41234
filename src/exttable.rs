//! The extension table: the dynamic half of a [`TagRegistry`], as it travels on the
//! wire.
//!
//! ```text
//! ExtensionTable := count:int8 Entry*
//! Entry          := tag:int8 name:UTF8String
//! UTF8String     := length:uint16 modified-utf8-bytes
//! ```
//!
//! Built-in kinds are never written; both ends know them already.
//!
//! # Example
//!
//! ```
//! use tagmap::prelude::*;
//!
//! let registry = TagRegistry::new();
//! for name in vec!["A", "B", "A", "C"] {
//!     registry
//!         .register_dynamic(TypeHandle::Dynamic(TypeDescriptor::new(name, || unimplemented!())))
//!         .unwrap();
//! }
//!
//! let out: &mut Vec<u8> = &mut Vec::new();
//! registry.write_table(out).unwrap();
//!
//! assert_eq!(
//!     *out,
//!     vec![3, 1, 0, 1, b'A', 2, 0, 1, b'B', 3, 0, 1, b'C']
//! );
//! ```

use crate::{
    catalog::TypeCatalog,
    encoding::{Input, Serializer, SerializerExt},
    errors::RegistryError,
    registry::{TagRegistry, TypeDescriptor, TypeTag},
};
use failure::Error;
use log::trace;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// An unresolved extension table: `(tag, type name)` pairs in stream order.
pub struct ExtensionTable {
    entries: Vec<(TypeTag, String)>,
}

impl ExtensionTable {
    /// Takes a snapshot of the dynamic bindings of `registry`.
    pub fn of(registry: &TagRegistry) -> Self {
        ExtensionTable {
            entries: registry
                .dynamic_entries()
                .into_iter()
                .map(|(tag, handle)| (tag, handle.name().to_string()))
                .collect(),
        }
    }

    /// The `(tag, type name)` pairs, in stream order.
    pub fn entries(&self) -> &[(TypeTag, String)] { &self.entries }

    /// Number of entries.
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Writes the table.
    ///
    /// # Errors
    ///
    /// Fails if a name does not fit a modified UTF-8 string.
    pub fn write_to<S: Serializer + ?Sized>(&self, out: &mut S) -> Result<(), Error> {
        out.put_i8(self.entries.len() as i8);
        for (tag, name) in self.entries.iter() {
            out.put_tag(*tag);
            out.put_utf(name)?;
        }
        Ok(())
    }

    /// Reads a table without resolving any names.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::Protocol`] on a negative count and with
    /// [`RegistryError::Decode`] if the input holds fewer entries than announced.
    pub fn read_from(input: &mut Input) -> Result<Self, Error> {
        let count = input.read_i8()?;
        if count < 0 {
            return Err(
                RegistryError::Protocol(format!("negative extension table size {}", count)).into(),
            );
        }

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let tag = input.read_tag()?;
            let name = input.read_utf()?;
            entries.push((tag, name));
        }
        Ok(ExtensionTable { entries })
    }

    /// Resolves every name through `catalog`.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::Lookup`] on the first name the catalog does not know.
    pub fn resolve(&self, catalog: &dyn TypeCatalog) -> Result<Vec<(TypeTag, TypeDescriptor)>, Error> {
        self.entries
            .iter()
            .map(|(tag, name)| -> Result<_, Error> {
                match catalog.lookup(name) {
                    Some(desc) => Ok((*tag, desc)),
                    None => Err(RegistryError::Lookup(format!("can't find type: {}", name)).into()),
                }
            })
            .collect()
    }

    /// Resolves the table and makes it the dynamic half of `registry`, replacing
    /// whatever bindings were there.
    ///
    /// On error `registry` is unchanged.
    pub fn install(&self, registry: &TagRegistry, catalog: &dyn TypeCatalog) -> Result<(), Error> {
        let resolved = self.resolve(catalog)?;
        trace!("installing {} extension types", resolved.len());
        registry.replace_dynamic(resolved)
    }
}

impl TagRegistry {
    /// Writes the extension table of this registry.
    pub fn write_table<S: Serializer + ?Sized>(&self, out: &mut S) -> Result<(), Error> {
        ExtensionTable::of(self).write_to(out)
    }

    /// Reads an extension table and makes it the dynamic half of this registry.
    ///
    /// Dynamic bindings that are not in the incoming table are dropped. Nothing
    /// changes unless the whole table reads, resolves and validates.
    pub fn read_table(&self, input: &mut Input, catalog: &dyn TypeCatalog) -> Result<(), Error> {
        ExtensionTable::read_from(input)?.install(self, catalog)
    }
}
