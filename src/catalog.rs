//! Runtime type lookup.
//!
//! Decoding an extension table turns type names back into [`TypeDescriptor`]s. Where
//! those come from is up to the caller: containers hold an injected
//! [`TypeCatalog`], and [`DescriptorTable`] is the plain in-memory one.

use crate::{errors::RegistryError, registry::TypeDescriptor, rep::Writable};
use failure::Error;
use std::{collections::HashMap, sync::Arc};

/// Resolves stable type names into descriptors.
pub trait TypeCatalog: Send + Sync {
    /// The descriptor of the type called `name`, if this catalog knows it.
    fn lookup(&self, name: &str) -> Option<TypeDescriptor>;
}

impl<F> TypeCatalog for F
where
    F: Fn(&str) -> Option<TypeDescriptor> + Send + Sync,
{
    fn lookup(&self, name: &str) -> Option<TypeDescriptor> { self(name) }
}

#[derive(Clone, Debug, Default)]
/// A catalog backed by a [`HashMap`] from names to descriptors.
///
/// # Example
///
/// ```
/// use tagmap::prelude::*;
///
/// #[derive(Debug, Default)]
/// struct Celsius(f64);
///
/// impl Streamable for Celsius {
///     fn write_to(&self, out: &mut dyn Serializer) -> Result<(), Error> {
///         out.put_f64(self.0);
///         Ok(())
///     }
///
///     fn read_from(&mut self, input: &mut Input) -> Result<(), Error> {
///         self.0 = input.read_f64()?;
///         Ok(())
///     }
/// }
///
/// impl Writable for Celsius {
///     fn descriptor(&self) -> TypeDescriptor { TypeDescriptor::of::<Celsius>("demo::Celsius") }
/// }
///
/// let catalog = DescriptorTable::new().with::<Celsius>().unwrap();
///
/// assert!(catalog.lookup("demo::Celsius").is_some());
/// assert!(catalog.lookup("demo::Fahrenheit").is_none());
/// ```
pub struct DescriptorTable {
    descriptors: HashMap<&'static str, TypeDescriptor>,
}

impl DescriptorTable {
    /// Creates an empty table.
    pub fn new() -> Self { Self::default() }

    /// Adds a descriptor.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::Conflict`] if another descriptor already has the
    /// same name.
    pub fn insert(&mut self, desc: TypeDescriptor) -> Result<(), Error> {
        if self.descriptors.contains_key(desc.name()) {
            return Err(RegistryError::Conflict(format!(
                "type {} is already in the catalog",
                desc.name()
            ))
            .into());
        }
        self.descriptors.insert(desc.name(), desc);
        Ok(())
    }

    /// Adds the descriptor of `W`.
    pub fn register<W: Writable + Default>(&mut self) -> Result<(), Error> {
        self.insert(W::default().descriptor())
    }

    /// Builder form of [`register`](DescriptorTable::register).
    pub fn with<W: Writable + Default>(mut self) -> Result<Self, Error> {
        self.register::<W>()?;
        Ok(self)
    }

    /// Number of known types.
    pub fn len(&self) -> usize { self.descriptors.len() }

    /// Whether no types are known.
    pub fn is_empty(&self) -> bool { self.descriptors.is_empty() }

    /// Wraps the table for sharing between containers.
    pub fn into_shared(self) -> Arc<dyn TypeCatalog> { Arc::new(self) }
}

impl TypeCatalog for DescriptorTable {
    fn lookup(&self, name: &str) -> Option<TypeDescriptor> { self.descriptors.get(name).copied() }
}

/// A catalog that knows no types. Containers built without a catalog use it, so
/// they can only decode built-in kinds.
pub fn empty_catalog() -> Arc<dyn TypeCatalog> { Arc::new(DescriptorTable::new()) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_rejected() {
        let mut table = DescriptorTable::new();
        table
            .insert(TypeDescriptor::new("x", || unreachable!()))
            .unwrap();
        let err = table
            .insert(TypeDescriptor::new("x", || unreachable!()))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::Conflict(_))
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn closures_are_catalogs() {
        let catalog = |name: &str| {
            if name == "only" {
                Some(TypeDescriptor::new("only", || unreachable!()))
            } else {
                None
            }
        };
        assert_eq!(catalog.lookup("only").map(|d| d.name()), Some("only"));
        assert!(catalog.lookup("other").is_none());
        assert!(empty_catalog().lookup("only").is_none());
    }
}
