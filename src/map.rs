//! An unordered map of [`Value`]s that writes itself with its own extension table.

use crate::{
    catalog::{empty_catalog, TypeCatalog},
    clone,
    conf::Configuration,
    encoding::{Input, Serializer},
    map_core::MapCore,
    registry::TagRegistry,
    rep::Streamable,
    Value,
};
use failure::Error;
use std::{
    cmp::Ordering,
    collections::{hash_map, HashMap},
    fmt,
    sync::Arc,
};

/// A hash map from [`Value`] to [`Value`].
///
/// Every key and value type is registered with the map's [`TagRegistry`] when it is
/// inserted, so the map can always be written. Types that are not built in are
/// resolved on reading through the map's [`TypeCatalog`].
///
/// # Example
///
/// ```
/// use tagmap::prelude::*;
///
/// let mut map = MapWritable::new();
/// map.put("a", 1).unwrap();
/// map.put("b", Value::Null).unwrap();
///
/// assert_eq!(map.len(), 2);
/// assert!(map.contains_key(&Value::from("a")));
/// assert!(map.contains_value(&Value::Null));
///
/// let mut copy = MapWritable::new();
/// copy.copy_from(Some(&map)).unwrap();
/// assert_eq!(copy, map);
/// ```
pub struct MapWritable {
    core: MapCore,
    entries: HashMap<Value, Value>,
}

impl MapWritable {
    /// Creates an empty map that can only read back built-in kinds.
    pub fn new() -> Self { Self::with_catalog(empty_catalog()) }

    /// Creates an empty map resolving extension types through `catalog`.
    pub fn with_catalog(catalog: Arc<dyn TypeCatalog>) -> Self {
        MapWritable {
            core: MapCore::new(catalog),
            entries: HashMap::new(),
        }
    }

    /// Inserts an entry, returning the value previously stored under `key`.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::Overflow`](crate::errors::RegistryError::Overflow)
    /// if the key and value types together would go past 127 dynamic types, and with
    /// [`RegistryError::Conflict`](crate::errors::RegistryError::Conflict) if a type
    /// that is not built in is named like a built-in kind. Neither type is registered
    /// and the entries are not changed in that case.
    pub fn put<K: Into<Value>, V: Into<Value>>(&mut self, key: K, value: V) -> Result<Option<Value>, Error> {
        let (key, value) = (key.into(), value.into());
        self.core.register(&key, &value)?;
        Ok(self.entries.insert(key, value))
    }

    /// Moves every entry of `other` into this map.
    pub fn put_all(&mut self, other: MapWritable) -> Result<(), Error> {
        for (k, v) in other.entries {
            self.put(k, v)?;
        }
        Ok(())
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> { self.entries.get(key) }

    /// Removes the entry under `key`. Registered types stay registered.
    pub fn remove(&mut self, key: &Value) -> Option<Value> { self.entries.remove(key) }

    /// Whether an entry is stored under `key`.
    pub fn contains_key(&self, key: &Value) -> bool { self.entries.contains_key(key) }

    /// Whether some entry holds `value`.
    pub fn contains_value(&self, value: &Value) -> bool { self.entries.values().any(|v| v == value) }

    /// Number of entries.
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Removes every entry.
    pub fn clear(&mut self) { self.entries.clear() }

    /// Iterates over the entries in no particular order.
    pub fn iter(&self) -> hash_map::Iter<Value, Value> { self.entries.iter() }

    /// Iterates over the keys in no particular order.
    pub fn keys(&self) -> hash_map::Keys<Value, Value> { self.entries.keys() }

    /// Iterates over the values in no particular order.
    pub fn values(&self) -> hash_map::Values<Value, Value> { self.entries.values() }

    /// The tag registry of this map.
    pub fn registry(&self) -> &TagRegistry { self.core.registry() }

    /// The catalog extension types are resolved through.
    pub fn catalog(&self) -> &Arc<dyn TypeCatalog> { self.core.catalog() }

    /// The attached configuration.
    pub fn conf(&self) -> Option<Arc<Configuration>> { self.core.conf().get() }

    /// Attaches a configuration, or detaches it with `None`.
    pub fn set_conf(&self, conf: Option<Arc<Configuration>>) { self.core.conf().set(conf) }

    /// Replaces the contents of this map with a deep copy of `source`.
    ///
    /// The configuration and catalog of this map are kept.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::InvalidArgument`](crate::errors::RegistryError::InvalidArgument)
    /// if `source` is `None`, and with a [`CopyError`](crate::errors::CopyError) if the
    /// round trip fails.
    pub fn copy_from(&mut self, source: Option<&MapWritable>) -> Result<(), Error> {
        clone::copy(self, source)
    }

    /// A deep copy of this map, sharing its catalog and configuration.
    pub fn try_clone(&self) -> Result<MapWritable, Error> {
        let mut copy = MapWritable {
            core: self.core.blank(),
            entries: HashMap::new(),
        };
        copy.copy_from(Some(self))?;
        Ok(copy)
    }

    pub(crate) fn cmp_entries(&self, other: &MapWritable) -> Ordering {
        let mut mine: Vec<_> = self.entries.iter().collect();
        let mut theirs: Vec<_> = other.entries.iter().collect();
        mine.sort();
        theirs.sort();
        mine.cmp(&theirs)
    }
}

impl Streamable for MapWritable {
    fn write_to(&self, out: &mut dyn Serializer) -> Result<(), Error> {
        self.core.write_map(self.entries.len(), self.entries.iter(), out)
    }

    fn read_from(&mut self, input: &mut Input) -> Result<(), Error> {
        let entries = self.core.read_map(input, false)?;
        self.entries = entries.into_iter().collect();
        Ok(())
    }

    fn read_whole(&mut self, input: &mut Input) -> Result<(), Error> {
        let entries = self.core.read_map(input, true)?;
        self.entries = entries.into_iter().collect();
        Ok(())
    }
}

impl Default for MapWritable {
    fn default() -> Self { MapWritable::new() }
}

impl PartialEq for MapWritable {
    fn eq(&self, other: &Self) -> bool { self.entries == other.entries }
}

impl Eq for MapWritable {}

impl fmt::Debug for MapWritable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MapWritable")
            .field("entries", &self.entries)
            .field("core", &self.core)
            .finish()
    }
}

impl<'a> IntoIterator for &'a MapWritable {
    type Item = (&'a Value, &'a Value);
    type IntoIter = hash_map::Iter<'a, Value, Value>;

    fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}
