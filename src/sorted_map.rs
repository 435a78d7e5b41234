//! A map of [`Value`]s kept in key order.

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
    collections::{btree_map, BTreeMap},
    fmt,
    ops::RangeBounds,
    sync::Arc,
};

/// A [`BTreeMap`] from [`Value`] to [`Value`].
///
/// Entries are written in ascending key order, so two equal sorted maps always
/// encode to the same bytes.
///
/// # Example
///
/// ```
/// use tagmap::prelude::*;
///
/// let mut map = SortedMapWritable::new();
/// map.put(3, "c").unwrap();
/// map.put(1, "a").unwrap();
/// map.put(2, "b").unwrap();
///
/// assert_eq!(map.first_key(), Some(&Value::from(1)));
/// assert_eq!(map.last_key(), Some(&Value::from(3)));
///
/// let head: Vec<_> = map.head(&Value::from(3)).map(|(k, _)| k.to_int().unwrap()).collect();
/// assert_eq!(head, vec![1, 2]);
/// ```
pub struct SortedMapWritable {
    core: MapCore,
    entries: BTreeMap<Value, Value>,
}

impl SortedMapWritable {
    /// Creates an empty map that can only read back built-in kinds.
    pub fn new() -> Self { Self::with_catalog(empty_catalog()) }

    /// Creates an empty map resolving extension types through `catalog`.
    pub fn with_catalog(catalog: Arc<dyn TypeCatalog>) -> Self {
        SortedMapWritable {
            core: MapCore::new(catalog),
            entries: BTreeMap::new(),
        }
    }

    /// Inserts an entry, returning the value previously stored under `key`.
    ///
    /// # Errors
    ///
    /// Fails like [`MapWritable::put`](crate::map::MapWritable::put), registering
    /// neither type and leaving the entries unchanged.
    pub fn put<K: Into<Value>, V: Into<Value>>(&mut self, key: K, value: V) -> Result<Option<Value>, Error> {
        let (key, value) = (key.into(), value.into());
        self.core.register(&key, &value)?;
        Ok(self.entries.insert(key, value))
    }

    /// Moves every entry of `other` into this map.
    pub fn put_all(&mut self, other: SortedMapWritable) -> Result<(), Error> {
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

    /// Iterates over the entries in ascending key order.
    pub fn iter(&self) -> btree_map::Iter<Value, Value> { self.entries.iter() }

    /// Iterates over the keys in ascending order.
    pub fn keys(&self) -> btree_map::Keys<Value, Value> { self.entries.keys() }

    /// Iterates over the values in ascending key order.
    pub fn values(&self) -> btree_map::Values<Value, Value> { self.entries.values() }

    /// The smallest key.
    pub fn first_key(&self) -> Option<&Value> { self.entries.keys().next() }

    /// The largest key.
    pub fn last_key(&self) -> Option<&Value> { self.entries.keys().next_back() }

    /// Entries whose keys fall in `range`.
    pub fn range<R: RangeBounds<Value>>(&self, range: R) -> btree_map::Range<Value, Value> {
        self.entries.range::<Value, R>(range)
    }

    /// Entries whose keys are strictly less than `to`.
    pub fn head(&self, to: &Value) -> btree_map::Range<Value, Value> {
        self.entries.range::<Value, _>(..to)
    }

    /// Entries whose keys are greater than or equal to `from`.
    pub fn tail(&self, from: &Value) -> btree_map::Range<Value, Value> {
        self.entries.range::<Value, _>(from..)
    }

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
    /// See [`MapWritable::copy_from`](crate::map::MapWritable::copy_from).
    pub fn copy_from(&mut self, source: Option<&SortedMapWritable>) -> Result<(), Error> {
        clone::copy(self, source)
    }

    /// A deep copy of this map, sharing its catalog and configuration.
    pub fn try_clone(&self) -> Result<SortedMapWritable, Error> {
        let mut copy = SortedMapWritable {
            core: self.core.blank(),
            entries: BTreeMap::new(),
        };
        copy.copy_from(Some(self))?;
        Ok(copy)
    }
}

impl Streamable for SortedMapWritable {
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

impl Default for SortedMapWritable {
    fn default() -> Self { SortedMapWritable::new() }
}

impl PartialEq for SortedMapWritable {
    fn eq(&self, other: &Self) -> bool { self.entries == other.entries }
}

impl Eq for SortedMapWritable {}

impl fmt::Debug for SortedMapWritable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SortedMapWritable")
            .field("entries", &self.entries)
            .field("core", &self.core)
            .finish()
    }
}

impl<'a> IntoIterator for &'a SortedMapWritable {
    type Item = (&'a Value, &'a Value);
    type IntoIter = btree_map::Iter<'a, Value, Value>;

    fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}
