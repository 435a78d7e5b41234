//! Configuration attached to a container.
//!
//! The container never looks inside a [`Configuration`]; it only stores the current
//! one and hands it back.

use arc_swap::ArcSwapOption;
use std::{collections::BTreeMap, fmt, sync::Arc};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// A bag of string properties.
///
/// # Example
///
/// ```
/// use tagmap::prelude::*;
///
/// let conf = Configuration::new().with("odps.sql.timezone", "UTC");
///
/// assert_eq!(conf.get("odps.sql.timezone"), Some("UTC"));
/// assert_eq!(conf.get("missing"), None);
/// ```
pub struct Configuration {
    props: BTreeMap<String, String>,
}

impl Configuration {
    /// Creates an empty configuration.
    pub fn new() -> Self { Self::default() }

    /// The value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> { self.props.get(key).map(String::as_str) }

    /// Sets `key`, returning the previous value.
    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> Option<String> {
        self.props.insert(key.into(), value.into())
    }

    /// Builder form of [`set`](Configuration::set).
    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set(key, value);
        self
    }

    /// Number of properties.
    pub fn len(&self) -> usize { self.props.len() }

    /// Whether no properties are set.
    pub fn is_empty(&self) -> bool { self.props.is_empty() }

    /// Iterates over the properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Default)]
/// A single, atomically replaceable configuration reference.
///
/// Readers always see either the old or the new configuration, never a mix. The slot
/// is independent of the registry lock.
pub struct ConfigSlot {
    current: ArcSwapOption<Configuration>,
}

impl ConfigSlot {
    /// Creates an empty slot.
    pub fn new() -> Self { Self::default() }

    /// The current configuration, if any.
    pub fn get(&self) -> Option<Arc<Configuration>> { self.current.load_full() }

    /// Replaces the current configuration.
    pub fn set(&self, conf: Option<Arc<Configuration>>) { self.current.store(conf) }
}

impl fmt::Debug for ConfigSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ConfigSlot").field(&self.get()).finish()
    }
}
