//! State and codec shared by both map containers.

use crate::{
    catalog::TypeCatalog,
    conf::ConfigSlot,
    encoding::{Input, Serializer, SerializerExt},
    errors::RegistryError,
    exttable::ExtensionTable,
    registry::TagRegistry,
    Value,
};
use failure::Error;
use log::trace;
use std::{fmt, sync::Arc};

/// The registry, configuration and catalog a map carries next to its entries.
pub(crate) struct MapCore {
    registry: TagRegistry,
    conf: ConfigSlot,
    catalog: Arc<dyn TypeCatalog>,
}

impl MapCore {
    pub(crate) fn new(catalog: Arc<dyn TypeCatalog>) -> Self {
        MapCore {
            registry: TagRegistry::new(),
            conf: ConfigSlot::new(),
            catalog,
        }
    }

    pub(crate) fn registry(&self) -> &TagRegistry { &self.registry }

    pub(crate) fn conf(&self) -> &ConfigSlot { &self.conf }

    pub(crate) fn catalog(&self) -> &Arc<dyn TypeCatalog> { &self.catalog }

    /// Makes sure the types of `key` and `value` have tags. If either cannot get
    /// one, neither is registered.
    pub(crate) fn register(&self, key: &Value, value: &Value) -> Result<(), Error> {
        self.registry.register_all(&[key.handle(), value.handle()])?;
        Ok(())
    }

    fn put_value(&self, v: &Value, out: &mut dyn Serializer) -> Result<(), Error> {
        let tag = match self.registry.tag_of(v.type_name()) {
            Some(tag) => tag,
            None => {
                return Err(RegistryError::Encode(format!(
                    "type {} has no tag in this map",
                    v.type_name()
                ))
                .into())
            }
        };
        out.put_tag(tag);
        v.write_payload(out)
    }

    /// Writes the extension table, the entry count and every entry.
    pub(crate) fn write_map<'a, I>(
        &self,
        len: usize,
        entries: I,
        out: &mut dyn Serializer,
    ) -> Result<(), Error>
    where
        I: Iterator<Item = (&'a Value, &'a Value)>,
    {
        if len > i32::max_value() as usize {
            return Err(RegistryError::Encode(format!("{} entries do not fit a map", len)).into());
        }

        trace!("writing {} entries", len);
        self.registry.write_table(out)?;
        out.put_i32(len as i32);
        for (k, v) in entries {
            self.put_value(k, out)?;
            self.put_value(v, out)?;
        }
        Ok(())
    }

    /// Reads a whole map and, once every entry has decoded, installs its registry.
    /// With `whole` set the input must end right after the map.
    ///
    /// On error neither the registry nor anything else in `self` has changed.
    pub(crate) fn read_map(
        &mut self,
        input: &mut Input,
        whole: bool,
    ) -> Result<Vec<(Value, Value)>, Error> {
        let table = ExtensionTable::read_from(input)?;
        let staged = self.registry.fork_predefined();
        table.install(&staged, &*self.catalog)?;

        let count = input.read_i32()?;
        if count < 0 {
            return Err(RegistryError::Protocol(format!("negative entry count {}", count)).into());
        }
        trace!("reading {} entries with {} extension types", count, table.len());

        let mut entries = Vec::with_capacity((count as usize).min(input.len()));
        for _ in 0..count {
            let k = read_value(&staged, input, &self.catalog)?;
            let v = read_value(&staged, input, &self.catalog)?;
            entries.push((k, v));
        }
        if whole {
            input.ensure_exhausted()?;
        }

        self.registry = staged;
        Ok(entries)
    }

    /// A blank core sharing this one's catalog and configuration.
    pub(crate) fn blank(&self) -> Self {
        let core = MapCore::new(self.catalog.clone());
        core.conf.set(self.conf.get());
        core
    }
}

fn read_value(
    registry: &TagRegistry,
    input: &mut Input,
    catalog: &Arc<dyn TypeCatalog>,
) -> Result<Value, Error> {
    let tag = input.read_tag()?;
    match registry.resolve(tag) {
        Some(handle) => Value::read_payload(handle, input, catalog),
        None => Err(RegistryError::Protocol(format!("unknown tag {}", tag)).into()),
    }
}

impl fmt::Debug for MapCore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MapCore")
            .field("registry", &self.registry)
            .field("conf", &self.conf)
            .finish()
    }
}
