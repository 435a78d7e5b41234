pub use crate::{
    catalog::{empty_catalog, DescriptorTable, TypeCatalog},
    clone::clone_writable,
    conf::{ConfigSlot, Configuration},
    encoding::{
        decode_full, encode_full, Input, Serializer, SerializerExt, MAX_DYNAMIC_TAGS, MAX_NESTING,
    },
    errors::{CopyError, RegistryError},
    exttable::ExtensionTable,
    map::MapWritable,
    registry::{BuiltinKind, TagRegistry, TypeDescriptor, TypeHandle, TypeTag},
    rep::*,
    sorted_map::SortedMapWritable,
    tuple::Tuple,
    Value,
};
pub use bytes::Bytes;
pub use failure::Error;
pub use std::sync::Arc;
