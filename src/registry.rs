//! The type tag registry.
//!
//! Every container owns one [`TagRegistry`]. It maps type names to one-byte
//! [`TypeTag`]s and back. The eleven built-in kinds occupy fixed negative tags that
//! are never transmitted; every other type seen by the container gets the next
//! positive tag, in the order it was first seen.
//!
//! # Example
//!
//! ```
//! use tagmap::prelude::*;
//!
//! let registry = TagRegistry::new();
//!
//! // built-in kinds are always known
//! assert_eq!(
//!     registry.tag_of(BuiltinKind::Text.name()),
//!     Some(BuiltinKind::Text.tag())
//! );
//!
//! // nothing else is, until registered
//! assert_eq!(registry.tag_of("com.example.Point"), None);
//! assert_eq!(registry.dynamic_count(), 0);
//! ```

use crate::{
    encoding::constants::*,
    errors::RegistryError,
    rep::Writable,
};
use failure::Error;
use log::debug;
use parking_lot::RwLock;
use std::{collections::HashMap, fmt};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
/// The one-byte identifier standing in for a type on the wire.
///
/// Negative tags belong to built-in kinds, positive tags are handed out at runtime.
pub struct TypeTag(i8);

impl TypeTag {
    /// Wraps a raw tag byte.
    pub const fn new(tag: i8) -> Self { TypeTag(tag) }

    /// The raw tag byte.
    pub fn get(self) -> i8 { self.0 }

    /// Whether the tag lies in the predefined (negative) range.
    pub fn is_predefined(self) -> bool { self.0 < 0 }

    /// Whether the tag lies in the dynamic (positive) range.
    pub fn is_dynamic(self) -> bool { self.0 > 0 }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
/// The value kinds every participant knows ahead of time.
pub enum BuiltinKind {
    /// `true` or `false`.
    Boolean,
    /// A byte blob.
    Bytes,
    /// Milliseconds since the Unix epoch.
    Datetime,
    /// A double-precision float.
    Double,
    /// A 32-bit integer.
    Int,
    /// A 64-bit integer.
    Long,
    /// An unordered map.
    Map,
    /// The null marker.
    Null,
    /// A map ordered by key.
    SortedMap,
    /// UTF-8 text.
    Text,
    /// A fixed sequence of values.
    Tuple,
}

impl BuiltinKind {
    /// Every built-in kind, in tag order.
    pub const ALL: [BuiltinKind; 11] = [
        BuiltinKind::Boolean,
        BuiltinKind::Bytes,
        BuiltinKind::Datetime,
        BuiltinKind::Double,
        BuiltinKind::Int,
        BuiltinKind::Long,
        BuiltinKind::Map,
        BuiltinKind::Null,
        BuiltinKind::SortedMap,
        BuiltinKind::Text,
        BuiltinKind::Tuple,
    ];

    /// The fixed tag of this kind.
    pub fn tag(self) -> TypeTag {
        use BuiltinKind::*;
        TypeTag(match self {
            Boolean => TAG_BOOLEAN,
            Bytes => TAG_BYTES,
            Datetime => TAG_DATETIME,
            Double => TAG_DOUBLE,
            Int => TAG_INT,
            Long => TAG_LONG,
            Map => TAG_MAP,
            Null => TAG_NULL,
            SortedMap => TAG_SORTED_MAP,
            Text => TAG_TEXT,
            Tuple => TAG_TUPLE,
        })
    }

    /// The stable type name of this kind.
    pub fn name(self) -> &'static str {
        use BuiltinKind::*;
        match self {
            Boolean => "tagmap::Boolean",
            Bytes => "tagmap::Bytes",
            Datetime => "tagmap::Datetime",
            Double => "tagmap::Double",
            Int => "tagmap::Int",
            Long => "tagmap::Long",
            Map => "tagmap::MapWritable",
            Null => "tagmap::Null",
            SortedMap => "tagmap::SortedMapWritable",
            Text => "tagmap::Text",
            Tuple => "tagmap::Tuple",
        }
    }

    /// Finds the kind that owns `tag`, if any.
    pub fn from_tag(tag: TypeTag) -> Option<BuiltinKind> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    /// Finds the kind called `name`, if any.
    pub fn from_name(name: &str) -> Option<BuiltinKind> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }
}

#[derive(Copy, Clone)]
/// Describes a type that is not built in: its stable name and how to make a blank
/// instance of it for decoding.
pub struct TypeDescriptor {
    name: &'static str,
    factory: fn() -> Box<dyn Writable>,
}

fn blank<W: Writable + Default + 'static>() -> Box<dyn Writable> { Box::new(W::default()) }

impl TypeDescriptor {
    /// Creates a descriptor from a name and a factory.
    pub fn new(name: &'static str, factory: fn() -> Box<dyn Writable>) -> Self {
        TypeDescriptor { name, factory }
    }

    /// Creates a descriptor whose factory is `W::default`.
    ///
    /// # Example
    ///
    /// ```
    /// use tagmap::prelude::*;
    ///
    /// #[derive(Debug, Default)]
    /// struct Flag(bool);
    ///
    /// impl Streamable for Flag {
    ///     fn write_to(&self, out: &mut dyn Serializer) -> Result<(), Error> {
    ///         out.put_bool(self.0);
    ///         Ok(())
    ///     }
    ///
    ///     fn read_from(&mut self, input: &mut Input) -> Result<(), Error> {
    ///         self.0 = input.read_bool()?;
    ///         Ok(())
    ///     }
    /// }
    ///
    /// impl Writable for Flag {
    ///     fn descriptor(&self) -> TypeDescriptor { TypeDescriptor::of::<Flag>("demo::Flag") }
    /// }
    ///
    /// let desc = TypeDescriptor::of::<Flag>("demo::Flag");
    /// assert_eq!(desc.name(), "demo::Flag");
    /// assert_eq!(desc.instantiate().descriptor(), desc);
    /// ```
    pub fn of<W: Writable + Default + 'static>(name: &'static str) -> Self {
        TypeDescriptor {
            name,
            factory: blank::<W>,
        }
    }

    /// The stable type name.
    pub fn name(&self) -> &'static str { self.name }

    /// Makes a blank instance, ready to be read into.
    pub fn instantiate(&self) -> Box<dyn Writable> { (self.factory)() }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool { self.name == other.name }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("TypeDescriptor").field(&self.name).finish()
    }
}

#[derive(Copy, Clone, Debug)]
/// A live type handle, as stored by a [`TagRegistry`].
///
/// Two handles denote the same type when they are of the same variant and their
/// names are equal. A runtime type never matches a built-in kind, whatever its name.
pub enum TypeHandle {
    /// A built-in kind.
    Builtin(BuiltinKind),
    /// A type described at runtime.
    Dynamic(TypeDescriptor),
}

impl TypeHandle {
    /// The stable type name.
    pub fn name(&self) -> &'static str {
        match self {
            TypeHandle::Builtin(k) => k.name(),
            TypeHandle::Dynamic(d) => d.name(),
        }
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeHandle::Builtin(a), TypeHandle::Builtin(b)) => a == b,
            (TypeHandle::Dynamic(a), TypeHandle::Dynamic(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TypeHandle {}

impl From<BuiltinKind> for TypeHandle {
    fn from(k: BuiltinKind) -> Self { TypeHandle::Builtin(k) }
}

impl From<TypeDescriptor> for TypeHandle {
    fn from(d: TypeDescriptor) -> Self { TypeHandle::Dynamic(d) }
}

#[derive(Clone, Default)]
struct Tables {
    by_name: HashMap<&'static str, TypeTag>,
    by_tag: HashMap<TypeTag, TypeHandle>,
    dynamic: u8,
}

impl Tables {
    fn seeded() -> Self {
        let mut tables = Tables::default();
        for kind in BuiltinKind::ALL.iter() {
            tables.by_name.insert(kind.name(), kind.tag());
            tables.by_tag.insert(kind.tag(), TypeHandle::Builtin(*kind));
        }
        tables
    }

    /// Binds `handle` to `tag`, failing with a description of the clash if either is
    /// already bound to something else.
    fn bind(&mut self, handle: TypeHandle, tag: TypeTag) -> Result<(), String> {
        if let Some(existing) = self.by_name.get(handle.name()) {
            if *existing != tag {
                return Err(format!(
                    "type {} already registered but maps to {} and not {}",
                    handle.name(),
                    existing,
                    tag
                ));
            }
        }
        if let Some(existing) = self.by_tag.get(&tag) {
            if *existing != handle {
                return Err(format!(
                    "tag {} exists but maps to {} and not {}",
                    tag,
                    existing.name(),
                    handle.name()
                ));
            }
        }
        self.by_name.insert(handle.name(), tag);
        self.by_tag.insert(tag, handle);
        Ok(())
    }

    /// The tag already bound to `handle`, or `None` if its name is unbound.
    fn existing(&self, handle: TypeHandle) -> Result<Option<TypeTag>, RegistryError> {
        let tag = match self.by_name.get(handle.name()) {
            Some(tag) => *tag,
            None => return Ok(None),
        };
        match self.by_tag.get(&tag) {
            Some(bound) if *bound == handle => Ok(Some(tag)),
            _ => Err(RegistryError::Conflict(format!(
                "{} names a different type bound to tag {}",
                handle.name(),
                tag
            ))),
        }
    }

    /// Tags every handle, handing out dynamic tags to the unbound ones in order.
    /// Either all of them are bound afterwards or nothing has changed.
    fn assign(&mut self, handles: &[TypeHandle]) -> Result<Vec<TypeTag>, RegistryError> {
        let mut fresh: Vec<TypeHandle> = Vec::new();
        for handle in handles {
            if self.existing(*handle)?.is_none() && !fresh.contains(handle) {
                fresh.push(*handle);
            }
        }
        if self.dynamic as usize + fresh.len() > MAX_DYNAMIC_TAGS as usize {
            let names: Vec<_> = fresh.iter().map(|h| h.name()).collect();
            return Err(RegistryError::Overflow(format!(
                "adding {} would exceed the maximum of {} types",
                names.join(", "),
                MAX_DYNAMIC_TAGS
            )));
        }

        let mut tags = Vec::with_capacity(handles.len());
        for handle in handles {
            let tag = match self.existing(*handle)? {
                Some(tag) => tag,
                None => {
                    let tag = TypeTag(self.dynamic as i8 + 1);
                    self.bind(*handle, tag).map_err(RegistryError::Conflict)?;
                    self.dynamic += 1;
                    debug!("registered {} as tag {}", handle.name(), tag);
                    tag
                }
            };
            tags.push(tag);
        }
        Ok(tags)
    }

    /// A copy holding only the predefined bindings.
    fn predefined(&self) -> Tables {
        let mut staged = Tables::seeded();
        for (tag, handle) in self.by_tag.iter() {
            if tag.is_predefined() {
                staged.by_name.insert(handle.name(), *tag);
                staged.by_tag.insert(*tag, *handle);
            }
        }
        staged
    }

    fn dynamic_entries(&self) -> Vec<(TypeTag, TypeHandle)> {
        (1..=self.dynamic)
            .filter_map(|i| {
                let tag = TypeTag(i as i8);
                self.by_tag.get(&tag).map(|h| (tag, *h))
            })
            .collect()
    }
}

/// A bidirectional, bounded mapping between types and [`TypeTag`]s.
///
/// Both directions live behind one lock, so a lookup never sees a binding that is
/// present in only one of them. Registrations are serialized; lookups only take the
/// read side.
pub struct TagRegistry {
    tables: RwLock<Tables>,
}

impl TagRegistry {
    /// Creates a registry holding only the built-in kinds.
    pub fn new() -> Self {
        TagRegistry {
            tables: RwLock::new(Tables::seeded()),
        }
    }

    /// Creates a registry holding the built-in kinds plus `extra` predefined bindings.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::Configuration`] if a binding clashes with another
    /// one or uses a non-negative tag.
    pub fn with_predefined<I>(extra: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (TypeHandle, TypeTag)>,
    {
        let registry = TagRegistry::new();
        for (handle, tag) in extra {
            registry.register_predefined(handle, tag)?;
        }
        Ok(registry)
    }

    /// Binds a predefined type to a fixed negative tag.
    ///
    /// Re-registering an identical binding is a no-op.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::Configuration`] if the type or the tag is already
    /// bound to something else, or if the tag is not negative.
    pub fn register_predefined(&self, handle: TypeHandle, tag: TypeTag) -> Result<(), Error> {
        if !tag.is_predefined() {
            return Err(RegistryError::Configuration(format!(
                "tag {} for {} is outside the predefined range",
                tag,
                handle.name()
            ))
            .into());
        }
        self.tables
            .write()
            .bind(handle, tag)
            .map_err(|msg| RegistryError::Configuration(msg).into())
    }

    /// Returns the tag of `handle`, assigning the next dynamic tag if the type has not
    /// been seen before.
    ///
    /// Dynamic tags are handed out as 1, 2, 3, … in the order types are first seen.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::Overflow`] once all 127 dynamic tags are taken, and
    /// with [`RegistryError::Conflict`] if the name is already bound to a different
    /// kind of type, such as a runtime type named like a built-in kind.
    ///
    /// # Example
    ///
    /// ```
    /// use tagmap::prelude::*;
    ///
    /// let registry = TagRegistry::new();
    /// let point = TypeHandle::Dynamic(TypeDescriptor::new("demo::Point", || unimplemented!()));
    ///
    /// assert_eq!(registry.register_dynamic(point).unwrap(), TypeTag::new(1));
    /// // a second registration is idempotent
    /// assert_eq!(registry.register_dynamic(point).unwrap(), TypeTag::new(1));
    /// assert_eq!(registry.dynamic_count(), 1);
    /// ```
    pub fn register_dynamic(&self, handle: TypeHandle) -> Result<TypeTag, Error> {
        if let Some(tag) = self.tables.read().existing(handle)? {
            return Ok(tag);
        }

        // someone may have won the race between the two locks, which `assign` sees
        let tags = self.tables.write().assign(&[handle])?;
        Ok(tags[0])
    }

    /// Registers several types at once, returning their tags in order.
    ///
    /// Either every type ends up with a tag or the registry is left as it was, so a
    /// pair that does not fit never leaves half of itself behind.
    ///
    /// # Errors
    ///
    /// As for [`register_dynamic`](TagRegistry::register_dynamic).
    ///
    /// # Example
    ///
    /// ```
    /// use tagmap::prelude::*;
    ///
    /// let registry = TagRegistry::new();
    /// let a = TypeHandle::Dynamic(TypeDescriptor::new("demo::A", || unimplemented!()));
    /// let b = TypeHandle::Dynamic(TypeDescriptor::new("demo::B", || unimplemented!()));
    ///
    /// let tags = registry.register_all(&[a, BuiltinKind::Text.into(), b, a]).unwrap();
    /// assert_eq!(
    ///     tags,
    ///     vec![TypeTag::new(1), BuiltinKind::Text.tag(), TypeTag::new(2), TypeTag::new(1)]
    /// );
    /// ```
    pub fn register_all(&self, handles: &[TypeHandle]) -> Result<Vec<TypeTag>, Error> {
        let known: Result<Option<Vec<TypeTag>>, RegistryError> = {
            let tables = self.tables.read();
            handles.iter().map(|h| tables.existing(*h)).collect()
        };
        if let Some(tags) = known? {
            return Ok(tags);
        }

        Ok(self.tables.write().assign(handles)?)
    }

    /// The type bound to `tag`, if any.
    pub fn resolve(&self, tag: TypeTag) -> Option<TypeHandle> {
        self.tables.read().by_tag.get(&tag).copied()
    }

    /// The tag bound to the type called `name`, if any.
    pub fn tag_of(&self, name: &str) -> Option<TypeTag> {
        self.tables.read().by_name.get(name).copied()
    }

    /// A new registry with the same predefined bindings and no dynamic ones.
    pub fn fork_predefined(&self) -> TagRegistry {
        TagRegistry {
            tables: RwLock::new(self.tables.read().predefined()),
        }
    }

    /// How many dynamic tags have been handed out.
    pub fn dynamic_count(&self) -> u8 { self.tables.read().dynamic }

    /// A consistent snapshot of the dynamic bindings, in ascending tag order.
    pub fn dynamic_entries(&self) -> Vec<(TypeTag, TypeHandle)> {
        self.tables.read().dynamic_entries()
    }

    /// Replaces every dynamic binding with `entries`.
    ///
    /// The new table is validated in full before it is swapped in, so on error the
    /// registry is left exactly as it was. Predefined bindings are kept.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::Protocol`] if a tag falls outside `1..=entries.len()`,
    /// or if a tag or a type appears twice or clashes with a predefined binding.
    pub fn replace_dynamic<I>(&self, entries: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (TypeTag, TypeDescriptor)>,
    {
        let entries: Vec<_> = entries.into_iter().collect();
        if entries.len() > MAX_DYNAMIC_TAGS as usize {
            return Err(RegistryError::Protocol(format!(
                "{} dynamic types exceed the maximum of {}",
                entries.len(),
                MAX_DYNAMIC_TAGS
            ))
            .into());
        }
        let count = entries.len() as u8;

        let mut tables = self.tables.write();
        let mut staged = tables.predefined();

        for (tag, desc) in entries {
            if tag.get() < 1 || tag.get() as u8 > count {
                return Err(RegistryError::Protocol(format!(
                    "tag {} for {} is outside 1..={}",
                    tag,
                    desc.name(),
                    count
                ))
                .into());
            }
            if staged.by_tag.contains_key(&tag) || staged.by_name.contains_key(desc.name()) {
                return Err(RegistryError::Protocol(format!(
                    "{} at tag {} clashes with an earlier binding",
                    desc.name(),
                    tag
                ))
                .into());
            }
            staged
                .bind(TypeHandle::Dynamic(desc), tag)
                .map_err(RegistryError::Protocol)?;
        }
        staged.dynamic = count;

        if tables.dynamic > 0 {
            debug!(
                "replacing {} dynamic types with {} received ones",
                tables.dynamic, count
            );
        }
        *tables = staged;
        Ok(())
    }
}

impl Default for TagRegistry {
    fn default() -> Self { TagRegistry::new() }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let entries: Vec<_> = self
            .dynamic_entries()
            .into_iter()
            .map(|(tag, handle)| (tag.get(), handle.name()))
            .collect();
        f.debug_struct("TagRegistry")
            .field("dynamic", &entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread};

    fn named(name: &'static str) -> TypeHandle {
        TypeHandle::Dynamic(TypeDescriptor::new(name, || unreachable!()))
    }

    fn leak(s: String) -> &'static str { Box::leak(s.into_boxed_str()) }

    fn kind_of(err: &Error) -> RegistryError {
        err.downcast_ref::<RegistryError>()
            .cloned()
            .expect("not a registry error")
    }

    #[test]
    fn builtins_are_seeded() {
        let registry = TagRegistry::new();
        for kind in BuiltinKind::ALL.iter() {
            assert_eq!(registry.tag_of(kind.name()), Some(kind.tag()));
            assert_eq!(registry.resolve(kind.tag()), Some(TypeHandle::Builtin(*kind)));
        }
        assert_eq!(registry.dynamic_count(), 0);
        assert!(registry.dynamic_entries().is_empty());
    }

    #[test]
    fn builtin_tags_are_contiguous() {
        let tags: Vec<i8> = BuiltinKind::ALL.iter().map(|k| k.tag().get()).collect();
        assert_eq!(tags, (-126..=-116).collect::<Vec<i8>>());
        for kind in BuiltinKind::ALL.iter() {
            assert_eq!(BuiltinKind::from_tag(kind.tag()), Some(*kind));
            assert_eq!(BuiltinKind::from_name(kind.name()), Some(*kind));
        }
    }

    #[test]
    fn dynamic_tags_follow_first_sighting() {
        let registry = TagRegistry::new();
        let (a, b, c) = (named("A"), named("B"), named("C"));

        assert_eq!(registry.register_dynamic(a).unwrap().get(), 1);
        assert_eq!(registry.register_dynamic(b).unwrap().get(), 2);
        assert_eq!(registry.register_dynamic(a).unwrap().get(), 1);
        assert_eq!(registry.register_dynamic(c).unwrap().get(), 3);
        assert_eq!(registry.dynamic_count(), 3);

        for h in [a, b, c].iter() {
            let tag = registry.tag_of(h.name()).unwrap();
            assert_eq!(registry.resolve(tag), Some(*h));
        }
    }

    #[test]
    fn builtins_register_as_themselves() {
        let registry = TagRegistry::new();
        let tag = registry
            .register_dynamic(TypeHandle::Builtin(BuiltinKind::Long))
            .unwrap();
        assert_eq!(tag, BuiltinKind::Long.tag());
        assert_eq!(registry.dynamic_count(), 0);
    }

    #[test]
    fn overflow_after_127() {
        let registry = TagRegistry::new();
        for i in 0..127 {
            let tag = registry
                .register_dynamic(named(leak(format!("T{}", i))))
                .unwrap();
            assert_eq!(tag.get(), i as i8 + 1);
        }
        assert_eq!(registry.dynamic_count(), 127);

        let err = registry.register_dynamic(named("one.too.many")).unwrap_err();
        match kind_of(&err) {
            RegistryError::Overflow(_) => {}
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(registry.dynamic_count(), 127);
        assert_eq!(registry.tag_of("one.too.many"), None);

        // known types still resolve once full
        assert_eq!(registry.register_dynamic(named("T0")).unwrap().get(), 1);
    }

    #[test]
    fn dynamic_types_cannot_take_builtin_names() {
        let registry = TagRegistry::new();
        let err = registry
            .register_dynamic(named(BuiltinKind::Text.name()))
            .unwrap_err();
        assert!(matches!(kind_of(&err), RegistryError::Conflict(_)));
        assert_eq!(registry.dynamic_count(), 0);
        assert_eq!(
            registry.resolve(BuiltinKind::Text.tag()),
            Some(TypeHandle::Builtin(BuiltinKind::Text))
        );
        assert_ne!(named(BuiltinKind::Text.name()), TypeHandle::Builtin(BuiltinKind::Text));
    }

    #[test]
    fn register_all_is_all_or_nothing() {
        let registry = TagRegistry::new();
        for i in 0..126 {
            registry
                .register_dynamic(named(leak(format!("T{}", i))))
                .unwrap();
        }

        // one slot left, two new types
        let err = registry
            .register_all(&[named("last"), named("one.too.many")])
            .unwrap_err();
        assert!(matches!(kind_of(&err), RegistryError::Overflow(_)));
        assert_eq!(registry.dynamic_count(), 126);
        assert_eq!(registry.tag_of("last"), None);

        // a conflict later in the list stops earlier types too
        let err = registry
            .register_all(&[named("last"), named(BuiltinKind::Map.name())])
            .unwrap_err();
        assert!(matches!(kind_of(&err), RegistryError::Conflict(_)));
        assert_eq!(registry.tag_of("last"), None);

        // a repeated type only takes one slot
        let tags = registry
            .register_all(&[named("last"), named("T0"), named("last")])
            .unwrap();
        assert_eq!(
            tags,
            vec![TypeTag::new(127), TypeTag::new(1), TypeTag::new(127)]
        );
        assert_eq!(registry.dynamic_count(), 127);
    }

    #[test]
    fn predefined_conflicts_are_configuration_errors() {
        let registry = TagRegistry::new();

        // identical binding is fine
        registry
            .register_predefined(TypeHandle::Builtin(BuiltinKind::Int), BuiltinKind::Int.tag())
            .unwrap();

        let err = registry
            .register_predefined(TypeHandle::Builtin(BuiltinKind::Int), TypeTag::new(-1))
            .unwrap_err();
        assert!(matches!(kind_of(&err), RegistryError::Configuration(_)));

        let err = registry
            .register_predefined(named("Other"), BuiltinKind::Int.tag())
            .unwrap_err();
        assert!(matches!(kind_of(&err), RegistryError::Configuration(_)));

        let err = registry
            .register_predefined(named("Other"), TypeTag::new(5))
            .unwrap_err();
        assert!(matches!(kind_of(&err), RegistryError::Configuration(_)));
    }

    #[test]
    fn with_predefined_adds_bindings() {
        let registry =
            TagRegistry::with_predefined(vec![(named("extra"), TypeTag::new(-100))]).unwrap();
        assert_eq!(registry.tag_of("extra"), Some(TypeTag::new(-100)));
        assert_eq!(registry.dynamic_count(), 0);

        assert!(TagRegistry::with_predefined(vec![(named("x"), BuiltinKind::Null.tag())]).is_err());
    }

    #[test]
    fn forks_keep_only_predefined_bindings() {
        let registry =
            TagRegistry::with_predefined(vec![(named("extra"), TypeTag::new(-100))]).unwrap();
        registry.register_dynamic(named("local")).unwrap();

        let fork = registry.fork_predefined();
        assert_eq!(fork.tag_of("extra"), Some(TypeTag::new(-100)));
        assert_eq!(fork.tag_of("local"), None);
        assert_eq!(fork.dynamic_count(), 0);
        // the original is untouched
        assert_eq!(registry.tag_of("local"), Some(TypeTag::new(1)));
    }

    #[test]
    fn replace_swaps_the_dynamic_part() {
        let registry = TagRegistry::new();
        registry.register_dynamic(named("local")).unwrap();

        let incoming = vec![
            (TypeTag::new(1), TypeDescriptor::new("X", || unreachable!())),
            (TypeTag::new(2), TypeDescriptor::new("Y", || unreachable!())),
        ];
        registry.replace_dynamic(incoming).unwrap();

        assert_eq!(registry.dynamic_count(), 2);
        assert_eq!(registry.tag_of("local"), None);
        assert_eq!(registry.tag_of("Y"), Some(TypeTag::new(2)));
        assert_eq!(registry.tag_of(BuiltinKind::Map.name()), Some(BuiltinKind::Map.tag()));

        // the next local type continues after the received ones
        assert_eq!(registry.register_dynamic(named("Z")).unwrap().get(), 3);
    }

    #[test]
    fn replace_is_all_or_nothing() {
        let registry = TagRegistry::new();
        registry.register_dynamic(named("keep")).unwrap();

        let dup_name = vec![
            (TypeTag::new(1), TypeDescriptor::new("X", || unreachable!())),
            (TypeTag::new(2), TypeDescriptor::new("X", || unreachable!())),
        ];
        let dup_tag = vec![
            (TypeTag::new(1), TypeDescriptor::new("X", || unreachable!())),
            (TypeTag::new(1), TypeDescriptor::new("Y", || unreachable!())),
        ];
        let out_of_range = vec![(TypeTag::new(4), TypeDescriptor::new("X", || unreachable!()))];
        let builtin_name = vec![(
            TypeTag::new(1),
            TypeDescriptor::new(BuiltinKind::Text.name(), || unreachable!()),
        )];

        for bad in vec![dup_name, dup_tag, out_of_range, builtin_name] {
            let err = registry.replace_dynamic(bad).unwrap_err();
            assert!(matches!(kind_of(&err), RegistryError::Protocol(_)));
            assert_eq!(registry.dynamic_count(), 1);
            assert_eq!(registry.tag_of("keep"), Some(TypeTag::new(1)));
            assert_eq!(registry.tag_of("X"), None);
        }
    }

    #[test]
    fn concurrent_registration_hands_out_one_tag() {
        let registry = Arc::new(TagRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    (0..32)
                        .map(|i| {
                            registry
                                .register_dynamic(named(["P", "Q", "R", "S"][i % 4]))
                                .unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(registry.dynamic_count(), 4);
        let mut tags: Vec<i8> = ["P", "Q", "R", "S"]
            .iter()
            .map(|n| registry.tag_of(n).unwrap().get())
            .collect();
        tags.sort();
        assert_eq!(tags, vec![1, 2, 3, 4]);
        for (tag, handle) in registry.dynamic_entries() {
            assert_eq!(registry.tag_of(handle.name()), Some(tag));
        }
    }
}
