//! Deep copies through an in-memory buffer.
//!
//! A value is copied by writing it out and reading the bytes back into the target, so
//! the copy shares nothing with the source and any type that can be written can be
//! copied.

use crate::{
    encoding::{decode_full, encode_full},
    errors::{CopyError, RegistryError},
    rep::{Streamable, Writable},
};
use failure::Error;

/// Replaces the state of `target` with a copy of `source`.
///
/// # Errors
///
/// Fails with [`RegistryError::InvalidArgument`] before touching `target` if there is
/// no source. Any failure during the round trip comes back wrapped in a [`CopyError`].
///
/// # Example
///
/// ```
/// use tagmap::{clone::copy, prelude::*};
///
/// let mut source = SortedMapWritable::new();
/// source.put("k", 1i64).unwrap();
///
/// let mut target = SortedMapWritable::new();
/// copy(&mut target, Some(&source)).unwrap();
///
/// assert_eq!(target, source);
/// assert!(copy(&mut target, None).is_err());
/// ```
pub fn copy<T: Streamable + ?Sized>(target: &mut T, source: Option<&T>) -> Result<(), Error> {
    let source = match source {
        Some(source) => source,
        None => return Err(RegistryError::InvalidArgument("source map cannot be null".to_string()).into()),
    };
    round_trip(target, source).map_err(|e| CopyError::new(e).into())
}

/// A fresh copy of `w`, built by its descriptor's factory and filled by a round trip.
pub fn clone_writable(w: &dyn Writable) -> Result<Box<dyn Writable>, Error> {
    let mut fresh = w.descriptor().instantiate();
    let buf = encode_full(w).map_err(CopyError::new)?;
    decode_full(&mut *fresh, buf).map_err(CopyError::new)?;
    Ok(fresh)
}

fn round_trip<T: Streamable + ?Sized>(target: &mut T, source: &T) -> Result<(), Error> {
    let buf = encode_full(source)?;
    decode_full(target, buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encoding::{Input, Serializer, SerializerExt},
        registry::TypeDescriptor,
    };

    #[derive(Debug, Default, PartialEq)]
    struct Name(String);

    impl Streamable for Name {
        fn write_to(&self, out: &mut dyn Serializer) -> Result<(), Error> { out.put_utf(&self.0) }

        fn read_from(&mut self, input: &mut Input) -> Result<(), Error> {
            self.0 = input.read_utf()?;
            Ok(())
        }
    }

    impl Writable for Name {
        fn descriptor(&self) -> TypeDescriptor { TypeDescriptor::of::<Name>("test::Name") }
    }

    #[derive(Debug, Default)]
    struct Broken;

    impl Streamable for Broken {
        fn write_to(&self, out: &mut dyn Serializer) -> Result<(), Error> {
            out.put_i32(1);
            Ok(())
        }

        // expects more than was written
        fn read_from(&mut self, input: &mut Input) -> Result<(), Error> {
            input.read_i64()?;
            Ok(())
        }
    }

    #[test]
    fn copies_plain_streamables() {
        let source = Name("x".to_string());
        let mut target = Name::default();
        copy(&mut target, Some(&source)).unwrap();
        assert_eq!(target, source);
    }

    #[test]
    fn missing_source_leaves_target_alone() {
        let mut target = Name("keep".to_string());
        let err = copy(&mut target, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::InvalidArgument(_))
        ));
        assert_eq!(target.0, "keep");
    }

    #[test]
    fn round_trip_failures_are_copy_errors() {
        let err = copy(&mut Broken, Some(&Broken)).unwrap_err();
        let copy_err = err.downcast_ref::<CopyError>().unwrap();
        assert!(matches!(
            copy_err.inner().downcast_ref::<RegistryError>(),
            Some(RegistryError::Decode(_))
        ));
    }

    #[test]
    fn writables_clone_through_their_factory() {
        let w: Box<dyn Writable> = Box::new(Name("boxed".to_string()));
        let copy = clone_writable(&*w).unwrap();

        let mut out: Vec<u8> = Vec::new();
        copy.write_to(&mut out).unwrap();
        assert_eq!(out, vec![0, 5, b'b', b'o', b'x', b'e', b'd']);
        assert_eq!(copy.descriptor(), w.descriptor());
    }
}
