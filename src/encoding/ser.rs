use super::*;

/// A sink for encoded bytes.
///
/// This is object safe, so [`Streamable`](crate::rep::Streamable) values can write into a
/// `&mut dyn Serializer`.
pub trait Serializer {
    /// Add a byte to the output value.
    fn put_u8(&mut self, u: u8);
    /// Add a slice to the output value.
    fn put_slice(&mut self, slice: &[u8]);
}

/// Convenience methods for [`Serializer`].
///
/// Multi-byte integers are written big-endian.
pub trait SerializerExt: Serializer {
    /// Add an [`i8`] to the output value.
    ///
    /// # Arguments
    ///
    /// * `i: i8`  - The value to be added.
    fn put_i8(&mut self, i: i8) { self.put_u8(i as u8) }
    /// Add a [`u16`] to the output value.
    ///
    /// # Arguments
    ///
    /// * `u: u16`  - The value to be added.
    fn put_u16(&mut self, u: u16) { self.put_slice(&u.to_be_bytes()) }
    /// Add an [`i32`] to the output value.
    ///
    /// # Arguments
    ///
    /// * `i: i32`  - The value to be added.
    fn put_i32(&mut self, i: i32) { self.put_slice(&i.to_be_bytes()) }
    /// Add an [`i64`] to the output value.
    ///
    /// # Arguments
    ///
    /// * `i: i64`  - The value to be added.
    fn put_i64(&mut self, i: i64) { self.put_slice(&i.to_be_bytes()) }
    /// Add an [`f64`] to the output value, as its raw bits.
    fn put_f64(&mut self, f: f64) { self.put_i64(f.to_bits() as i64) }
    /// Add a [`bool`] to the output value.
    fn put_bool(&mut self, b: bool) { self.put_u8(b as u8) }

    /// Add a zero-compressed variable-length integer.
    ///
    /// # Arguments
    ///
    /// * `i: i64` - The value to be added.
    fn put_vlong(&mut self, mut i: i64) {
        if i >= VINT_MIN && i <= i8::max_value() as i64 {
            self.put_i8(i as i8);
            return;
        }

        let mut marker = VINT_MIN as i8 - 1;
        if i < 0 {
            i ^= -1;
            marker = VINT_NEG_MARKER - 1;
        }

        let len = 8 - (i.leading_zeros() / 8) as usize;
        self.put_i8(marker - (len as i8 - 1));
        self.put_slice(&i.to_be_bytes()[8 - len..]);
    }

    /// Add a string in its length-prefixed modified UTF-8 form.
    ///
    /// # Errors
    ///
    /// Fails if the encoded string is longer than `u16::max_value()` bytes.
    fn put_utf(&mut self, s: &str) -> Result<(), Error> {
        let enc = to_modified_utf8(s);
        if enc.len() > MAX_UTF_LEN {
            return Err(RegistryError::Encode(format!(
                "encoded string is {} bytes long, at most {} fit",
                enc.len(),
                MAX_UTF_LEN
            ))
            .into());
        }
        self.put_u16(enc.len() as u16);
        self.put_slice(&enc);
        Ok(())
    }

    /// Add a length-prefixed UTF-8 text, the length being a varint.
    fn put_text(&mut self, s: &str) {
        self.put_vlong(s.len() as i64);
        self.put_slice(s.as_bytes());
    }

    /// Add a byte blob prefixed by its length as an [`i32`].
    ///
    /// # Errors
    ///
    /// Fails if the blob is longer than `i32::max_value()` bytes.
    fn put_blob(&mut self, b: &[u8]) -> Result<(), Error> {
        if b.len() > i32::max_value() as usize {
            return Err(
                RegistryError::Encode(format!("blob of {} bytes is too long", b.len())).into(),
            );
        }
        self.put_i32(b.len() as i32);
        self.put_slice(b);
        Ok(())
    }

    /// Add a type tag.
    fn put_tag(&mut self, tag: TypeTag) { self.put_i8(tag.get()) }
}

impl<S: Serializer + ?Sized> SerializerExt for S {}

impl Serializer for Vec<u8> {
    fn put_u8(&mut self, u: u8) { self.push(u) }

    fn put_slice(&mut self, slice: &[u8]) { self.extend_from_slice(slice) }
}
