use super::*;
use bytes::Buf;
use std::ops::{Deref, DerefMut};

/// A cursor over encoded bytes.
///
/// Every read checks the remaining length first and fails with a
/// [`RegistryError::Decode`] instead of panicking on short input.
///
/// The cursor also tracks how deeply containers are nested, and refuses to go past
/// [`MAX_NESTING`] levels.
#[derive(Clone, Debug, Default)]
pub struct Input {
    buf: Bytes,
    depth: usize,
}

impl Deref for Input {
    type Target = Bytes;

    fn deref(&self) -> &Bytes { &self.buf }
}

impl DerefMut for Input {
    fn deref_mut(&mut self) -> &mut Bytes { &mut self.buf }
}

impl From<Bytes> for Input {
    fn from(buf: Bytes) -> Self { Input { buf, depth: 0 } }
}

impl From<Vec<u8>> for Input {
    fn from(v: Vec<u8>) -> Self { Input::from(Bytes::from(v)) }
}

impl<'a> From<&'a [u8]> for Input {
    fn from(s: &'a [u8]) -> Self { Input::from(Bytes::copy_from_slice(s)) }
}

#[inline]
fn malformed(msg: String) -> Error { RegistryError::Decode(msg).into() }

#[inline]
fn short(wanted: usize, left: usize) -> Error {
    malformed(format!(
        "tried to read {} bytes from buffer of size {}",
        wanted, left
    ))
}

impl Input {
    #[inline]
    fn ensure(&self, len: usize) -> Result<(), Error> {
        if self.buf.remaining() >= len {
            Ok(())
        } else {
            Err(short(len, self.buf.remaining()))
        }
    }

    /// Whether every byte has been consumed.
    pub fn is_exhausted(&self) -> bool { !self.buf.has_remaining() }

    /// Fails with [`RegistryError::Decode`] unless every byte has been consumed.
    pub fn ensure_exhausted(&self) -> Result<(), Error> {
        if self.is_exhausted() {
            Ok(())
        } else {
            Err(malformed(format!("{} trailing bytes", self.buf.remaining())))
        }
    }

    /// Runs `f` one nesting level deeper.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::Decode`] if that would exceed [`MAX_NESTING`].
    pub fn nested<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Input) -> Result<T, Error>,
    {
        if self.depth >= MAX_NESTING {
            return Err(malformed(format!(
                "containers nested deeper than {} levels",
                MAX_NESTING
            )));
        }
        self.depth += 1;
        let res = f(self);
        self.depth -= 1;
        res
    }

    /// Read `len` bytes.
    #[inline]
    pub fn read_many(&mut self, len: usize) -> Result<Bytes, Error> {
        self.ensure(len)?;
        Ok(self.buf.split_to(len))
    }

    /// Read a [`u8`].
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    /// Read an [`i8`].
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, Error> {
        self.ensure(1)?;
        Ok(self.buf.get_i8())
    }

    /// Read a big-endian [`u16`].
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, Error> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    /// Read a big-endian [`i32`].
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    /// Read a big-endian [`i64`].
    #[inline]
    pub fn read_i64(&mut self) -> Result<i64, Error> {
        self.ensure(8)?;
        Ok(self.buf.get_i64())
    }

    /// Read an [`f64`] from its raw bits.
    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, Error> { Ok(f64::from_bits(self.read_i64()? as u64)) }

    /// Read a [`bool`]. Any non-zero byte is `true`.
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, Error> { Ok(self.read_u8()? != 0) }

    /// Read a type tag.
    #[inline]
    pub fn read_tag(&mut self) -> Result<TypeTag, Error> { Ok(TypeTag::new(self.read_i8()?)) }

    /// Read a zero-compressed variable-length integer.
    pub fn read_vlong(&mut self) -> Result<i64, Error> {
        let first = self.read_i8()?;
        if first as i64 >= VINT_MIN {
            return Ok(first as i64);
        }

        let neg = first < VINT_NEG_MARKER;
        let len = (if neg {
            VINT_NEG_MARKER - first
        } else {
            VINT_MIN as i8 - first
        }) as usize;
        if len > 8 {
            return Err(malformed(format!("varint length marker {} is out of range", first)));
        }

        let digs = self.read_many(len)?;
        let i = digs.iter().fold(0i64, |acc, d| (acc << 8) | *d as i64);
        Ok(if neg { i ^ -1 } else { i })
    }

    /// Read a varint that must be a non-negative length.
    pub fn read_len(&mut self) -> Result<usize, Error> {
        let len = self.read_vlong()?;
        if len < 0 || len > i32::max_value() as i64 {
            return Err(malformed(format!("length {} is out of range", len)));
        }
        Ok(len as usize)
    }

    /// Read a length-prefixed modified UTF-8 string.
    pub fn read_utf(&mut self) -> Result<String, Error> {
        let len = self.read_u16()? as usize;
        let bs = self.read_many(len)?;
        from_modified_utf8(&bs)
    }

    /// Read a varint-prefixed UTF-8 text.
    pub fn read_text(&mut self) -> Result<String, Error> {
        let len = self.read_len()?;
        let bs = self.read_many(len)?;
        String::from_utf8(bs.to_vec()).map_err(|e| malformed(format!("text is not UTF-8: {}", e)))
    }

    /// Read a byte blob prefixed by its length as an [`i32`].
    pub fn read_blob(&mut self) -> Result<Bytes, Error> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(malformed(format!("negative blob length {}", len)));
        }
        self.read_many(len as usize)
    }
}
