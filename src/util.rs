use crate::errors::RegistryError;
use failure::Error;

/// Helper macro to make implementing `From` easier.
macro_rules! from_fn {
    ($to:ty, $from:ty, $fn:expr) => {
        impl From<$from> for $to {
            fn from(f: $from) -> $to { $fn(f) }
        }
    };
}

/// Converts a string into its modified UTF-8 form.
///
/// Modified UTF-8 writes `U+0000` as two bytes and characters outside the basic
/// multilingual plane as a pair of three-byte surrogates.
///
/// # Arguments
///
/// * `s: &str` - The string to be converted.
///
/// # Example
///
/// ```
/// use tagmap::util::to_modified_utf8;
///
/// assert_eq!(to_modified_utf8("A"), vec![b'A']);
/// assert_eq!(to_modified_utf8("\0"), vec![0xc0, 0x80]);
/// ```
pub fn to_modified_utf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007f => out.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                out.push(0xc0 | ((unit >> 6) & 0x1f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | ((unit >> 12) & 0x0f) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }
    out
}

/// Converts modified UTF-8 back into a [`String`].
///
/// # Arguments
///
/// * `bs: &[u8]` - The encoded bytes, without their length prefix.
///
/// # Errors
///
/// Fails with [`RegistryError::Decode`] on malformed sequences and unpaired
/// surrogates.
pub fn from_modified_utf8(bs: &[u8]) -> Result<String, Error> {
    let mut units = Vec::with_capacity(bs.len());
    let mut ix = 0;
    while ix < bs.len() {
        let b = bs[ix];
        if b & 0x80 == 0 {
            units.push(b as u16);
            ix += 1;
        } else if b & 0xe0 == 0xc0 {
            let b2 = continuation(bs, ix + 1)?;
            units.push((((b & 0x1f) as u16) << 6) | b2);
            ix += 2;
        } else if b & 0xf0 == 0xe0 {
            let b2 = continuation(bs, ix + 1)?;
            let b3 = continuation(bs, ix + 2)?;
            units.push((((b & 0x0f) as u16) << 12) | (b2 << 6) | b3);
            ix += 3;
        } else {
            return Err(malformed(format!("bad lead byte {:#x} at {}", b, ix)));
        }
    }
    String::from_utf16(&units).map_err(|e| malformed(e.to_string()))
}

#[inline]
fn continuation(bs: &[u8], ix: usize) -> Result<u16, Error> {
    match bs.get(ix) {
        Some(b) if b & 0xc0 == 0x80 => Ok((b & 0x3f) as u16),
        Some(b) => Err(malformed(format!("bad continuation byte {:#x}", b))),
        None => Err(malformed("truncated sequence".to_string())),
    }
}

fn malformed(msg: String) -> Error {
    RegistryError::Decode(format!("malformed modified UTF-8: {}", msg)).into()
}
