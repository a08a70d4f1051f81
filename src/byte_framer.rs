//! Length-prefixed binary framing.
//!
//! The mashup container is a sequence of little-endian `i32` sizes each
//! followed by exactly that many bytes. Reads that run past the end of the
//! buffer fail with [`XlconnectError::MalformedContainer`]; nothing is ever
//! silently truncated.

use crate::error::{Result, XlconnectError};

/// Cursor over an immutable byte buffer.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current read position.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left after the cursor.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Read `len` bytes and advance.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let start = self.offset;
        let end = start.checked_add(len).ok_or_else(|| overrun(start, len))?;
        let slice = self.data.get(start..end).ok_or_else(|| overrun(start, len))?;
        self.offset = end;
        Ok(slice)
    }

    /// Read a fixed 4-byte field (version markers).
    pub fn read_array4(&mut self) -> Result<[u8; 4]> {
        let bytes = self.read_bytes(4)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a little-endian `i32` and advance.
    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array4()?))
    }

    /// Read a size field followed by that many bytes.
    pub fn read_sized(&mut self) -> Result<&'a [u8]> {
        let at = self.offset;
        let size = self.read_i32_le()?;
        let len = usize::try_from(size).map_err(|_| {
            XlconnectError::MalformedContainer(format!("negative size {size} at offset {at}"))
        })?;
        self.read_bytes(len)
    }

    /// Everything after the cursor.
    pub fn read_to_end(&mut self) -> &'a [u8] {
        let rest = self.data.get(self.offset..).unwrap_or_default();
        self.offset = self.data.len();
        rest
    }
}

fn overrun(offset: usize, len: usize) -> XlconnectError {
    XlconnectError::MalformedContainer(format!(
        "read of {len} bytes at offset {offset} overruns buffer"
    ))
}

/// Little-endian bytes of a size field.
///
/// Fails when `len` does not fit a signed 32-bit size.
pub fn size_field(len: usize) -> Result<[u8; 4]> {
    let value = i32::try_from(len).map_err(|_| {
        XlconnectError::MalformedContainer(format!("section of {len} bytes is too large"))
    })?;
    Ok(int32_le_bytes(value))
}

#[must_use]
pub fn int32_le_bytes(value: i32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Concatenate slices into a fresh buffer.
#[must_use]
pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let total = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(total);
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}
