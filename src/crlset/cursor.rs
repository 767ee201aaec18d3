use super::errors::{DecodeError, DecodeResult};

/// A read position over an immutable buffer.
///
/// Reads either return exactly the requested number of bytes and move the
/// position past them, or fail and leave the position untouched.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn has_more(&self) -> bool {
        self.remaining() > 0
    }

    /// Returns the next `length` bytes. Empty reads are rejected.
    pub fn take(&mut self, length: usize) -> DecodeResult<&'a [u8]> {
        let available = self.remaining();
        if length < 1 || length > available {
            return Err(DecodeError::TruncatedInput {
                wanted: length,
                available,
            });
        }

        let slice = &self.buffer[self.position..self.position + length];
        self.position += length;

        Ok(slice)
    }

    /// Reads the body of a length-prefixed field, where a declared length of
    /// zero is a legitimate empty value.
    pub fn take_prefixed(&mut self, length: usize) -> DecodeResult<&'a [u8]> {
        match length {
            0 => Ok(&[]),
            _ => self.take(length),
        }
    }

    pub fn take_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);

        Ok(array)
    }

    pub fn take_u8(&mut self) -> DecodeResult<u8> {
        let [byte] = self.take_array::<1>()?;
        Ok(byte)
    }

    pub fn take_u16_le(&mut self) -> DecodeResult<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn take_u32_le(&mut self) -> DecodeResult<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    /// Consumes everything left in the buffer.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.buffer[self.position..];
        self.position = self.buffer.len();

        rest
    }
}
