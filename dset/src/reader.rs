use std::io::{Read, Seek, SeekFrom};

use bigdecimal::{num_bigint::BigInt, BigDecimal};

use crate::{CancellationToken, DsetError};

pub(crate) const CONTINUATION_BIT: u8 = 1 << 7;

/// A 32-bit length never needs more than five 7-bit groups.
const MAX_VARINT_BYTES: u32 = 5;
const MAX_DECIMAL_SCALE: u32 = 28;
const DECIMAL_SIGN_BIT: u32 = 1 << 31;

#[inline]
pub(crate) fn low_bits_of_byte(byte: u8) -> u8 {
    byte & !CONTINUATION_BIT
}

/// Little-endian primitive reader over a seekable input.
///
/// Positions are absolute stream offsets, so block boundaries recorded while
/// scanning can be handed straight back to [`BinaryReader::seek_to`].
pub(crate) struct BinaryReader<R> {
    inner: R,
    pos: u64,
    len: u64,
}

impl<R: Read + Seek> BinaryReader<R> {
    pub(crate) fn new(mut inner: R) -> Result<Self, DsetError> {
        let pos = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(pos))?;
        Ok(Self { inner, pos, len })
    }

    pub(crate) fn position(&self) -> u64 {
        self.pos
    }

    pub(crate) fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }

    pub(crate) fn has_remaining(&self) -> bool {
        self.pos < self.len
    }

    pub(crate) fn seek_to(&mut self, pos: u64) -> Result<(), DsetError> {
        self.pos = self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Reads up to `N` bytes, returning `None` if the input ends first.
    pub(crate) fn try_take_array<const N: usize>(&mut self) -> Result<Option<[u8; N]>, DsetError> {
        if self.remaining() < N as u64 {
            return Ok(None);
        }
        self.take_array().map(Some)
    }

    pub(crate) fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DsetError> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        self.pos += N as u64;
        Ok(buf)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, DsetError> {
        let [byte] = self.take_array::<1>()?;
        Ok(byte)
    }

    pub(crate) fn read_i8(&mut self) -> Result<i8, DsetError> {
        Ok(i8::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16, DsetError> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32, DsetError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, DsetError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    /// Reads an `int32` that the format uses as a count or a length.
    pub(crate) fn read_len(&mut self, what: &str) -> Result<usize, DsetError> {
        let value = self.read_i32()?;
        usize::try_from(value)
            .map_err(|_| DsetError::InvalidData(format!("negative {} {}", what, value)))
    }

    /// Reads a 7-bit encoded length prefix, low group first.
    pub(crate) fn read_varint_len(&mut self) -> Result<usize, DsetError> {
        let mut value: u64 = 0;
        for group in 0..MAX_VARINT_BYTES {
            let byte = self.read_u8()?;
            value |= u64::from(low_bits_of_byte(byte)) << (7 * group);
            if byte & CONTINUATION_BIT == 0 {
                return i32::try_from(value)
                    .ok()
                    .and_then(|v| usize::try_from(v).ok())
                    .ok_or_else(|| {
                        DsetError::InvalidData(format!("string length {} out of range", value))
                    });
            }
        }
        Err(DsetError::InvalidData(
            "7-bit encoded length is too long".to_string(),
        ))
    }

    pub(crate) fn read_string(&mut self) -> Result<String, DsetError> {
        let len = self.read_varint_len()?;
        if len as u64 > self.remaining() {
            return Err(DsetError::InvalidData(format!(
                "string of {} bytes runs past the end of input",
                len
            )));
        }
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        self.pos += len as u64;
        String::from_utf8(buf).map_err(|e| DsetError::InvalidData(e.to_string()))
    }

    /// Reads a 128-bit decimal: a 96-bit magnitude in three little-endian
    /// words followed by a flags word carrying the scale (bits 16..24) and
    /// the sign (bit 31).
    pub(crate) fn read_decimal(&mut self) -> Result<BigDecimal, DsetError> {
        let lo = self.read_u32()?;
        let mid = self.read_u32()?;
        let hi = self.read_u32()?;
        let flags = self.read_u32()?;
        let scale = (flags >> 16) & 0xFF;
        if scale > MAX_DECIMAL_SCALE {
            return Err(DsetError::InvalidData(format!(
                "decimal scale {} exceeds {}",
                scale, MAX_DECIMAL_SCALE
            )));
        }
        let magnitude = (u128::from(hi) << 64) | (u128::from(mid) << 32) | u128::from(lo);
        let mut digits = BigInt::from(magnitude);
        if flags & DECIMAL_SIGN_BIT != 0 {
            digits = -digits;
        }
        Ok(BigDecimal::new(digits, i64::from(scale)))
    }

    /// Fills a buffer of `len` bytes in reads of at most `chunk_size`,
    /// checking `token` before every chunk.
    pub(crate) fn read_chunked(
        &mut self,
        len: usize,
        chunk_size: usize,
        token: &CancellationToken,
    ) -> Result<Vec<u8>, DsetError> {
        if len as u64 > self.remaining() {
            return Err(DsetError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "{} packed bytes requested, {} left in input",
                    len,
                    self.remaining()
                ),
            )));
        }
        let mut buf = vec![0u8; len];
        for chunk in buf.chunks_mut(chunk_size.max(1)) {
            token.check()?;
            self.inner.read_exact(chunk)?;
            self.pos += chunk.len() as u64;
            tracing::trace!(read = chunk.len(), at = self.pos, "packed chunk");
        }
        Ok(buf)
    }
}
