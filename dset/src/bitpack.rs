//! Variable-width vocabulary indices, packed least significant bit first.
//!
//! Row `i` of a column with bit width `w` occupies bits `i * w .. (i + 1) * w`
//! of the buffer, where bit `k` is bit `k % 8` of byte `k / 8`. Rows are not
//! byte aligned; only the end of the buffer is padded to a whole byte.

use std::io::{Read, Seek};

use crate::{reader::BinaryReader, CancellationToken, DsetError};

/// Rows validated between two cancellation checks.
const VALIDATE_BATCH: usize = 1 << 16;

/// Number of bits needed to address every entry of a vocabulary of
/// `vocabulary_len` entries, i.e. the bit length of the largest index.
///
/// A vocabulary of one entry needs no bits at all: every row resolves to
/// entry `0`. An empty vocabulary is given width `0` as well; it can only
/// describe a column without rows.
pub fn bit_width(vocabulary_len: usize) -> u32 {
    match vocabulary_len {
        0 | 1 => 0,
        n => usize::BITS - (n - 1).leading_zeros(),
    }
}

/// Size in bytes of the packed buffer holding `rows` indices of `bit_width`
/// bits, or `None` if it does not fit in memory.
pub fn packed_len(bit_width: u32, rows: usize) -> Option<usize> {
    let bits = u64::from(bit_width).checked_mul(rows as u64)?;
    usize::try_from(bits.div_ceil(8)).ok()
}

/// Extracts the index stored for `row`.
///
/// # Panics
///
/// Panics if the row's bits lie outside `bytes`.
#[inline]
pub fn unpack_index(bytes: &[u8], bit_width: u32, row: usize) -> usize {
    if bit_width == 0 {
        return 0;
    }
    let first_bit = row as u64 * u64::from(bit_width);
    let mut byte_index = (first_bit / 8) as usize;
    let bit_offset = (first_bit % 8) as u32;
    // wide enough for a 32-bit index straddling five bytes
    let mut acc = u64::from(bytes[byte_index]) >> bit_offset;
    let mut bits_read = 8 - bit_offset;
    while bits_read < bit_width {
        byte_index += 1;
        acc |= u64::from(bytes[byte_index]) << bits_read;
        bits_read += 8;
    }
    (acc & mask(bit_width)) as usize
}

#[inline]
fn mask(bit_width: u32) -> u64 {
    (1u64 << bit_width) - 1
}

/// The packed index vector of a compressed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PackedIndices {
    bytes: Vec<u8>,
    bit_width: u32,
    rows: usize,
}

impl PackedIndices {
    /// Reads the packed buffer for `rows` indices in bounded chunks.
    pub(crate) fn read<R: Read + Seek>(
        reader: &mut BinaryReader<R>,
        bit_width: u32,
        rows: usize,
        chunk_size: usize,
        token: &CancellationToken,
    ) -> Result<Self, DsetError> {
        let len = packed_len(bit_width, rows).ok_or_else(|| {
            DsetError::InvalidData(format!("{} rows of {} bits overflow", rows, bit_width))
        })?;
        let bytes = reader.read_chunked(len, chunk_size, token)?;
        Ok(Self {
            bytes,
            bit_width,
            rows,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: Vec<u8>, bit_width: u32, rows: usize) -> Self {
        assert!(bytes.len() >= packed_len(bit_width, rows).unwrap());
        Self {
            bytes,
            bit_width,
            rows,
        }
    }

    pub(crate) fn bit_width(&self) -> u32 {
        self.bit_width
    }

    pub(crate) fn len(&self) -> usize {
        self.rows
    }

    pub(crate) fn get(&self, row: usize) -> usize {
        assert!(
            row < self.rows,
            "row {} out of range for column of {} rows",
            row,
            self.rows
        );
        unpack_index(&self.bytes, self.bit_width, row)
    }

    /// Finds the first row whose index is not below `bound`.
    pub(crate) fn first_out_of_range(
        &self,
        bound: usize,
        token: &CancellationToken,
    ) -> Result<Option<(usize, usize)>, DsetError> {
        if self.rows == 0 || (self.bit_width < usize::BITS && bound >> self.bit_width > 0) {
            // every representable index is below the bound
            return Ok(None);
        }
        for start in (0..self.rows).step_by(VALIDATE_BATCH) {
            token.check()?;
            let end = (start + VALIDATE_BATCH).min(self.rows);
            for row in start..end {
                let index = unpack_index(&self.bytes, self.bit_width, row);
                if index >= bound {
                    return Ok(Some((row, index)));
                }
            }
        }
        Ok(None)
    }
}
