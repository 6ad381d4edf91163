use std::io::{Read, Seek};

use bigdecimal::BigDecimal;

use crate::{
    reader::BinaryReader, symbol::read_symbol, CancellationToken, CellKind, CellRef, CellValue,
    DsetError,
};

/// One distinct value of a compressed column.
///
/// `index` points into the kind's backing array: `strings` for text and
/// errors, `decimals` for numbers. Booleans store the value itself
/// (`1` is true, `0` is false) and nothing ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocabularyEntry {
    pub kind: CellKind,
    pub index: u32,
}

/// The deduplicated values of a compressed column, addressed by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    strings: Vec<String>,
    decimals: Vec<BigDecimal>,
    entries: Vec<VocabularyEntry>,
}

impl Vocabulary {
    /// Reads `len` consecutive symbols.
    pub(crate) fn decode<R: Read + Seek>(
        reader: &mut BinaryReader<R>,
        len: usize,
        token: &CancellationToken,
    ) -> Result<Self, DsetError> {
        // every entry takes at least its tag byte
        let capacity = len.min(usize::try_from(reader.remaining()).unwrap_or(usize::MAX));
        let mut vocabulary = Vocabulary {
            entries: Vec::with_capacity(capacity),
            ..Default::default()
        };
        for _ in 0..len {
            token.check()?;
            vocabulary.push(read_symbol(reader)?)?;
        }
        Ok(vocabulary)
    }

    /// Builds a vocabulary from already distinct values, in order.
    pub fn from_values<I: IntoIterator<Item = CellValue>>(values: I) -> Result<Self, DsetError> {
        let mut vocabulary = Vocabulary::default();
        for value in values {
            vocabulary.push(value)?;
        }
        Ok(vocabulary)
    }

    fn push(&mut self, value: CellValue) -> Result<(), DsetError> {
        let entry = match value {
            CellValue::Number(n) => {
                let index = slot(self.decimals.len())?;
                self.decimals.push(n);
                VocabularyEntry {
                    kind: CellKind::Number,
                    index,
                }
            }
            CellValue::Text(s) => {
                let index = slot(self.strings.len())?;
                self.strings.push(s);
                VocabularyEntry {
                    kind: CellKind::Text,
                    index,
                }
            }
            CellValue::Error(s) => {
                let index = slot(self.strings.len())?;
                self.strings.push(s);
                VocabularyEntry {
                    kind: CellKind::Error,
                    index,
                }
            }
            CellValue::Boolean(b) => VocabularyEntry {
                kind: CellKind::Boolean,
                index: u32::from(b),
            },
            CellValue::Nothing => VocabularyEntry {
                kind: CellKind::Nothing,
                index: 0,
            },
        };
        self.entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    pub fn kind(&self, i: usize) -> CellKind {
        self.entries[i].kind
    }

    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    pub fn get(&self, i: usize) -> CellRef<'_> {
        let entry = self.entries[i];
        let index = entry.index as usize;
        match entry.kind {
            CellKind::Number => CellRef::Number(&self.decimals[index]),
            CellKind::Text => CellRef::Text(&self.strings[index]),
            CellKind::Error => CellRef::Error(&self.strings[index]),
            CellKind::Boolean => CellRef::Boolean(entry.index == 1),
            CellKind::Nothing => CellRef::Nothing,
        }
    }
}

fn slot(len: usize) -> Result<u32, DsetError> {
    u32::try_from(len)
        .map_err(|_| DsetError::InvalidData("vocabulary backing array overflow".to_string()))
}
