use bigdecimal::BigDecimal;

use crate::{
    bitpack::PackedIndices, CancellationToken, CellKind, CellRef, CellValue, DsetError, Nothing,
    Vocabulary,
};

/// Read access shared by every column representation.
///
/// Row arguments must be below [`ColumnRead::len`]; out-of-range rows panic
/// the way slice indexing does. The typed getters return `None` whenever the
/// cell holds a different kind, so for any row exactly one of them is `Some`.
pub trait ColumnRead {
    fn name(&self) -> &str;
    fn len(&self) -> usize;
    fn cell(&self, row: usize) -> CellRef<'_>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self, row: usize) -> CellKind {
        self.cell(row).kind()
    }

    fn number(&self, row: usize) -> Option<&BigDecimal> {
        self.cell(row).number()
    }

    fn text(&self, row: usize) -> Option<&str> {
        self.cell(row).text()
    }

    fn boolean(&self, row: usize) -> Option<bool> {
        self.cell(row).boolean()
    }

    fn nothing(&self, row: usize) -> Option<Nothing> {
        self.cell(row).nothing()
    }

    fn error(&self, row: usize) -> Option<&str> {
        self.cell(row).error()
    }
}

/// A column whose every row holds the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantColumn {
    name: String,
    len: usize,
    value: CellValue,
}

impl ConstantColumn {
    pub fn new(name: String, len: usize, value: CellValue) -> Self {
        Self { name, len, value }
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }
}

impl ColumnRead for ConstantColumn {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.len
    }

    fn cell(&self, row: usize) -> CellRef<'_> {
        assert!(
            row < self.len,
            "row {} out of range for column of {} rows",
            row,
            self.len
        );
        self.value.as_cell()
    }
}

/// A dictionary-compressed column: a vocabulary of distinct values and one
/// bit-packed vocabulary index per row.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedColumn {
    name: String,
    vocabulary: Vocabulary,
    indices: PackedIndices,
}

impl CompressedColumn {
    /// Checks that every row resolves to a vocabulary entry.
    pub(crate) fn new(
        name: String,
        vocabulary: Vocabulary,
        indices: PackedIndices,
        token: &CancellationToken,
    ) -> Result<Self, DsetError> {
        if let Some((row, index)) = indices.first_out_of_range(vocabulary.len(), token)? {
            return Err(DsetError::VocabularyIndexOutOfRange {
                column: name,
                row,
                index,
                len: vocabulary.len(),
            });
        }
        Ok(Self {
            name,
            vocabulary,
            indices,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn bit_width(&self) -> u32 {
        self.indices.bit_width()
    }

    /// The vocabulary position stored for `row`.
    pub fn vocabulary_index(&self, row: usize) -> usize {
        self.indices.get(row)
    }
}

impl ColumnRead for CompressedColumn {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.indices.len()
    }

    fn cell(&self, row: usize) -> CellRef<'_> {
        self.vocabulary.get(self.indices.get(row))
    }

    fn kind(&self, row: usize) -> CellKind {
        self.vocabulary.kind(self.indices.get(row))
    }
}

/// Either column representation behind one read interface.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Constant(ConstantColumn),
    Compressed(CompressedColumn),
}

impl Column {
    pub fn iter(&self) -> impl ExactSizeIterator<Item = CellRef<'_>> + '_ {
        (0..self.len()).map(move |row| self.cell(row))
    }

    /// Bits per packed row index, `None` for constant columns.
    pub fn bit_width(&self) -> Option<u32> {
        match self {
            Column::Constant(_) => None,
            Column::Compressed(c) => Some(c.bit_width()),
        }
    }

    fn inner(&self) -> &dyn ColumnRead {
        match self {
            Column::Constant(c) => c,
            Column::Compressed(c) => c,
        }
    }
}

impl ColumnRead for Column {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn len(&self) -> usize {
        self.inner().len()
    }

    fn cell(&self, row: usize) -> CellRef<'_> {
        self.inner().cell(row)
    }

    fn kind(&self, row: usize) -> CellKind {
        self.inner().kind(row)
    }
}

impl From<ConstantColumn> for Column {
    fn from(value: ConstantColumn) -> Self {
        Column::Constant(value)
    }
}

impl From<CompressedColumn> for Column {
    fn from(value: CompressedColumn) -> Self {
        Column::Compressed(value)
    }
}
