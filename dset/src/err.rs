use thiserror::Error;

#[derive(Error, Debug)]
pub enum DsetError {
    #[error("Wrong file header format.")]
    MalformedHeader,
    #[error("Unsupported item type: {0}")]
    UnsupportedColumnType(String),
    #[error("Unknown symbol type: {0}")]
    UnsupportedSymbolType(u8),
    #[error("decoding was cancelled")]
    Cancelled,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("`{0}` during dset decoding")]
    InvalidData(String),
    #[error("row {row} of column `{column}` points at vocabulary entry {index}, but the vocabulary has {len} entries")]
    VocabularyIndexOutOfRange {
        column: String,
        row: usize,
        index: usize,
        len: usize,
    },
    #[error("column `{column}` has {found} rows, expected {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

impl DsetError {
    /// Whether the decode stopped because the caller asked it to, rather than
    /// because of a problem with the input.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DsetError::Cancelled)
    }
}
