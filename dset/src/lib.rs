//! ## dset
//!
//! A read-only decoder for dset files, a columnar dataset format where each
//! column is stored either as
//!
//! - a **constant**: one value repeated for every row, or
//! - a **compressed** vector: a vocabulary of distinct values plus one
//!   vocabulary index per row, bit-packed at the smallest width that can
//!   address the vocabulary.
//!
//! Every cell is one of five kinds ([`CellKind`]): number (arbitrary precision
//! decimal), text, boolean, nothing, or error. Typed getters return `None`
//! when a cell holds another kind, never a default value.
//!
//! ```ignore
//! use dset::ColumnRead;
//!
//! let dataset = dset::from_path("sales.dset")?;
//! for column in dataset.columns() {
//!     if !column.is_empty() {
//!         println!("{}: {:?}", column.name(), column.kind(0));
//!     }
//! }
//! ```
//!
//! ## Cancellation
//!
//! A [`Decoder`] built with [`Decoder::with_cancellation`] polls its
//! [`CancellationToken`] between blocks, vocabulary entries and packed-byte
//! chunks, and stops with [`DsetError::Cancelled`].

mod err;
pub use err::DsetError;
pub mod bitpack;
mod column;
pub use column::{Column, ColumnRead, CompressedColumn, ConstantColumn};
mod config;
pub use config::{CancellationToken, DecoderConfig, DEFAULT_CHUNK_SIZE};
mod dataset;
pub use dataset::Dataset;
mod decoder;
pub use decoder::{
    BlockMetadata, Decoder, COMPRESSED_COLUMN_TYPE, COMPRESSED_FIELD_SECTION,
    CONSTANT_COLUMN_TYPE, VERSION,
};
mod reader;
mod symbol;
pub use symbol::SymbolType;
mod value;
pub use value::{CellKind, CellRef, CellValue, Nothing};
mod vocabulary;
pub use vocabulary::{Vocabulary, VocabularyEntry};

pub use bigdecimal::BigDecimal;

use std::{
    io::{Read, Seek},
    path::Path,
};

pub fn from_bytes(bytes: &[u8]) -> Result<Dataset, DsetError> {
    Decoder::new().decode_bytes(bytes)
}

pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Dataset, DsetError> {
    Decoder::new().decode(reader)
}

pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Dataset, DsetError> {
    Decoder::new().decode_file(path)
}

/// Lists the blocks of a dset file without decoding them.
pub fn scan_blocks<R: Read + Seek>(reader: R) -> Result<Vec<BlockMetadata>, DsetError> {
    Decoder::new().scan_blocks(reader)
}
