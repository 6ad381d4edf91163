//! Block scanner for dset files.
//!
//! ```text
//! file    := "HIBC00" block*
//! block   := table_name:str section_type:str block_len:i32
//!            field_name:str column_type:str payload
//! ```
//!
//! `block_len` counts the bytes after itself. Once a recognized column type
//! has been parsed the reader always jumps to the end of the block, however
//! much of the payload it consumed, so a payload may grow new trailing fields
//! without breaking older readers. Unknown column types are fatal.

use std::{
    fs::File,
    io::{BufReader, Cursor, Read, Seek},
    path::Path,
};

use serde::Serialize;

use crate::{
    bitpack::{self, PackedIndices},
    reader::BinaryReader,
    symbol::read_symbol,
    CancellationToken, Column, ColumnRead, CompressedColumn, ConstantColumn, Dataset,
    DecoderConfig, DsetError, Vocabulary,
};

/// The 6-byte version tag every file starts with.
pub const VERSION: &[u8; 6] = b"HIBC00";
pub const COMPRESSED_COLUMN_TYPE: &str = "Column.Compressed";
pub const CONSTANT_COLUMN_TYPE: &str = "Column.Constant";
/// The only section type written so far; it is recorded but not interpreted.
pub const COMPRESSED_FIELD_SECTION: &str = "EasyMorph.CompressedField.0";

/// The framing of one block, as found in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockMetadata {
    pub table_name: String,
    pub section_type: String,
    /// Stream offset right after the block length field.
    pub content_start: u64,
    /// Bytes from `content_start` to the end of the block.
    pub content_len: u64,
    pub field_name: String,
    pub column_type: String,
}

impl BlockMetadata {
    pub fn content_end(&self) -> u64 {
        self.content_start + self.content_len
    }

    fn read<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<Self, DsetError> {
        let table_name = reader.read_string()?;
        let section_type = reader.read_string()?;
        let content_len = reader.read_len("block length")? as u64;
        let content_start = reader.position();
        let field_name = reader.read_string()?;
        let column_type = reader.read_string()?;
        Ok(Self {
            table_name,
            section_type,
            content_start,
            content_len,
            field_name,
            column_type,
        })
    }
}

/// Decodes dset files into [`Dataset`]s.
///
/// A `Decoder` holds no state between calls; one value can decode any number
/// of inputs, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
    token: CancellationToken,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            token: CancellationToken::new(),
        }
    }

    /// Makes every decode started from this value observe `token`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<Dataset, DsetError> {
        self.decode(Cursor::new(bytes))
    }

    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> Result<Dataset, DsetError> {
        let file = File::open(path)?;
        self.decode(BufReader::new(file))
    }

    /// Decodes the whole input. Either every block decodes or nothing is
    /// returned.
    ///
    /// The table name of the last block names the dataset. Without any block
    /// the dataset is unnamed and empty.
    pub fn decode<R: Read + Seek>(&self, input: R) -> Result<Dataset, DsetError> {
        let mut reader = BinaryReader::new(input)?;
        read_header(&mut reader)?;

        let mut table_name = String::new();
        let mut columns = Vec::new();
        while reader.has_remaining() {
            self.token.check()?;
            let block = BlockMetadata::read(&mut reader)?;
            let column = match block.column_type.as_str() {
                COMPRESSED_COLUMN_TYPE => {
                    self.read_compressed(&mut reader, block.field_name.clone())?
                }
                CONSTANT_COLUMN_TYPE => self.read_constant(&mut reader, block.field_name.clone())?,
                _ => return Err(DsetError::UnsupportedColumnType(block.column_type)),
            };
            tracing::debug!(
                table = %block.table_name,
                field = %block.field_name,
                column_type = %block.column_type,
                rows = column.len(),
                bit_width = column.bit_width(),
                "decoded block"
            );
            columns.push(column);
            reader.seek_to(block.content_end())?;
            table_name = block.table_name;
        }

        let dataset = Dataset::new(table_name, columns)?;
        tracing::debug!(
            table = %dataset.name(),
            columns = dataset.columns_count(),
            rows = dataset.rows_count(),
            "decoded dataset"
        );
        Ok(dataset)
    }

    fn read_constant<R: Read + Seek>(
        &self,
        reader: &mut BinaryReader<R>,
        name: String,
    ) -> Result<Column, DsetError> {
        let value = read_symbol(reader)?;
        let len = reader.read_len("column length")?;
        Ok(ConstantColumn::new(name, len, value).into())
    }

    fn read_compressed<R: Read + Seek>(
        &self,
        reader: &mut BinaryReader<R>,
        name: String,
    ) -> Result<Column, DsetError> {
        self.token.check()?;
        let vocabulary_len = reader.read_len("vocabulary length")?;
        let vocabulary = Vocabulary::decode(reader, vocabulary_len, &self.token)?;
        let bit_width = bitpack::bit_width(vocabulary.len());
        let rows = reader.read_len("vector length")?;
        let indices = PackedIndices::read(
            reader,
            bit_width,
            rows,
            self.config.effective_chunk_size(),
            &self.token,
        )?;
        tracing::trace!(field = %name, vocabulary_len, bit_width, rows, "compressed column");
        Ok(CompressedColumn::new(name, vocabulary, indices, &self.token)?.into())
    }

    /// Lists the blocks of the input without decoding their payloads.
    ///
    /// Unlike [`Decoder::decode`] this accepts any column type, so it can
    /// describe files the decoder refuses.
    pub fn scan_blocks<R: Read + Seek>(&self, input: R) -> Result<Vec<BlockMetadata>, DsetError> {
        let mut reader = BinaryReader::new(input)?;
        read_header(&mut reader)?;
        let mut blocks = Vec::new();
        while reader.has_remaining() {
            self.token.check()?;
            let block = BlockMetadata::read(&mut reader)?;
            reader.seek_to(block.content_end())?;
            blocks.push(block);
        }
        Ok(blocks)
    }
}

fn read_header<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<(), DsetError> {
    match reader.try_take_array::<6>()? {
        Some(ref header) if header == VERSION => Ok(()),
        _ => Err(DsetError::MalformedHeader),
    }
}
