use arbitrary::Arbitrary;
use dset::{
    bitpack::{bit_width, packed_len},
    CellRef, COMPRESSED_COLUMN_TYPE, COMPRESSED_FIELD_SECTION, CONSTANT_COLUMN_TYPE, VERSION,
};

#[derive(Debug, Clone, PartialEq, Arbitrary)]
pub enum Cell {
    Nothing,
    Bool(bool),
    Int(i32),
    Decimal { lo: u64, hi: u32, scale: u8, negative: bool },
    Text(String),
    Error(String),
}

#[derive(Debug, Clone, Arbitrary)]
pub enum FieldColumn {
    Constant { value: Cell, rows: u16 },
    Compressed { vocabulary: Vec<Cell>, indices: Vec<u16> },
}

#[derive(Debug, Clone, Arbitrary)]
pub struct Table {
    pub name: String,
    pub columns: Vec<(String, FieldColumn)>,
    /// Bytes appended to every block payload.
    pub trailing: Vec<u8>,
}

impl Cell {
    fn write(&self, buf: &mut Vec<u8>) {
        match self {
            Cell::Nothing => buf.push(0),
            Cell::Bool(true) => buf.push(64),
            Cell::Bool(false) => buf.push(65),
            Cell::Int(i) => {
                buf.push(4);
                buf.extend(i.to_le_bytes());
            }
            Cell::Decimal {
                lo,
                hi,
                scale,
                negative,
            } => {
                buf.push(16);
                buf.extend(lo.to_le_bytes());
                buf.extend(hi.to_le_bytes());
                let mut flags = u32::from(*scale % 29) << 16;
                if *negative {
                    flags |= 1 << 31;
                }
                buf.extend(flags.to_le_bytes());
            }
            Cell::Text(s) => {
                buf.push(32);
                write_str(buf, s);
            }
            Cell::Error(s) => {
                buf.push(128);
                buf.extend(0i32.to_le_bytes());
                write_str(buf, s);
            }
        }
    }

    /// Whether `cell` is what decoding this value yields.
    pub fn matches(&self, cell: CellRef<'_>) -> bool {
        match (self, cell) {
            (Cell::Nothing, CellRef::Nothing) => true,
            (Cell::Bool(a), CellRef::Boolean(b)) => *a == b,
            (Cell::Int(i), CellRef::Number(n)) => *n == dset::BigDecimal::from(*i),
            (Cell::Decimal { .. }, CellRef::Number(_)) => true,
            (Cell::Text(a), CellRef::Text(b)) | (Cell::Error(a), CellRef::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl FieldColumn {
    /// Rows this column decodes to; out-of-range indices are wrapped into the
    /// vocabulary.
    pub fn cells(&self) -> Vec<&Cell> {
        match self {
            FieldColumn::Constant { value, rows } => vec![value; *rows as usize],
            FieldColumn::Compressed {
                vocabulary,
                indices,
            } if !vocabulary.is_empty() => indices
                .iter()
                .map(|&i| &vocabulary[i as usize % vocabulary.len()])
                .collect(),
            FieldColumn::Compressed { .. } => Vec::new(),
        }
    }

    fn payload(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            FieldColumn::Constant { value, rows } => {
                value.write(&mut buf);
                buf.extend(i32::from(*rows).to_le_bytes());
            }
            FieldColumn::Compressed {
                vocabulary,
                indices,
            } => {
                buf.extend((vocabulary.len() as i32).to_le_bytes());
                for cell in vocabulary {
                    cell.write(&mut buf);
                }
                let rows = if vocabulary.is_empty() { 0 } else { indices.len() };
                buf.extend((rows as i32).to_le_bytes());
                let width = bit_width(vocabulary.len());
                let mut packed = vec![0u8; packed_len(width, rows).unwrap_or(0)];
                for (row, &index) in indices.iter().take(rows).enumerate() {
                    let index = index as usize % vocabulary.len();
                    for bit in 0..width as usize {
                        if index >> bit & 1 == 1 {
                            let pos = row * width as usize + bit;
                            packed[pos / 8] |= 1 << (pos % 8);
                        }
                    }
                }
                buf.extend(packed);
            }
        }
        buf
    }

    fn column_type(&self) -> &'static str {
        match self {
            FieldColumn::Constant { .. } => CONSTANT_COLUMN_TYPE,
            FieldColumn::Compressed { .. } => COMPRESSED_COLUMN_TYPE,
        }
    }
}

impl Table {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = VERSION.to_vec();
        for (field, column) in &self.columns {
            let mut content = Vec::new();
            write_str(&mut content, field);
            write_str(&mut content, column.column_type());
            content.extend(column.payload());
            content.extend(&self.trailing);
            write_str(&mut buf, &self.name);
            write_str(&mut buf, COMPRESSED_FIELD_SECTION);
            buf.extend((content.len() as i32).to_le_bytes());
            buf.extend(content);
        }
        buf
    }

    pub fn rows_agree(&self) -> bool {
        let mut lens = self.columns.iter().map(|(_, c)| c.cells().len());
        match lens.next() {
            Some(first) => lens.all(|len| len == first),
            None => true,
        }
    }
}

fn write_str(buf: &mut Vec<u8>, s: &str) {
    let mut len = s.len();
    while len >= 0x80 {
        buf.push(len as u8 | 0x80);
        len >>= 7;
    }
    buf.push(len as u8);
    buf.extend(s.as_bytes());
}
