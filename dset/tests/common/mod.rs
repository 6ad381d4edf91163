#![allow(dead_code)]

use dset::{
    bitpack::{bit_width, packed_len},
    BigDecimal, CellRef, CellValue, Dataset, SymbolType, COMPRESSED_COLUMN_TYPE,
    COMPRESSED_FIELD_SECTION, CONSTANT_COLUMN_TYPE, VERSION,
};

use bigdecimal::num_bigint::Sign;

pub fn write_str(buf: &mut Vec<u8>, s: &str) {
    let mut len = s.len() as u32;
    loop {
        let byte = (len & 0x7f) as u8;
        len >>= 7;
        if len == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
    buf.extend(s.as_bytes());
}

pub fn write_decimal(buf: &mut Vec<u8>, value: &BigDecimal) {
    let (digits, scale) = value.as_bigint_and_exponent();
    let (digits, scale) = if scale < 0 {
        (value.with_scale(0).as_bigint_and_exponent().0, 0)
    } else {
        (digits, scale)
    };
    let (sign, mut magnitude) = digits.to_bytes_le();
    assert!(magnitude.len() <= 12 && scale <= 28, "{} does not fit", value);
    magnitude.resize(12, 0);
    buf.extend(&magnitude);
    let mut flags = (scale as u32) << 16;
    if sign == Sign::Minus {
        flags |= 1 << 31;
    }
    buf.extend(flags.to_le_bytes());
}

pub fn write_symbol(buf: &mut Vec<u8>, value: &CellValue) {
    match value {
        CellValue::Nothing => buf.push(SymbolType::Nothing.tag()),
        CellValue::Boolean(true) => buf.push(SymbolType::BoolTrue.tag()),
        CellValue::Boolean(false) => buf.push(SymbolType::BoolFalse.tag()),
        CellValue::Text(s) => {
            buf.push(SymbolType::Text.tag());
            write_str(buf, s);
        }
        CellValue::Error(s) => {
            buf.push(SymbolType::Error.tag());
            buf.extend(0i32.to_le_bytes());
            write_str(buf, s);
        }
        CellValue::Number(n) => {
            let (digits, scale) = n.as_bigint_and_exponent();
            match (scale, i32::try_from(&digits)) {
                (0, Ok(i)) if i8::try_from(i).is_ok() => {
                    buf.push(SymbolType::Int8.tag());
                    buf.extend((i as i8).to_le_bytes());
                }
                (0, Ok(i)) if i16::try_from(i).is_ok() => {
                    buf.push(SymbolType::Int16.tag());
                    buf.extend((i as i16).to_le_bytes());
                }
                (0, Ok(i)) => {
                    buf.push(SymbolType::Int32.tag());
                    buf.extend(i.to_le_bytes());
                }
                _ => {
                    buf.push(SymbolType::Decimal.tag());
                    write_decimal(buf, n);
                }
            }
        }
    }
}

/// Packs `indices` least significant bit first at `bit_width` bits each.
pub fn pack(indices: &[usize], bit_width: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; packed_len(bit_width, indices.len()).unwrap()];
    for (row, &index) in indices.iter().enumerate() {
        for bit in 0..bit_width as usize {
            if index >> bit & 1 == 1 {
                let pos = row * bit_width as usize + bit;
                bytes[pos / 8] |= 1 << (pos % 8);
            }
        }
    }
    bytes
}

/// Splits values into a first-seen-order vocabulary and per-row indices.
pub fn dictionary(values: &[CellValue]) -> (Vec<CellValue>, Vec<usize>) {
    let mut vocabulary: Vec<CellValue> = Vec::new();
    let mut indices = Vec::with_capacity(values.len());
    for value in values {
        let index = match vocabulary.iter().position(|v| same_cell(v, value)) {
            Some(index) => index,
            None => {
                vocabulary.push(value.clone());
                vocabulary.len() - 1
            }
        };
        indices.push(index);
    }
    (vocabulary, indices)
}

/// Exact equality, including the scale of numbers.
pub fn same_cell(a: &CellValue, b: &CellValue) -> bool {
    match (a, b) {
        (CellValue::Number(x), CellValue::Number(y)) => {
            x.as_bigint_and_exponent() == y.as_bigint_and_exponent()
        }
        _ => a == b,
    }
}

pub fn compressed_payload(vocabulary: &[CellValue], rows: i32, packed: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend((vocabulary.len() as i32).to_le_bytes());
    for value in vocabulary {
        write_symbol(&mut payload, value);
    }
    payload.extend(rows.to_le_bytes());
    payload.extend(packed);
    payload
}

/// Builds dset files for tests.
pub struct DsetWriter {
    buf: Vec<u8>,
}

impl DsetWriter {
    pub fn new() -> Self {
        Self {
            buf: VERSION.to_vec(),
        }
    }

    pub fn block(
        &mut self,
        table: &str,
        section: &str,
        field: &str,
        column_type: &str,
        payload: &[u8],
    ) -> &mut Self {
        let mut content = Vec::new();
        write_str(&mut content, field);
        write_str(&mut content, column_type);
        content.extend(payload);
        write_str(&mut self.buf, table);
        write_str(&mut self.buf, section);
        self.buf.extend((content.len() as i32).to_le_bytes());
        self.buf.extend(content);
        self
    }

    pub fn compressed(&mut self, table: &str, field: &str, values: &[CellValue]) -> &mut Self {
        let (vocabulary, indices) = dictionary(values);
        let packed = pack(&indices, bit_width(vocabulary.len()));
        let payload = compressed_payload(&vocabulary, values.len() as i32, &packed);
        self.block(
            table,
            COMPRESSED_FIELD_SECTION,
            field,
            COMPRESSED_COLUMN_TYPE,
            &payload,
        )
    }

    pub fn constant(&mut self, table: &str, field: &str, value: &CellValue, rows: i32) -> &mut Self {
        let mut payload = Vec::new();
        write_symbol(&mut payload, value);
        payload.extend(rows.to_le_bytes());
        self.block(
            table,
            COMPRESSED_FIELD_SECTION,
            field,
            CONSTANT_COLUMN_TYPE,
            &payload,
        )
    }

    pub fn finish(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

pub fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

pub fn error(s: &str) -> CellValue {
    CellValue::Error(s.to_string())
}

pub fn int(i: i64) -> CellValue {
    CellValue::Number(BigDecimal::from(i))
}

pub fn decimal(digits: i64, scale: i64) -> CellValue {
    CellValue::Number(BigDecimal::new(digits.into(), scale))
}

/// Renders a dataset the way the CSV exporter does: every field quoted,
/// `;` between fields, `\n` between lines, no trailing newline.
pub fn to_csv(dataset: &Dataset) -> String {
    fn quote(out: &mut String, value: &str) {
        out.push('"');
        out.push_str(&value.replace('"', "\"\""));
        out.push('"');
    }

    let mut out = String::new();
    if dataset.columns_count() == 0 {
        return out;
    }
    for (i, name) in dataset.column_names().enumerate() {
        if i > 0 {
            out.push(';');
        }
        quote(&mut out, name);
    }
    for row in dataset.rows() {
        out.push('\n');
        for (i, cell) in row.into_iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            let value = match cell {
                CellRef::Number(n) => n.to_string(),
                CellRef::Text(s) | CellRef::Error(s) => s.to_string(),
                CellRef::Boolean(true) => "TRUE".to_string(),
                CellRef::Boolean(false) => "FALSE".to_string(),
                CellRef::Nothing => String::new(),
            };
            quote(&mut out, &value);
        }
    }
    out
}
