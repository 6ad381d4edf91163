use std::io::{Read, Seek};

use bigdecimal::BigDecimal;

use crate::{reader::BinaryReader, CellKind, CellValue, DsetError};

/// The leading byte of a wire-encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SymbolType {
    Nothing = 0,
    Int8 = 1,
    Int16 = 2,
    Int32 = 4,
    Decimal = 16,
    Text = 32,
    BoolTrue = 64,
    BoolFalse = 65,
    Error = 128,
}

impl SymbolType {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn kind(self) -> CellKind {
        match self {
            SymbolType::Nothing => CellKind::Nothing,
            SymbolType::Int8 | SymbolType::Int16 | SymbolType::Int32 | SymbolType::Decimal => {
                CellKind::Number
            }
            SymbolType::Text => CellKind::Text,
            SymbolType::BoolTrue | SymbolType::BoolFalse => CellKind::Boolean,
            SymbolType::Error => CellKind::Error,
        }
    }
}

impl TryFrom<u8> for SymbolType {
    type Error = DsetError;

    fn try_from(value: u8) -> Result<Self, DsetError> {
        match value {
            0 => Ok(SymbolType::Nothing),
            1 => Ok(SymbolType::Int8),
            2 => Ok(SymbolType::Int16),
            4 => Ok(SymbolType::Int32),
            16 => Ok(SymbolType::Decimal),
            32 => Ok(SymbolType::Text),
            64 => Ok(SymbolType::BoolTrue),
            65 => Ok(SymbolType::BoolFalse),
            128 => Ok(SymbolType::Error),
            _ => Err(DsetError::UnsupportedSymbolType(value)),
        }
    }
}

/// Decodes one tagged value.
pub(crate) fn read_symbol<R: Read + Seek>(
    reader: &mut BinaryReader<R>,
) -> Result<CellValue, DsetError> {
    let ty = SymbolType::try_from(reader.read_u8()?)?;
    let value = match ty {
        SymbolType::Nothing => CellValue::Nothing,
        SymbolType::Int8 => CellValue::Number(BigDecimal::from(reader.read_i8()?)),
        SymbolType::Int16 => CellValue::Number(BigDecimal::from(reader.read_i16()?)),
        SymbolType::Int32 => CellValue::Number(BigDecimal::from(reader.read_i32()?)),
        SymbolType::Decimal => CellValue::Number(reader.read_decimal()?),
        SymbolType::Text => CellValue::Text(reader.read_string()?),
        SymbolType::BoolTrue => CellValue::Boolean(true),
        SymbolType::BoolFalse => CellValue::Boolean(false),
        SymbolType::Error => {
            // error code, reserved
            reader.read_i32()?;
            CellValue::Error(reader.read_string()?)
        }
    };
    Ok(value)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    fn decode(bytes: &[u8]) -> Result<CellValue, DsetError> {
        let mut reader = BinaryReader::new(Cursor::new(bytes))?;
        read_symbol(&mut reader)
    }

    #[test]
    fn test_integers_widen_to_numbers() {
        assert_eq!(decode(&[1, 0xfb]).unwrap(), CellValue::Number(BigDecimal::from(-5i8)));
        assert_eq!(
            decode(&[2, 0x00, 0x80]).unwrap(),
            CellValue::Number(BigDecimal::from(i16::MIN))
        );
        assert_eq!(
            decode(&[4, 0x40, 0x42, 0x0f, 0x00]).unwrap(),
            CellValue::Number(BigDecimal::from(1_000_000i32))
        );
    }

    #[test]
    fn test_payloadless_symbols() {
        assert_eq!(decode(&[0]).unwrap(), CellValue::Nothing);
        assert_eq!(decode(&[64]).unwrap(), CellValue::Boolean(true));
        assert_eq!(decode(&[65]).unwrap(), CellValue::Boolean(false));
    }

    #[test]
    fn test_text_and_error() {
        assert_eq!(
            decode(&[32, 3, b'f', b'o', b'o']).unwrap(),
            CellValue::Text("foo".to_string())
        );
        let mut error = vec![128, 7, 0, 0, 0, 7];
        error.extend(b"#DIV/0!");
        assert_eq!(
            decode(&error).unwrap(),
            CellValue::Error("#DIV/0!".to_string())
        );
    }

    #[test]
    fn test_unknown_tag() {
        let err = decode(&[3]).unwrap_err();
        assert!(matches!(err, DsetError::UnsupportedSymbolType(3)));
        assert_eq!(err.to_string(), "Unknown symbol type: 3");
    }

    #[test]
    fn test_tag_round_trip() {
        for tag in 0..=u8::MAX {
            if let Ok(ty) = SymbolType::try_from(tag) {
                assert_eq!(ty.tag(), tag);
            }
        }
    }
}
