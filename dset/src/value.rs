use std::fmt;

use bigdecimal::BigDecimal;
use serde::Serialize;

/// The discriminant of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CellKind {
    Number,
    Text,
    Boolean,
    Nothing,
    Error,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellKind::Number => "number",
            CellKind::Text => "text",
            CellKind::Boolean => "boolean",
            CellKind::Nothing => "nothing",
            CellKind::Error => "error",
        };
        f.write_str(name)
    }
}

/// Marker returned for an explicitly empty cell.
///
/// Distinct from `None`: `column.nothing(row) == Some(Nothing)` means the cell
/// holds the empty value, `None` means it holds something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Nothing;

/// An owned cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(BigDecimal),
    Text(String),
    Boolean(bool),
    Nothing,
    Error(String),
}

impl CellValue {
    pub fn kind(&self) -> CellKind {
        self.as_cell().kind()
    }

    pub fn as_cell(&self) -> CellRef<'_> {
        match self {
            CellValue::Number(n) => CellRef::Number(n),
            CellValue::Text(s) => CellRef::Text(s),
            CellValue::Boolean(b) => CellRef::Boolean(*b),
            CellValue::Nothing => CellRef::Nothing,
            CellValue::Error(s) => CellRef::Error(s),
        }
    }
}

/// A cell value borrowed from a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRef<'a> {
    Number(&'a BigDecimal),
    Text(&'a str),
    Boolean(bool),
    Nothing,
    Error(&'a str),
}

impl<'a> CellRef<'a> {
    pub fn kind(&self) -> CellKind {
        match self {
            CellRef::Number(_) => CellKind::Number,
            CellRef::Text(_) => CellKind::Text,
            CellRef::Boolean(_) => CellKind::Boolean,
            CellRef::Nothing => CellKind::Nothing,
            CellRef::Error(_) => CellKind::Error,
        }
    }

    pub fn number(&self) -> Option<&'a BigDecimal> {
        match *self {
            CellRef::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&'a str> {
        match *self {
            CellRef::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn boolean(&self) -> Option<bool> {
        match *self {
            CellRef::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn nothing(&self) -> Option<Nothing> {
        match *self {
            CellRef::Nothing => Some(Nothing),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&'a str> {
        match *self {
            CellRef::Error(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_value(&self) -> CellValue {
        match *self {
            CellRef::Number(n) => CellValue::Number(n.clone()),
            CellRef::Text(s) => CellValue::Text(s.to_string()),
            CellRef::Boolean(b) => CellValue::Boolean(b),
            CellRef::Nothing => CellValue::Nothing,
            CellRef::Error(s) => CellValue::Error(s.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_exactly_one_getter_answers() {
        let number = BigDecimal::from(3);
        let cells = [
            CellRef::Number(&number),
            CellRef::Text("a"),
            CellRef::Boolean(false),
            CellRef::Nothing,
            CellRef::Error("#DIV/0!"),
        ];
        for cell in cells {
            let present = [
                cell.number().is_some(),
                cell.text().is_some(),
                cell.boolean().is_some(),
                cell.nothing().is_some(),
                cell.error().is_some(),
            ];
            assert_eq!(present.iter().filter(|p| **p).count(), 1, "{:?}", cell);
            assert_eq!(cell.to_value().kind(), cell.kind());
        }
    }

    #[test]
    fn test_text_and_error_are_distinct() {
        let text = CellValue::Text("x".to_string());
        let error = CellValue::Error("x".to_string());
        assert_ne!(text, error);
        assert_eq!(error.as_cell().text(), None);
        assert_eq!(error.as_cell().error(), Some("x"));
    }
}
