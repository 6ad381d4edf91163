use bigdecimal::BigDecimal;
use itertools::Itertools;

use crate::{CellKind, CellRef, Column, ColumnRead, DsetError, Nothing};

/// A decoded table: a name and an ordered list of equally long columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    name: String,
    columns: Vec<Column>,
}

impl Dataset {
    /// Fails with [`DsetError::RowCountMismatch`] unless every column has the
    /// same length as the first.
    pub fn new(name: String, columns: Vec<Column>) -> Result<Self, DsetError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(column) = columns.iter().find(|c| c.len() != expected) {
                return Err(DsetError::RowCountMismatch {
                    column: column.name().to_string(),
                    expected,
                    found: column.len(),
                });
            }
        }
        debug_assert!(columns.iter().map(|c| c.len()).all_equal());
        Ok(Self { name, columns })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn columns_count(&self) -> usize {
        self.columns.len()
    }

    /// The shared length of all columns, `0` without columns.
    pub fn rows_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// The first column called `name`; field names are not required to be
    /// unique.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name())
    }

    /// # Panics
    ///
    /// Panics if `column` or `row` is out of range.
    pub fn cell(&self, column: usize, row: usize) -> CellRef<'_> {
        self.columns[column].cell(row)
    }

    pub fn kind(&self, column: usize, row: usize) -> CellKind {
        self.columns[column].kind(row)
    }

    pub fn number(&self, column: usize, row: usize) -> Option<&BigDecimal> {
        self.columns[column].number(row)
    }

    pub fn text(&self, column: usize, row: usize) -> Option<&str> {
        self.columns[column].text(row)
    }

    pub fn boolean(&self, column: usize, row: usize) -> Option<bool> {
        self.columns[column].boolean(row)
    }

    pub fn nothing(&self, column: usize, row: usize) -> Option<Nothing> {
        self.columns[column].nothing(row)
    }

    pub fn error(&self, column: usize, row: usize) -> Option<&str> {
        self.columns[column].error(row)
    }

    /// Iterates rows, each collected into the borrowed cells of every column
    /// in column order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<CellRef<'_>>> + '_ {
        (0..self.rows_count()).map(move |row| self.columns.iter().map(|c| c.cell(row)).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{CellValue, ConstantColumn};

    fn constant(name: &str, len: usize, value: CellValue) -> Column {
        ConstantColumn::new(name.to_string(), len, value).into()
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::new("t".to_string(), vec![]).unwrap();
        assert_eq!(dataset.columns_count(), 0);
        assert_eq!(dataset.rows_count(), 0);
        assert_eq!(dataset.rows().count(), 0);
    }

    #[test]
    fn test_rows_and_lookup() {
        let dataset = Dataset::new(
            "t".to_string(),
            vec![
                constant("a", 2, CellValue::Boolean(true)),
                constant("b", 2, CellValue::Text("x".to_string())),
                constant("a", 2, CellValue::Nothing),
            ],
        )
        .unwrap();
        assert_eq!(dataset.columns_count(), 3);
        assert_eq!(dataset.rows_count(), 2);
        assert_eq!(dataset.column_names().collect::<Vec<_>>(), ["a", "b", "a"]);
        assert_eq!(dataset.column_by_name("a").unwrap().boolean(0), Some(true));
        assert_eq!(dataset.text(1, 1), Some("x"));
        assert_eq!(dataset.boolean(1, 1), None);
        assert_eq!(dataset.nothing(2, 0), Some(Nothing));
        assert_eq!(dataset.kind(0, 1), CellKind::Boolean);
        let rows: Vec<_> = dataset.rows().collect();
        assert_eq!(
            rows[1],
            vec![CellRef::Boolean(true), CellRef::Text("x"), CellRef::Nothing]
        );
    }

    #[test]
    fn test_row_count_mismatch() {
        let err = Dataset::new(
            "t".to_string(),
            vec![
                constant("a", 2, CellValue::Nothing),
                constant("b", 3, CellValue::Nothing),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DsetError::RowCountMismatch {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }
}
