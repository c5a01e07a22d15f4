use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use crate::models::ColumnType;

/// A single table value, also used as a column's fill value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    F64(f64),
    I64(i64),
    Str(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::F64(v) => write!(f, "{}", v),
            Cell::I64(v) => write!(f, "{}", v),
            Cell::Str(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    F64(Vec<f64>),
    I64(Vec<i64>),
    Str(Vec<String>),
}

impl ColumnData {
    pub fn empty(data_type: ColumnType) -> Self {
        match data_type {
            ColumnType::Double => ColumnData::F64(Vec::new()),
            ColumnType::Int => ColumnData::I64(Vec::new()),
            ColumnType::String => ColumnData::Str(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::F64(v) => v.len(),
            ColumnData::I64(v) => v.len(),
            ColumnData::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> ColumnType {
        match self {
            ColumnData::F64(_) => ColumnType::Double,
            ColumnData::I64(_) => ColumnType::Int,
            ColumnData::Str(_) => ColumnType::String,
        }
    }

    pub fn get(&self, row: usize) -> Option<Cell> {
        match self {
            ColumnData::F64(v) => v.get(row).map(|x| Cell::F64(*x)),
            ColumnData::I64(v) => v.get(row).map(|x| Cell::I64(*x)),
            ColumnData::Str(v) => v.get(row).map(|x| Cell::Str(x.clone())),
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            ColumnData::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            ColumnData::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&[String]> {
        match self {
            ColumnData::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Append a cell; a cell of the wrong type is handed back.
    fn push(&mut self, cell: Cell) -> std::result::Result<(), Cell> {
        match (self, cell) {
            (ColumnData::F64(v), Cell::F64(x)) => v.push(x),
            (ColumnData::F64(v), Cell::I64(x)) => v.push(x as f64),
            (ColumnData::I64(v), Cell::I64(x)) => v.push(x),
            (ColumnData::Str(v), Cell::Str(x)) => v.push(x),
            (_, cell) => return Err(cell),
        }
        Ok(())
    }

    fn last(&self) -> Option<Cell> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
    pub fill: Cell,
    /// Constant columns repeat their last value instead of the fill value.
    pub backfill: bool,
}

impl Column {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn pad_to(&mut self, rows: usize) -> usize {
        let missing = rows.saturating_sub(self.len());
        let padding = if self.backfill {
            self.data.last().unwrap_or_else(|| self.fill.clone())
        } else {
            self.fill.clone()
        };
        for _ in 0..missing {
            if self.data.push(padding.clone()).is_err() {
                warn!("Fill value {} does not match column '{}'", padding, self.name);
                break;
            }
        }
        missing
    }
}

/// Ordered set of named columns that become equal length on [`AssembledTable::finish`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledTable {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl AssembledTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a column; an existing column with the same name is kept as is.
    pub fn add_column(&mut self, name: &str, data_type: ColumnType, fill: Cell, backfill: bool) {
        if self.index.contains_key(name) {
            return;
        }
        self.index.insert(name.to_string(), self.columns.len());
        self.columns.push(Column {
            name: name.to_string(),
            data: ColumnData::empty(data_type),
            fill,
            backfill,
        });
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Append to a named column. Unknown columns and mismatched types drop the cell with a warning.
    pub fn push(&mut self, name: &str, cell: Cell) -> bool {
        let Some(&i) = self.index.get(name) else {
            warn!("Dropping value {} for unknown column '{}'", cell, name);
            return false;
        };
        let data = &mut self.columns[i].data;
        let data_type = data.data_type();
        match data.push(cell) {
            Ok(()) => true,
            Err(cell) => {
                warn!("Dropping value {} for {:?} column '{}'", cell, data_type, name);
                false
            }
        }
    }

    pub fn push_f64(&mut self, name: &str, value: f64) -> bool {
        self.push(name, Cell::F64(value))
    }

    pub fn push_i64(&mut self, name: &str, value: i64) -> bool {
        self.push(name, Cell::I64(value))
    }

    pub fn push_str(&mut self, name: &str, value: &str) -> bool {
        self.push(name, Cell::Str(value.to_string()))
    }

    pub fn column_len(&self, name: &str) -> usize {
        self.column(name).map_or(0, Column::len)
    }

    /// Longest column length; the table's row count once finished.
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(Column::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Pad every non-constant column to `rows` with its fill value.
    pub fn pad_columns(&mut self, rows: usize) {
        for column in self.columns.iter_mut().filter(|c| !c.backfill) {
            column.pad_to(rows);
        }
    }

    /// Equalize column lengths: constant columns are back-filled, the rest padded.
    pub fn finish(mut self) -> Self {
        let rows = self.row_count();
        for column in &mut self.columns {
            let padded = column.pad_to(rows);
            if padded > 0 && !column.backfill {
                warn!(
                    "Padded column '{}' with {} fill values to {} rows",
                    column.name, padded, rows
                );
            }
        }
        self
    }

    pub fn row(&self, row: usize) -> Vec<Cell> {
        self.columns
            .iter()
            .map(|c| c.data.get(row).unwrap_or_else(|| c.fill.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_finish_backfills_and_pads() {
        let mut table = AssembledTable::new();
        table.add_column("station", ColumnType::String, Cell::Str(String::new()), true);
        table.add_column("time", ColumnType::Double, Cell::F64(f64::NAN), false);
        table.add_column("value_1", ColumnType::Double, Cell::F64(-9999.99), false);
        table.add_column("qc_agg_1", ColumnType::Int, Cell::I64(9), false);

        table.push_str("station", "C10");
        for t in [1.0, 2.0, 3.0] {
            table.push_f64("time", t);
        }
        table.push_f64("value_1", 21.5);
        table.push_i64("qc_agg_1", 1);

        let table = table.finish();

        assert_eq!(table.row_count(), 3);
        assert_eq!(
            table.column("station").unwrap().data.as_str().unwrap(),
            &["C10", "C10", "C10"]
        );
        assert_eq!(
            table.column("value_1").unwrap().data.as_f64().unwrap(),
            &[21.5, -9999.99, -9999.99]
        );
        assert_eq!(
            table.column("qc_agg_1").unwrap().data.as_i64().unwrap(),
            &[1, 9, 9]
        );
    }

    #[test]
    fn test_duplicate_column_is_reused() {
        let mut table = AssembledTable::new();
        table.add_column("depth", ColumnType::Double, Cell::F64(0.0), false);
        table.add_column("depth", ColumnType::Int, Cell::I64(0), true);

        assert_eq!(table.columns().len(), 1);
        assert_eq!(table.column("depth").unwrap().data.data_type(), ColumnType::Double);
    }

    #[test]
    fn test_push_rejects_wrong_type_and_unknown_column() {
        let mut table = AssembledTable::new();
        table.add_column("qc_tests_1", ColumnType::String, Cell::Str(String::new()), false);

        assert!(!table.push_f64("qc_tests_1", 1.0));
        assert!(!table.push_str("missing", "x"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_pad_columns_skips_constant_columns() {
        let mut table = AssembledTable::new();
        table.add_column("station", ColumnType::String, Cell::Str(String::new()), true);
        table.add_column("value_1", ColumnType::Double, Cell::F64(-9999.99), false);
        table.push_str("station", "C10");

        table.pad_columns(2);

        assert_eq!(table.column_len("station"), 1);
        assert_eq!(table.column_len("value_1"), 2);
    }
}
