use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::HashSet;

use crate::error::{CsvError, CsvResult};

/// Values of one record, aligned position-for-position with the owning
/// table's column keys.
///
/// Rows are only ever built by a [`Table`], so a row's width always equals
/// the column count of the table it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<String>,
}

impl Row {
    pub(crate) fn from_values(values: Vec<String>) -> Self {
        Self { values }
    }

    fn blank(width: usize) -> Self {
        Self {
            values: vec![String::new(); width],
        }
    }

    /// Number of fields in the row
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Field values in column order
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Borrowed view of a row paired with the table's column keys.
///
/// Behaves as an ordered mapping from column key to value.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl<'a> RowView<'a> {
    /// Value stored under `key`, if the column exists
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == key)
            .map(|idx| self.row.values[idx].as_str())
    }

    /// `(key, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.row.values.iter().map(String::as_str))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.columns.iter().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.row.values.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }

    /// The underlying row storage
    pub fn row(&self) -> &'a Row {
        self.row
    }
}

impl Serialize for RowView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// An in-memory delimited table: one shared sequence of unique column keys
/// plus an ordered sequence of rows.
///
/// Every mutation goes through a method on this type. Column keys are set
/// when the table is built and never renamed or reordered afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with no columns and no rows
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with the given column keys and no rows
    pub fn with_columns<I, S>(keys: I) -> CsvResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for key in keys {
            let key = key.into();
            if !seen.insert(key.clone()) {
                return Err(CsvError::DuplicateColumn(key));
            }
            columns.push(key);
        }

        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Assemble a table from parts whose shape the caller has already
    /// checked.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    /// Column keys in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows (it may still have columns)
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_column(&self, key: &str) -> bool {
        self.column_index(key).is_some()
    }

    fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == key)
    }

    fn check_row(&self, index: usize) -> CsvResult<()> {
        if index < self.rows.len() {
            Ok(())
        } else {
            Err(CsvError::RowOutOfBounds {
                index,
                len: self.rows.len(),
            })
        }
    }

    fn resolve(&self, index: usize, key: &str) -> CsvResult<usize> {
        self.check_row(index)?;
        self.column_index(key)
            .ok_or_else(|| CsvError::UnknownColumn(key.to_string()))
    }

    /// Get a view of the row at `index`
    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        self.rows.get(index).map(|row| RowView {
            columns: &self.columns,
            row,
        })
    }

    /// Iterate over all rows in order
    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> + '_ {
        self.rows.iter().map(move |row| RowView {
            columns: &self.columns,
            row,
        })
    }

    /// Value at `(index, key)`
    pub fn cell(&self, index: usize, key: &str) -> CsvResult<&str> {
        let col = self.resolve(index, key)?;
        Ok(self.rows[index].values[col].as_str())
    }

    /// Replace the value at `(index, key)`, returning the previous value
    pub fn set_cell(&mut self, index: usize, key: &str, value: impl Into<String>) -> CsvResult<String> {
        let col = self.resolve(index, key)?;
        let slot = &mut self.rows[index].values[col];
        Ok(std::mem::replace(slot, value.into()))
    }

    /// Append a row with an empty value under every column.
    /// Returns the index of the new row.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(Row::blank(self.columns.len()));
        self.rows.len() - 1
    }

    /// Remove the row at `index`; later rows shift down by one
    pub fn delete_row(&mut self, index: usize) -> CsvResult<Row> {
        self.check_row(index)?;
        Ok(self.rows.remove(index))
    }

    /// Put a previously removed row back at `index` (`index <= row_count`)
    pub fn insert_row(&mut self, index: usize, row: Row) -> CsvResult<()> {
        if index > self.rows.len() {
            return Err(CsvError::RowOutOfBounds {
                index,
                len: self.rows.len(),
            });
        }
        if row.len() != self.columns.len() {
            return Err(CsvError::ShapeMismatch {
                expected: self.columns.len(),
                found: row.len(),
            });
        }

        self.rows.insert(index, row);
        Ok(())
    }
}

impl Serialize for Table {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        struct Rows<'a>(&'a Table);

        impl Serialize for Rows<'_> {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                let mut seq = serializer.serialize_seq(Some(self.0.row_count()))?;
                for row in self.0.rows() {
                    seq.serialize_element(&row)?;
                }
                seq.end()
            }
        }

        let mut state = serializer.serialize_struct("Table", 2)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("rows", &Rows(self))?;
        state.end()
    }
}
