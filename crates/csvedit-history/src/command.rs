use csvedit_core::{CsvResult, Row, Table};

/// Type alias for boxed commands
pub type CommandBox = Box<dyn Command>;

/// What a command touched, so the host knows what to re-render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A single cell was rewritten
    Cell { row: usize, column: String },
    /// A row now exists at this index
    RowInserted(usize),
    /// The row at this index is gone; later rows moved up
    RowRemoved(usize),
}

/// Trait for undoable table edits
pub trait Command: std::fmt::Debug + Send + Sync {
    /// Apply the edit. A failed command leaves the table unchanged.
    fn execute(&mut self, table: &mut Table) -> CsvResult<Change>;

    /// Revert a previously executed edit
    fn undo(&mut self, table: &mut Table) -> CsvResult<Change>;

    /// Get a description of this command (for UI display)
    fn description(&self) -> &str;
}

/// Replace one cell's value
#[derive(Debug)]
pub struct SetCellCommand {
    row: usize,
    column: String,
    new_value: String,
    old_value: Option<String>,
}

impl SetCellCommand {
    pub fn new(row: usize, column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            row,
            column: column.into(),
            new_value: value.into(),
            old_value: None,
        }
    }

    fn change(&self) -> Change {
        Change::Cell {
            row: self.row,
            column: self.column.clone(),
        }
    }
}

impl Command for SetCellCommand {
    fn execute(&mut self, table: &mut Table) -> CsvResult<Change> {
        let old = table.set_cell(self.row, &self.column, self.new_value.clone())?;
        self.old_value = Some(old);
        Ok(self.change())
    }

    fn undo(&mut self, table: &mut Table) -> CsvResult<Change> {
        debug_assert!(self.old_value.is_some(), "undo before execute");
        // Kept until the write succeeds so a failed undo can be retried
        if let Some(old) = &self.old_value {
            table.set_cell(self.row, &self.column, old.clone())?;
            self.old_value = None;
        }
        Ok(self.change())
    }

    fn description(&self) -> &str {
        "Edit cell"
    }
}

/// Append an empty row
#[derive(Debug, Default)]
pub struct AddRowCommand {
    index: Option<usize>,
}

impl AddRowCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the appended row, once executed
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

impl Command for AddRowCommand {
    fn execute(&mut self, table: &mut Table) -> CsvResult<Change> {
        let index = table.add_row();
        self.index = Some(index);
        Ok(Change::RowInserted(index))
    }

    fn undo(&mut self, table: &mut Table) -> CsvResult<Change> {
        debug_assert!(self.index.is_some(), "undo before execute");
        // Undo the append by removing the last row
        let index = self.index.unwrap_or_else(|| table.row_count().saturating_sub(1));
        table.delete_row(index)?;
        Ok(Change::RowRemoved(index))
    }

    fn description(&self) -> &str {
        "Add row"
    }
}

/// Remove one row, keeping it for undo
#[derive(Debug)]
pub struct DeleteRowCommand {
    index: usize,
    removed: Option<Row>,
}

impl DeleteRowCommand {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            removed: None,
        }
    }
}

impl Command for DeleteRowCommand {
    fn execute(&mut self, table: &mut Table) -> CsvResult<Change> {
        self.removed = Some(table.delete_row(self.index)?);
        Ok(Change::RowRemoved(self.index))
    }

    fn undo(&mut self, table: &mut Table) -> CsvResult<Change> {
        debug_assert!(self.removed.is_some(), "undo before execute");
        if let Some(row) = &self.removed {
            table.insert_row(self.index, row.clone())?;
            self.removed = None;
        }
        Ok(Change::RowInserted(self.index))
    }

    fn description(&self) -> &str {
        "Delete row"
    }
}
