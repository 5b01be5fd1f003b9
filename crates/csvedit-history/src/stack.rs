use crate::command::{Change, CommandBox};
use csvedit_core::{CsvResult, Table};

/// Default number of undo levels
pub const DEFAULT_CAPACITY: usize = 100;

/// Manages undo/redo history for table edits.
///
/// Every executed command is its own history entry; nothing is merged.
pub struct HistoryManager {
    /// Stack of commands that can be undone
    undo_stack: Vec<CommandBox>,
    /// Stack of commands that can be redone
    redo_stack: Vec<CommandBox>,
    /// Maximum number of undo levels
    max_size: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryManager {
    /// Create a new history manager with the specified max undo levels
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Execute a command and add it to the undo stack.
    /// A command that fails is not recorded.
    pub fn execute(&mut self, mut command: CommandBox, table: &mut Table) -> CsvResult<Change> {
        let change = command.execute(table)?;

        // Clear redo stack on new action
        self.redo_stack.clear();
        self.undo_stack.push(command);

        // Limit stack size
        while self.undo_stack.len() > self.max_size {
            let evicted = self.undo_stack.remove(0);
            tracing::trace!(command = evicted.description(), "evicted oldest history entry");
        }

        Ok(change)
    }

    /// Undo the last command. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self, table: &mut Table) -> CsvResult<Option<Change>> {
        let Some(mut command) = self.undo_stack.pop() else {
            return Ok(None);
        };

        match command.undo(table) {
            Ok(change) => {
                self.redo_stack.push(command);
                Ok(Some(change))
            }
            Err(err) => {
                self.undo_stack.push(command);
                Err(err)
            }
        }
    }

    /// Redo the last undone command. `Ok(None)` when there is nothing to redo.
    pub fn redo(&mut self, table: &mut Table) -> CsvResult<Option<Change>> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(None);
        };

        match command.execute(table) {
            Ok(change) => {
                self.undo_stack.push(command);
                Ok(Some(change))
            }
            Err(err) => {
                self.redo_stack.push(command);
                Err(err)
            }
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the description of the command that would be undone
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description())
    }

    /// Get the description of the command that would be redone
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl std::fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_size", &self.max_size)
            .finish()
    }
}
