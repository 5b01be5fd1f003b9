use csvedit_core::{parse_report, serialize_with, ParseReport, RowView, Table};
use csvedit_history::{AddRowCommand, Change, CommandBox, DeleteRowCommand, HistoryManager, SetCellCommand};
use serde::Serialize;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::host::HostIo;

/// Serialized table ready to be handed to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub text: String,
    pub file_name: String,
}

/// Read-only view of the session for the host's renderer
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub file_name: Option<&'a str>,
    pub columns: &'a [String],
    pub rows: Vec<RowView<'a>>,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// One user's editing session.
///
/// Owns the current table from the moment a file is loaded until the next
/// load (or [`Session::close`]). Every edit runs through the undo history;
/// edits apply strictly in call order.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    table: Table,
    file_name: Option<String>,
    history: HistoryManager,
    last_report: ParseReport,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// Create a session with an empty table
    pub fn new(config: SessionConfig) -> Self {
        let history = HistoryManager::new(config.history_capacity);
        Self {
            config,
            table: Table::new(),
            file_name: None,
            history,
            last_report: ParseReport::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Name of the loaded file, if it had one
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Repairs applied by the most recent successful load
    pub fn last_report(&self) -> &ParseReport {
        &self.last_report
    }

    /// Whether there is anything to show or export
    pub fn has_data(&self) -> bool {
        !self.table.is_empty()
    }

    /// Replace the current table with one parsed from `text`.
    ///
    /// On failure the previous table, name and history are kept.
    pub fn load(&mut self, text: &str, file_name: Option<&str>) -> Result<&ParseReport, SessionError> {
        let parsed = parse_report(text, &self.config.dialect).map_err(|source| {
            tracing::warn!(file = ?file_name, %source, "failed to parse file");
            SessionError::Unreadable {
                file_name: file_name
                    .unwrap_or(self.config.default_file_name.as_str())
                    .to_string(),
                source,
            }
        })?;

        tracing::info!(
            file = ?file_name,
            columns = parsed.table.column_count(),
            rows = parsed.table.row_count(),
            ragged = parsed.report.ragged_rows,
            duplicates = parsed.report.duplicate_columns.len(),
            "loaded table"
        );

        self.table = parsed.table;
        self.last_report = parsed.report;
        self.file_name = file_name.map(str::to_string);
        self.history.clear();

        Ok(&self.last_report)
    }

    /// Ask the host for the user's selection and load it
    pub fn open(&mut self, host: &dyn HostIo, selection: &str) -> Result<&ParseReport, SessionError> {
        let file = host.read_file(selection).inspect_err(|err| {
            tracing::warn!(selection, %err, "host could not read file");
        })?;
        self.load(&file.text, file.name.as_deref())
    }

    /// Discard the table and everything tied to it
    pub fn close(&mut self) {
        self.table = Table::new();
        self.file_name = None;
        self.last_report = ParseReport::default();
        self.history.clear();
    }

    fn apply(&mut self, command: CommandBox) -> Result<Change, SessionError> {
        let description = command.description().to_string();
        match self.history.execute(command, &mut self.table) {
            Ok(change) => {
                tracing::debug!(command = %description, ?change, "applied edit");
                Ok(change)
            }
            Err(err) => {
                tracing::warn!(command = %description, code = err.code(), %err, "edit rejected");
                Err(err.into())
            }
        }
    }

    /// Replace the value at `(row, column)`
    pub fn set_cell(&mut self, row: usize, column: &str, value: &str) -> Result<Change, SessionError> {
        self.apply(Box::new(SetCellCommand::new(row, column, value)))
    }

    /// Append an empty row, returning its index
    pub fn add_row(&mut self) -> Result<usize, SessionError> {
        let index = self.table.row_count();
        self.apply(Box::new(AddRowCommand::new()))?;
        Ok(index)
    }

    /// Remove the row at `row`
    pub fn delete_row(&mut self, row: usize) -> Result<Change, SessionError> {
        self.apply(Box::new(DeleteRowCommand::new(row)))
    }

    pub fn undo(&mut self) -> Result<Option<Change>, SessionError> {
        let change = self.history.undo(&mut self.table)?;
        tracing::debug!(?change, "undo");
        Ok(change)
    }

    pub fn redo(&mut self) -> Result<Option<Change>, SessionError> {
        let change = self.history.redo(&mut self.table)?;
        tracing::debug!(?change, "redo");
        Ok(change)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Name the export will be saved under
    pub fn export_name(&self) -> &str {
        self.file_name
            .as_deref()
            .unwrap_or(self.config.default_file_name.as_str())
    }

    /// Serialize the current table
    pub fn export(&self) -> Result<Export, SessionError> {
        Ok(Export {
            text: serialize_with(&self.table, &self.config.dialect)?,
            file_name: self.export_name().to_string(),
        })
    }

    /// Serialize the current table and hand it to the host
    pub fn download(&self, host: &dyn HostIo) -> Result<Export, SessionError> {
        let export = self.export()?;
        host.trigger_download(&export.text, &export.file_name)?;
        tracing::info!(file = %export.file_name, rows = self.table.row_count(), "exported table");
        Ok(export)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            file_name: self.file_name(),
            columns: self.table.columns(),
            rows: self.table.rows().collect(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }
}
