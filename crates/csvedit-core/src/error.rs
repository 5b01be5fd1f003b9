use thiserror::Error;

/// Errors raised by the parser and the table model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    /// Input text is structurally broken beyond repair
    #[error("malformed input at line {line}: {reason}")]
    Format { line: usize, reason: String },

    /// Row index outside `[0, len)`
    #[error("row {index} is out of bounds (table has {len} rows)")]
    RowOutOfBounds { index: usize, len: usize },

    /// Column key not present in the table
    #[error("unknown column: {0:?}")]
    UnknownColumn(String),

    /// A row whose width does not match the table's columns
    #[error("row has {found} fields but the table has {expected} columns")]
    ShapeMismatch { expected: usize, found: usize },

    /// Column key given twice when building a table by hand
    #[error("duplicate column: {0:?}")]
    DuplicateColumn(String),

    /// Delimiter/quote combination the reader and writer cannot use
    #[error("invalid dialect: {0}")]
    InvalidDialect(String),

    /// The CSV writer failed to produce output
    #[error("could not write table: {0}")]
    Write(String),
}

impl CsvError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            CsvError::Format { .. } => "FORMAT_ERROR",
            CsvError::RowOutOfBounds { .. } => "INDEX_ERROR",
            CsvError::UnknownColumn(_) => "KEY_ERROR",
            CsvError::ShapeMismatch { .. } => "SHAPE_ERROR",
            CsvError::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            CsvError::InvalidDialect(_) => "INVALID_DIALECT",
            CsvError::Write(_) => "WRITE_ERROR",
        }
    }

    /// True for problems with the input text rather than with how the
    /// table was driven
    pub fn is_format(&self) -> bool {
        matches!(self, CsvError::Format { .. })
    }
}

pub type CsvResult<T> = Result<T, CsvError>;
