use csvedit_core::CsvError;
use serde::Serialize;
use thiserror::Error;

use crate::host::HostError;

/// Session error type
#[derive(Error, Debug)]
pub enum SessionError {
    /// The file's text could not be turned into a table
    #[error("could not read file {file_name:?}: {source}")]
    Unreadable {
        file_name: String,
        #[source]
        source: CsvError,
    },

    #[error(transparent)]
    Host(#[from] HostError),

    /// An edit addressed a row or column that does not exist
    #[error("edit rejected: {0}")]
    Edit(#[from] CsvError),
}

impl SessionError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Unreadable { .. } => "UNREADABLE_FILE",
            SessionError::Host(err) => err.code(),
            SessionError::Edit(err) => err.code(),
        }
    }
}

/// Structured error object handed to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
}

impl From<&SessionError> for ErrorReport {
    fn from(err: &SessionError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl ErrorReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_unreadable() {
        let err = SessionError::Unreadable {
            file_name: "people.csv".to_string(),
            source: CsvError::Format {
                line: 2,
                reason: "unterminated quoted field".to_string(),
            },
        };
        let report = ErrorReport::from(&err);
        assert_eq!(report.code, "UNREADABLE_FILE");
        assert_eq!(
            report.message,
            "could not read file \"people.csv\": malformed input at line 2: unterminated quoted field"
        );
    }

    #[test]
    fn test_report_json() {
        let err = SessionError::from(CsvError::UnknownColumn("email".to_string()));
        let json = ErrorReport::from(&err).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"code":"KEY_ERROR","message":"edit rejected: unknown column: \"email\""}"#
        );
    }
}
