//! Boundary to whatever picks files and delivers downloads.
//!
//! A browser host would wrap its file input and download link behind
//! [`HostIo`]; [`FsHost`] does the same over a local directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A file delivered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFile {
    /// File name as the user saw it, if the host knows one
    pub name: Option<String>,
    /// Complete file content
    pub text: String,
}

/// Errors raised by a host
#[derive(Error, Debug)]
pub enum HostError {
    #[error("could not read file {selection:?}: {source}")]
    Read {
        selection: String,
        #[source]
        source: io::Error,
    },

    #[error("could not read file {selection:?}: content is not valid UTF-8")]
    NotUtf8 { selection: String },

    #[error("invalid download name: {0:?}")]
    InvalidName(String),

    #[error("could not save {file_name:?}: {source}")]
    Write {
        file_name: String,
        #[source]
        source: io::Error,
    },
}

impl HostError {
    pub fn code(&self) -> &'static str {
        match self {
            HostError::Read { .. } | HostError::NotUtf8 { .. } => "READ_ERROR",
            HostError::InvalidName(_) => "INVALID_NAME",
            HostError::Write { .. } => "WRITE_ERROR",
        }
    }
}

/// Host side of the editor: supplies raw text and consumes exports
pub trait HostIo {
    /// Fetch the complete content of the user's selection
    fn read_file(&self, selection: &str) -> Result<HostFile, HostError>;

    /// Hand serialized text to the user under `file_name`
    fn trigger_download(&self, text: &str, file_name: &str) -> Result<(), HostError>;
}

/// Filesystem host: selections are paths, downloads land in one directory
#[derive(Debug, Clone)]
pub struct FsHost {
    download_dir: PathBuf,
}

impl FsHost {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }
}

impl HostIo for FsHost {
    fn read_file(&self, selection: &str) -> Result<HostFile, HostError> {
        let path = Path::new(selection);
        let bytes = fs::read(path).map_err(|source| HostError::Read {
            selection: selection.to_string(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| HostError::NotUtf8 {
            selection: selection.to_string(),
        })?;

        tracing::debug!(path = %path.display(), bytes = text.len(), "read file");

        Ok(HostFile {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            text,
        })
    }

    fn trigger_download(&self, text: &str, file_name: &str) -> Result<(), HostError> {
        // Only a bare name is accepted; the host decides where it goes
        let name = Path::new(file_name)
            .file_name()
            .filter(|name| name.len() == file_name.len())
            .ok_or_else(|| HostError::InvalidName(file_name.to_string()))?;

        let target = self.download_dir.join(name);
        fs::write(&target, text).map_err(|source| HostError::Write {
            file_name: file_name.to_string(),
            source,
        })?;

        tracing::info!(path = %target.display(), bytes = text.len(), "download written");
        Ok(())
    }
}
