pub mod config;
pub mod error;
pub mod host;
pub mod session;

pub use config::SessionConfig;
pub use error::{ErrorReport, SessionError};
pub use host::{FsHost, HostError, HostFile, HostIo};
pub use session::{Export, Session, Snapshot};
