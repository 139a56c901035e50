//! Error type for the persistence layer.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The store operation that failed, used to label [`Error::Operation`] and the
/// log lines emitted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    GetAll,
    Delete,
    Clear,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Add => "adding entry",
            Operation::GetAll => "retrieving entries",
            Operation::Delete => "deleting entry",
            Operation::Clear => "deleting all entries",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// The database could not be opened or its schema could not be created.
    #[error("storage unavailable at {path}: {source}")]
    Unavailable {
        path: String,
        #[source]
        source: tokio_rusqlite::Error,
    },

    #[error("failed to create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error {op}: {source}")]
    Operation {
        op: Operation,
        #[source]
        source: tokio_rusqlite::Error,
    },
}

impl Error {
    pub(crate) fn operation(op: Operation) -> impl FnOnce(tokio_rusqlite::Error) -> Self {
        move |source| Error::Operation { op, source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
