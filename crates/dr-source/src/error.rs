//! Fragment-loading error type.

use thiserror::Error;

use dr_graph::GraphError;

/// Errors produced by `dr-source`.  Any of them aborts the whole load.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot fetch {location}: {reason}")]
    Fetch { location: String, reason: String },

    #[error("{location} answered HTTP {status}")]
    Status { location: String, status: u16 },

    #[error("archive {location}: {reason}")]
    Archive { location: String, reason: String },

    #[error("no {what} fragments found in {location}")]
    NoFragments { what: &'static str, location: String },

    /// Decoding, schema, or dangling-edge failure while assembling the graph.
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// `true` when the source could not be reached or refused the request.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, SourceError::Fetch { .. } | SourceError::Status { .. })
    }
}

pub type SourceResult<T> = Result<T, SourceError>;
