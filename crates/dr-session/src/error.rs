//! Session-level error type and its user-facing classification.

use dr_graph::{GeometryError, GraphError};
use dr_source::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl SessionError {
    /// `true` when the user can fix the request (pick other nodes, another
    /// criterion) without reloading the data.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SessionError::Source(SourceError::Graph(e)) | SessionError::Graph(e) => !e.is_data_error(),
            SessionError::Source(_) => false,
            SessionError::Geometry(_) => true,
        }
    }

    /// One-line message for an end user.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Graph(GraphError::NoPathExists { origin, destination, .. }) => {
                format!("No route could be found: there is no path from {origin} to {destination}.")
            }
            SessionError::Graph(GraphError::NodeNotFound(key)) => {
                format!("Node {key} is not part of the road graph.")
            }
            SessionError::Graph(GraphError::NotAnEdge { from, to }) => {
                format!("There is no road from {from} to {to}.")
            }
            SessionError::Graph(GraphError::InvalidNodeId(id)) => {
                format!("Internal node reference {id} is not valid for this graph.")
            }
            SessionError::Geometry(GeometryError::SingleNodeGeometry { .. }) => {
                "The route was found, but only one of its nodes has coordinates, so it cannot be drawn."
                    .to_owned()
            }
            SessionError::Geometry(GeometryError::InsufficientGeometry { .. }) => {
                "The route was found, but none of its nodes has coordinates, so it cannot be drawn."
                    .to_owned()
            }
            SessionError::Source(e) if e.is_fetch_error() => {
                format!("The road data could not be downloaded: {e}")
            }
            SessionError::Source(SourceError::Config(reason)) => {
                format!("The data source is misconfigured: {reason}")
            }
            SessionError::Source(e) => format!("The road data could not be loaded: {e}"),
            SessionError::Graph(e) => format!("The road data is invalid: {e}"),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
