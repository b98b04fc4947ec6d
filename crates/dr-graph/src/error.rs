//! Graph-subsystem error types.

use thiserror::Error;

use dr_core::{Criterion, NodeId, NodeKey};

/// Errors produced while assembling or querying a [`RiskGraph`](crate::RiskGraph).
#[derive(Debug, Error)]
pub enum GraphError {
    /// The payload is not a JSON array of records.
    #[error("fragment {fragment}: cannot decode payload: {source}")]
    Decode {
        fragment: String,
        #[source]
        source:   serde_json::Error,
    },

    /// One record of an otherwise well-formed payload violates the schema.
    #[error("fragment {fragment}, record {index}: {reason}")]
    MalformedFragment {
        fragment: String,
        index:    usize,
        reason:   String,
    },

    #[error("edge {origin} -> {destination} references unknown node {missing}")]
    DanglingEdge {
        origin:      NodeKey,
        destination: NodeKey,
        missing:     NodeKey,
    },

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeKey),

    #[error("{0} is out of range for this graph")]
    InvalidNodeId(NodeId),

    #[error("no path from {origin} to {destination} minimising {criterion}")]
    NoPathExists {
        origin:      NodeKey,
        destination: NodeKey,
        criterion:   Criterion,
    },

    #[error("{from} -> {to} is not an edge of the graph")]
    NotAnEdge { from: NodeKey, to: NodeKey },
}

impl GraphError {
    /// `true` for failures caused by the source data rather than by a query.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            GraphError::Decode { .. }
                | GraphError::MalformedFragment { .. }
                | GraphError::DanglingEdge { .. }
        )
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

/// A path that routes fine but cannot be drawn.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("no node on the path has coordinates ({} skipped)", .skipped.len())]
    InsufficientGeometry { skipped: Vec<NodeKey> },

    #[error("only one node on the path has coordinates ({} skipped)", .skipped.len())]
    SingleNodeGeometry {
        point:   dr_core::GeoPoint,
        skipped: Vec<NodeKey>,
    },
}
