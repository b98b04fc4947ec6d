//! `dr-session` — the DryRoutes operation surface.
//!
//! # Operations
//!
//! ```text
//! load_graph()                                  → Arc<RiskGraph>   (cached per source)
//! connectivity_report(graph)                    → ConnectivityReport
//! compute_route(graph, origin, dest, criterion) → PathResult
//! project_to_map_points(graph, path)            → Projection
//! ```
//!
//! Every failure surfaces as a [`SessionError`]; use
//! [`SessionError::user_message`] for display and
//! [`SessionError::is_recoverable`] to tell bad input from bad data.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dr_core::{Criterion, NodeKey};
//! use dr_session::{SessionBuilder, project_to_map_points};
//! use dr_source::SourceConfig;
//!
//! let mut session = SessionBuilder::new(SourceConfig::default()).build()?;
//! let (graph, path) = session.route(&NodeKey::Int(1), &NodeKey::Int(3), Criterion::Time)?;
//! let points = project_to_map_points(&graph, &path)?;
//! ```

pub mod builder;
pub mod error;
pub mod ops;
pub mod session;

#[cfg(test)]
mod tests;

pub use builder::SessionBuilder;
pub use error::{SessionError, SessionResult};
pub use ops::{
    RouteSummary, compute_route, compute_route_with, connectivity_report, nearest_node,
    project_to_map_points,
};
pub use session::Session;
