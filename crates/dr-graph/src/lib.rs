//! `dr-graph` — flood-risk road graph, connectivity, and routing.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                  |
//! |------------------|-----------------------------------------------------------|
//! | [`records`]      | Fragment decoding into `NodeRecord` / `EdgeRecord`        |
//! | [`network`]      | `RiskGraph` (CSR + R-tree), `RiskGraphBuilder`, `build`   |
//! | [`connectivity`] | `analyze`, `weak_components`, `ConnectivityReport`        |
//! | [`router`]       | `Router` trait, `DijkstraRouter`, `shortest_path`, `path_weight` |
//! | [`shaping`]      | `to_points`, `Projection`                                 |
//! | [`error`]        | `GraphError`, `GeometryError`, `GraphResult<T>`           |

pub mod connectivity;
pub mod error;
pub mod network;
pub mod records;
pub mod router;
pub mod shaping;


pub use connectivity::{ConnectivityReport, analyze, weak_components};
pub use error::{GeometryError, GraphError, GraphResult};
pub use network::{DanglingEdgePolicy, RiskGraph, RiskGraphBuilder, build};
pub use router::{DijkstraRouter, PathResult, Router, path_weight, shortest_path};
pub use shaping::{Projection, to_points};
