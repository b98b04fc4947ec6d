//! `dr-core` — foundational types for the DryRoutes flood-risk router.
//!
//! This crate is a dependency of every other `dr-*` crate.  It has no `dr-*`
//! dependencies and a single external one (`serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId` (dense indices)                    |
//! | [`key`]         | `NodeKey` (the identifier used by the source data)    |
//! | [`geo`]         | `GeoPoint`, haversine distance                        |
//! | [`criterion`]   | `Criterion` enum (cost / time / distance)             |

pub mod criterion;
pub mod geo;
pub mod ids;
pub mod key;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use criterion::{Criterion, ParseCriterionError};
pub use geo::GeoPoint;
pub use ids::{EdgeId, NodeId};
pub use key::NodeKey;
