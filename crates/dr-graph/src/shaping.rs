//! Path → map geometry.
//!
//! Turns a [`PathResult`] into the `(lat, lon)` points a map widget draws as
//! markers and a polyline.  Nodes without a full `x`/`y` pair are left out
//! and reported, so the caller can still draw the rest of the route.

use dr_core::{GeoPoint, NodeKey};

use crate::error::GeometryError;
use crate::network::RiskGraph;
use crate::router::PathResult;

/// Drawable points of a path (always at least two).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Projection {
    /// Points in path order.
    pub points:  Vec<GeoPoint>,
    /// Keys of path nodes that had no coordinates.
    pub skipped: Vec<NodeKey>,
}

impl Projection {
    /// Where the start marker goes.
    pub fn start(&self) -> GeoPoint {
        self.points[0]
    }

    /// Where the destination marker goes.
    pub fn end(&self) -> GeoPoint {
        self.points[self.points.len() - 1]
    }

    /// Points as `(lat, lon)` tuples.
    pub fn lat_lon(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| p.lat_lon()).collect()
    }
}

/// Project `path` onto map coordinates.
///
/// Fewer than two located nodes cannot be drawn:
/// zero yields [`GeometryError::InsufficientGeometry`], exactly one
/// [`GeometryError::SingleNodeGeometry`].
pub fn to_points(graph: &RiskGraph, path: &PathResult) -> Result<Projection, GeometryError> {
    let mut points  = Vec::with_capacity(path.nodes.len());
    let mut skipped = Vec::new();

    for &node in &path.nodes {
        match graph.node_pos(node) {
            Some(p) => points.push(p),
            None => skipped.push(graph.node_key(node).clone()),
        }
    }

    if !skipped.is_empty() {
        tracing::warn!(
            skipped = skipped.len(),
            kept = points.len(),
            "path nodes without coordinates left out of the map geometry"
        );
    }

    match points.as_slice() {
        [] => Err(GeometryError::InsufficientGeometry { skipped }),
        [only] => Err(GeometryError::SingleNodeGeometry { point: *only, skipped }),
        _ => Ok(Projection { points, skipped }),
    }
}
