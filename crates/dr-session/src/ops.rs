//! Stateless operations on a loaded graph.
//!
//! These take the graph explicitly so they work equally on a session's
//! cached graph and on one built in a test.

use dr_core::{Criterion, GeoPoint, NodeKey};
use dr_graph::{ConnectivityReport, PathResult, Projection, RiskGraph, Router};

use crate::SessionResult;

/// Weak-connectivity summary of `graph`.
pub fn connectivity_report(graph: &RiskGraph) -> ConnectivityReport {
    let report = dr_graph::analyze(graph);
    if !report.weakly_connected {
        tracing::info!(
            components = report.component_count,
            largest = ?report.largest_components,
            "graph is not weakly connected"
        );
    }
    report
}

/// Shortest path between two node keys under `criterion`.
pub fn compute_route(
    graph:       &RiskGraph,
    origin:      &NodeKey,
    destination: &NodeKey,
    criterion:   Criterion,
) -> SessionResult<PathResult> {
    Ok(dr_graph::shortest_path(graph, origin, destination, criterion)?)
}

/// [`compute_route`] through a caller-chosen routing engine.
pub fn compute_route_with<R: Router + ?Sized>(
    router:      &R,
    graph:       &RiskGraph,
    origin:      &NodeKey,
    destination: &NodeKey,
    criterion:   Criterion,
) -> SessionResult<PathResult> {
    let from = graph.resolve(origin)?;
    let to   = graph.resolve(destination)?;
    Ok(router.route(graph, from, to, criterion)?)
}

/// Map geometry of `path`.
pub fn project_to_map_points(graph: &RiskGraph, path: &PathResult) -> SessionResult<Projection> {
    Ok(dr_graph::to_points(graph, path)?)
}

/// Key of the node closest to `(lat, lon)`, if any node has coordinates.
pub fn nearest_node(graph: &RiskGraph, lat: f64, lon: f64) -> Option<&NodeKey> {
    graph.snap_to_node(GeoPoint::new(lat, lon)).map(|n| graph.node_key(n))
}

// ── RouteSummary ──────────────────────────────────────────────────────────────

/// A computed route with its totals under every criterion.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RouteSummary {
    pub origin:      NodeKey,
    pub destination: NodeKey,
    /// The criterion the route minimises.
    pub criterion:   Criterion,
    pub nodes:       Vec<NodeKey>,
    pub cost:        f64,
    pub time:        f64,
    pub distance:    f64,
}

impl RouteSummary {
    pub fn new(graph: &RiskGraph, path: &PathResult) -> Self {
        let nodes: Vec<NodeKey> = path.keys(graph).into_iter().cloned().collect();
        Self {
            origin:      graph.node_key(path.origin()).clone(),
            destination: graph.node_key(path.destination()).clone(),
            criterion:   path.criterion,
            nodes,
            cost:        path.weight_under(graph, Criterion::Cost),
            time:        path.weight_under(graph, Criterion::Time),
            distance:    path.weight_under(graph, Criterion::Distance),
        }
    }

    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Total under the criterion the route was optimised for.
    pub fn total(&self) -> f64 {
        match self.criterion {
            Criterion::Cost => self.cost,
            Criterion::Time => self.time,
            Criterion::Distance => self.distance,
        }
    }
}
