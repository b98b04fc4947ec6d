//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Callers route through the [`Router`] trait, so a different engine (A*,
//! contraction hierarchies) can be swapped in without touching the graph.
//! [`shortest_path`] is the key-based entry point most callers want.
//!
//! # Determinism
//!
//! Heap entries are ordered by `(distance, NodeId)` and a predecessor is only
//! replaced by a strictly shorter distance.  Among several minimal paths the
//! one found first wins, where "first" follows NodeId order (first appearance
//! in the fragments) and then out-edge declaration order.  The same graph
//! always yields the same path.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use dr_core::{Criterion, EdgeId, NodeId, NodeKey};

use crate::network::RiskGraph;
use crate::{GraphError, GraphResult};

// ── PathResult ────────────────────────────────────────────────────────────────

/// A shortest path and its accumulated weight.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Nodes from origin to destination, both inclusive.
    pub nodes: Vec<NodeId>,
    /// Edges traversed, `nodes.len() - 1` of them.
    pub edges: Vec<EdgeId>,
    /// The criterion the path minimises.
    pub criterion: Criterion,
    /// Sum of edge weights under `criterion`.
    pub total_weight: f64,
}

impl PathResult {
    /// `true` if origin and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn origin(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn destination(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Source-data keys of the path's nodes, in order.
    pub fn keys<'g>(&self, graph: &'g RiskGraph) -> Vec<&'g NodeKey> {
        self.nodes.iter().map(|&n| graph.node_key(n)).collect()
    }

    /// Re-score the same edges under another criterion.
    ///
    /// The path is only guaranteed minimal for [`Self::criterion`].
    pub fn weight_under(&self, graph: &RiskGraph, criterion: Criterion) -> f64 {
        self.edges.iter().map(|&e| graph.edge_weight(e, criterion)).sum()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
pub trait Router: Send + Sync {
    /// Compute a minimal-weight directed path from `from` to `to`.
    ///
    /// `from == to` yields a single-node path of weight 0.  No directed path
    /// yields [`GraphError::NoPathExists`].
    fn route(
        &self,
        graph:     &RiskGraph,
        from:      NodeId,
        to:        NodeId,
        criterion: Criterion,
    ) -> GraphResult<PathResult>;
}

/// Dijkstra's algorithm over the CSR graph with a binary heap.
///
/// Edge weights are non-negative by construction (the fragment decoder
/// rejects negative values).
#[derive(Debug, Default, Clone, Copy)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        graph:     &RiskGraph,
        from:      NodeId,
        to:        NodeId,
        criterion: Criterion,
    ) -> GraphResult<PathResult> {
        dijkstra(graph, from, to, criterion)
    }
}

// ── Key-based entry points ────────────────────────────────────────────────────

/// Shortest path between two source-data keys with [`DijkstraRouter`].
///
/// Fails with [`GraphError::NodeNotFound`] (origin checked first) or
/// [`GraphError::NoPathExists`].
pub fn shortest_path(
    graph:       &RiskGraph,
    origin:      &NodeKey,
    destination: &NodeKey,
    criterion:   Criterion,
) -> GraphResult<PathResult> {
    let from = graph.resolve(origin)?;
    let to   = graph.resolve(destination)?;
    DijkstraRouter.route(graph, from, to, criterion)
}

/// Accumulated weight of an arbitrary caller-supplied path.
///
/// Every consecutive pair must be an edge of the graph.  A path of zero or
/// one node weighs 0.
pub fn path_weight(graph: &RiskGraph, path: &[NodeKey], criterion: Criterion) -> GraphResult<f64> {
    let ids = path
        .iter()
        .map(|k| graph.resolve(k))
        .collect::<GraphResult<Vec<_>>>()?;

    let mut total = 0.0;
    for pair in ids.windows(2) {
        let edge = graph
            .edge_between(pair[0], pair[1])
            .ok_or_else(|| GraphError::NotAnEdge {
                from: graph.node_key(pair[0]).clone(),
                to:   graph.node_key(pair[1]).clone(),
            })?;
        total += graph.edge_weight(edge, criterion);
    }
    Ok(total)
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Totally ordered `f64` for the heap.  Distances are non-negative (possibly
/// `+inf` after overflow), so `total_cmp` agrees with numeric order.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Dist(f64);

impl Eq for Dist {}

impl PartialOrd for Dist {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dist {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(
    graph:     &RiskGraph,
    from:      NodeId,
    to:        NodeId,
    criterion: Criterion,
) -> GraphResult<PathResult> {
    for id in [from, to] {
        if !graph.contains(id) {
            return Err(GraphError::InvalidNodeId(id));
        }
    }

    if from == to {
        return Ok(PathResult {
            nodes: vec![from],
            edges: vec![],
            criterion,
            total_weight: 0.0,
        });
    }

    // `None` = not reached yet.  Reachability is kept apart from the
    // distance so a sum that overflows to infinity still counts as reached.
    let n = graph.node_count();
    let mut dist: Vec<Option<f64>> = vec![None; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = Some(0.0);

    // Reverse turns the max-heap into a min-heap; NodeId breaks ties.
    let mut heap: BinaryHeap<Reverse<(Dist, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Dist(0.0), from)));

    while let Some(Reverse((Dist(d), node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, from, to, criterion, d));
        }

        // Stale entry.
        if dist[node.index()].is_some_and(|best| d > best) {
            continue;
        }

        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            let next = d + graph.edge_weight(edge, criterion);

            if dist[neighbor.index()].is_none_or(|best| next < best) {
                dist[neighbor.index()] = Some(next);
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((Dist(next), neighbor)));
            }
        }
    }

    Err(GraphError::NoPathExists {
        origin:      graph.node_key(from).clone(),
        destination: graph.node_key(to).clone(),
        criterion,
    })
}

fn reconstruct(
    graph:        &RiskGraph,
    prev_edge:    &[EdgeId],
    from:         NodeId,
    to:           NodeId,
    criterion:    Criterion,
    total_weight: f64,
) -> PathResult {
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        debug_assert_ne!(e, EdgeId::INVALID, "settled node without predecessor");
        edges.push(e);
        cur = graph.edge_from[e.index()];
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(from);
    nodes.extend(edges.iter().map(|e| graph.edge_to[e.index()]));

    PathResult { nodes, edges, criterion, total_weight }
}
