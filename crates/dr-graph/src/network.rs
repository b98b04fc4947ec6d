//! Flood-risk road graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Edge arrays are sorted by source node with a *stable* sort, so a node's
//! outgoing edges keep the order in which the fragments first declared them.
//! `NodeId`s are handed out in first-appearance order.  Together these make
//! every traversal of the graph reproducible.
//!
//! # Merge policy
//!
//! - A node id seen again replaces the earlier node's coordinates and
//!   attributes wholesale (last write wins, no merging).
//! - An `(origin, destination)` pair seen again replaces the earlier edge's
//!   weights and attributes; the graph stays simple.
//! - An edge whose endpoint was never declared is handled per
//!   [`DanglingEdgePolicy`].
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest node that has
//! coordinates, so callers can pick endpoints by map position.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use dr_core::{Criterion, EdgeId, GeoPoint, NodeId, NodeKey};

use crate::records::{Attributes, EdgeRecord, EdgeWeights, NodeRecord};
use crate::{GraphError, GraphResult};

/// Weight used for an edge that has no value for the requested criterion.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space; good enough to rank
    /// candidates within a city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Dangling-edge policy ──────────────────────────────────────────────────────

/// What to do with an edge whose endpoint is not in the node set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanglingEdgePolicy {
    /// Fail the build with [`GraphError::DanglingEdge`].
    #[default]
    Reject,
    /// Create the missing endpoint with no coordinates or attributes.
    CreateNode,
}

// ── RiskGraph ─────────────────────────────────────────────────────────────────

/// Directed, simple, criterion-weighted graph in CSR format.
///
/// Read-only once built; share it behind an `Arc`.  Do not construct
/// directly; use [`RiskGraphBuilder`] or [`build`].
pub struct RiskGraph {
    // ── Node data (indexed by NodeId) ─────────────────────────────────────
    pub node_key:   Vec<NodeKey>,
    /// `None` for nodes lacking an `x`/`y` pair.
    pub node_pos:   Vec<Option<GeoPoint>>,
    pub node_attrs: Vec<Attributes>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_from:    Vec<NodeId>,
    pub edge_to:      Vec<NodeId>,
    pub edge_weights: Vec<EdgeWeights>,
    pub edge_attrs:   Vec<Attributes>,

    key_index:   FxHashMap<NodeKey, NodeId>,
    spatial_idx: RTree<NodeEntry>,
}

impl std::fmt::Debug for RiskGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("located", &self.spatial_idx.size())
            .finish_non_exhaustive()
    }
}

impl RiskGraph {
    /// A graph with no nodes or edges.
    pub fn empty() -> Self {
        RiskGraphBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_key.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_key.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    // ── Key lookup ────────────────────────────────────────────────────────

    /// Map a source-data key to its `NodeId`.
    pub fn resolve(&self, key: &NodeKey) -> GraphResult<NodeId> {
        self.key_index
            .get(key)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(key.clone()))
    }

    /// Resolve free text: the integer key if it parses as one and exists,
    /// the string key otherwise.
    pub fn resolve_str(&self, text: &str) -> GraphResult<NodeId> {
        let text = text.trim();
        if let Ok(n) = text.parse::<i64>() {
            if let Some(&id) = self.key_index.get(&NodeKey::Int(n)) {
                return Ok(id);
            }
        }
        self.key_index
            .get(&NodeKey::Str(text.to_owned()))
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(NodeKey::parse_lenient(text)))
    }

    #[inline]
    pub fn node_key(&self, node: NodeId) -> &NodeKey {
        &self.node_key[node.index()]
    }

    #[inline]
    pub fn node_pos(&self, node: NodeId) -> Option<GeoPoint> {
        self.node_pos[node.index()]
    }

    /// Attributes of the record that last defined `node` (everything but `id`).
    #[inline]
    pub fn node_attrs(&self, node: NodeId) -> &Attributes {
        &self.node_attrs[node.index()]
    }

    /// `(NodeId, key)` pairs in `NodeId` order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeKey)> + '_ {
        self.node_key
            .iter()
            .enumerate()
            .map(|(i, k)| (NodeId(i as u32), k))
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// The edge `from → to`, if any.
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.out_edges(from).find(|e| self.edge_to[e.index()] == to)
    }

    #[inline]
    pub fn edge_weights(&self, edge: EdgeId) -> &EdgeWeights {
        &self.edge_weights[edge.index()]
    }

    /// Weight of `edge` under `criterion`, [`DEFAULT_EDGE_WEIGHT`] if unset.
    #[inline]
    pub fn edge_weight(&self, edge: EdgeId, criterion: Criterion) -> f64 {
        self.edge_weights[edge.index()]
            .get(criterion)
            .unwrap_or(DEFAULT_EDGE_WEIGHT)
    }

    #[inline]
    pub fn edge_attrs(&self, edge: EdgeId) -> &Attributes {
        &self.edge_attrs[edge.index()]
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The node with coordinates nearest to `pos`.
    ///
    /// Returns `None` if no node has coordinates.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── Fragment entry point ──────────────────────────────────────────────────────

/// Merge decoded fragments into one graph.
///
/// Fragments are consumed in the order given.  Every node of every node
/// fragment is inserted before the first edge.
pub fn build(
    node_fragments: impl IntoIterator<Item = Vec<NodeRecord>>,
    edge_fragments: impl IntoIterator<Item = Vec<EdgeRecord>>,
    policy:         DanglingEdgePolicy,
) -> GraphResult<RiskGraph> {
    let mut builder = RiskGraphBuilder::new().dangling_edges(policy);
    for fragment in node_fragments {
        for record in fragment {
            builder.add_node(record);
        }
    }
    for fragment in edge_fragments {
        for record in fragment {
            builder.add_edge(record)?;
        }
    }
    Ok(builder.build())
}

// ── RiskGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RiskGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use dr_core::{Criterion, GeoPoint, NodeKey};
/// use dr_graph::RiskGraphBuilder;
/// use dr_graph::records::{EdgeRecord, EdgeWeights, NodeRecord};
///
/// let mut b = RiskGraphBuilder::new();
/// b.add_node(NodeRecord::at(1, GeoPoint::new(39.47, -0.37)));
/// b.add_node(NodeRecord::at(2, GeoPoint::new(39.48, -0.37)));
/// b.add_edge(EdgeRecord::weighted(1, 2, EdgeWeights::new(2.5, 30.0, 110.0))).unwrap();
/// let g = b.build();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 1); // directed
/// let e = g.edge_between(g.resolve(&NodeKey::Int(1)).unwrap(), g.resolve(&NodeKey::Int(2)).unwrap());
/// assert_eq!(g.edge_weight(e.unwrap(), Criterion::Cost), 2.5);
/// ```
pub struct RiskGraphBuilder {
    policy:     DanglingEdgePolicy,
    keys:       Vec<NodeKey>,
    positions:  Vec<Option<GeoPoint>>,
    node_attrs: Vec<Attributes>,
    key_index:  FxHashMap<NodeKey, NodeId>,
    raw_edges:  Vec<RawEdge>,
    pair_index: FxHashMap<(NodeId, NodeId), usize>,
    replaced_nodes: usize,
    replaced_edges: usize,
}

struct RawEdge {
    from:    NodeId,
    to:      NodeId,
    weights: EdgeWeights,
    attrs:   Attributes,
}

impl RiskGraphBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            policy:     DanglingEdgePolicy::default(),
            keys:       Vec::with_capacity(nodes),
            positions:  Vec::with_capacity(nodes),
            node_attrs: Vec::with_capacity(nodes),
            key_index:  FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            raw_edges:  Vec::with_capacity(edges),
            pair_index: FxHashMap::with_capacity_and_hasher(edges, Default::default()),
            replaced_nodes: 0,
            replaced_edges: 0,
        }
    }

    /// Set the dangling-edge policy (default [`DanglingEdgePolicy::Reject`]).
    pub fn dangling_edges(mut self, policy: DanglingEdgePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Insert or replace a node; returns its `NodeId`.
    pub fn add_node(&mut self, record: NodeRecord) -> NodeId {
        if let Some(&id) = self.key_index.get(&record.key) {
            self.positions[id.index()]  = record.pos;
            self.node_attrs[id.index()] = record.attrs;
            self.replaced_nodes += 1;
            return id;
        }
        self.push_node(record.key, record.pos, record.attrs)
    }

    /// Insert or replace the directed edge `origin → destination`.
    ///
    /// Fails with [`GraphError::DanglingEdge`] when an endpoint is unknown
    /// and the policy is [`DanglingEdgePolicy::Reject`].
    pub fn add_edge(&mut self, record: EdgeRecord) -> GraphResult<()> {
        let from = self.endpoint(&record.origin, &record)?;
        let to   = self.endpoint(&record.destination, &record)?;

        match self.pair_index.get(&(from, to)) {
            Some(&slot) => {
                let raw = &mut self.raw_edges[slot];
                raw.weights = record.weights;
                raw.attrs   = record.attrs;
                self.replaced_edges += 1;
            }
            None => {
                self.pair_index.insert((from, to), self.raw_edges.len());
                self.raw_edges.push(RawEdge {
                    from,
                    to,
                    weights: record.weights,
                    attrs:   record.attrs,
                });
            }
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize { self.keys.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    fn push_node(&mut self, key: NodeKey, pos: Option<GeoPoint>, attrs: Attributes) -> NodeId {
        let id = NodeId(self.keys.len() as u32);
        self.key_index.insert(key.clone(), id);
        self.keys.push(key);
        self.positions.push(pos);
        self.node_attrs.push(attrs);
        id
    }

    fn endpoint(&mut self, key: &NodeKey, edge: &EdgeRecord) -> GraphResult<NodeId> {
        if let Some(&id) = self.key_index.get(key) {
            return Ok(id);
        }
        match self.policy {
            DanglingEdgePolicy::Reject => Err(GraphError::DanglingEdge {
                origin:      edge.origin.clone(),
                destination: edge.destination.clone(),
                missing:     key.clone(),
            }),
            DanglingEdgePolicy::CreateNode => {
                tracing::warn!(
                    node = %key,
                    origin = %edge.origin,
                    destination = %edge.destination,
                    "edge references undeclared node; creating it without coordinates"
                );
                Ok(self.push_node(key.clone(), None, Attributes::new()))
            }
        }
    }

    /// Consume the builder and produce a [`RiskGraph`].
    ///
    /// Time complexity: O(E log E) for the edge sort + O(N log N) for the
    /// R-tree bulk load.
    pub fn build(self) -> RiskGraph {
        let node_count = self.keys.len();
        let edge_count = self.raw_edges.len();

        // Stable: equal sources keep declaration order.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let mut edge_from    = Vec::with_capacity(edge_count);
        let mut edge_to      = Vec::with_capacity(edge_count);
        let mut edge_weights = Vec::with_capacity(edge_count);
        let mut edge_attrs   = Vec::with_capacity(edge_count);
        for e in raw {
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_weights.push(e.weights);
            edge_attrs.push(e.attrs);
        }

        let entries: Vec<NodeEntry> = self
            .positions
            .iter()
            .enumerate()
            .filter_map(|(i, pos)| {
                pos.map(|p| NodeEntry { point: [p.lat, p.lon], id: NodeId(i as u32) })
            })
            .collect();
        let located = entries.len();
        let spatial_idx = RTree::bulk_load(entries);

        tracing::debug!(
            nodes = node_count,
            edges = edge_count,
            located,
            replaced_nodes = self.replaced_nodes,
            replaced_edges = self.replaced_edges,
            "risk graph built"
        );

        RiskGraph {
            node_key: self.keys,
            node_pos: self.positions,
            node_attrs: self.node_attrs,
            node_out_start,
            edge_from,
            edge_to,
            edge_weights,
            edge_attrs,
            key_index: self.key_index,
            spatial_idx,
        }
    }
}

impl Default for RiskGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
