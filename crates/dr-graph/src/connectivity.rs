//! Weak connectivity of the risk graph.
//!
//! Edges are read as undirected for this analysis only; routing still
//! follows edge direction.  Union-find with path halving and union by size,
//! O(V + E·α(V)).

use dr_core::NodeId;

use crate::network::RiskGraph;

/// Number of component sizes kept in a [`ConnectivityReport`].
pub const TOP_COMPONENTS: usize = 5;

/// Summary of the graph's weakly connected components.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConnectivityReport {
    /// One component, or an empty graph.
    pub weakly_connected: bool,
    pub component_count:  usize,
    /// Sizes of the largest components, descending, at most [`TOP_COMPONENTS`].
    pub largest_components: Vec<usize>,
}

/// Analyse weak connectivity.  An empty graph has 0 components and counts as
/// connected.
pub fn analyze(graph: &RiskGraph) -> ConnectivityReport {
    let mut sizes: Vec<usize> = weak_components(graph).iter().map(Vec::len).collect();
    let component_count = sizes.len();
    sizes.truncate(TOP_COMPONENTS);

    ConnectivityReport {
        weakly_connected: component_count <= 1,
        component_count,
        largest_components: sizes,
    }
}

/// Node ids of every weakly connected component.
///
/// Components are ordered largest first; equal sizes keep the order of their
/// smallest `NodeId`.  Ids inside a component are ascending.
pub fn weak_components(graph: &RiskGraph) -> Vec<Vec<NodeId>> {
    let mut sets = DisjointSets::new(graph.node_count());
    for (from, to) in graph.edge_from.iter().zip(&graph.edge_to) {
        sets.union(from.index(), to.index());
    }

    // Walking ids in order gives ascending members and first-seen order by
    // smallest id.
    let mut slot_of_root = vec![usize::MAX; graph.node_count()];
    let mut components: Vec<Vec<NodeId>> = Vec::new();
    for i in 0..graph.node_count() {
        let root = sets.find(i);
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = components.len();
            components.push(Vec::new());
        }
        components[slot_of_root[root]].push(NodeId(i as u32));
    }

    // Stable: ties stay in smallest-id order.
    components.sort_by(|a, b| b.len().cmp(&a.len()));
    components
}

struct DisjointSets {
    parent: Vec<usize>,
    size:   Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect(), size: vec![1; n] }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}
