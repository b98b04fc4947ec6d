//! Fragment collection and graph assembly.
//!
//! Loading is all-or-nothing: the first fetch, decode, or schema error
//! aborts and no partial graph is ever returned.  Fragments are merged in a
//! fixed order (shard index, archive order, or directory index) whether or
//! not they were fetched in parallel.

use std::path::Path;

use dr_graph::records::{decode_edge_fragment, decode_node_fragment};
use dr_graph::{DanglingEdgePolicy, RiskGraph};

use crate::archive::read_archive;
use crate::config::{FRAGMENT_EXTENSION, SourceConfig, SourceKind};
use crate::fetch::Fetcher;
use crate::{SourceError, SourceResult};

/// One raw payload and the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub name:    String,
    pub payload: Vec<u8>,
}

/// Every fragment of a source, in merge order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentSet {
    pub nodes: Vec<Fragment>,
    pub edges: Vec<Fragment>,
}

impl FragmentSet {
    /// Decode every fragment and build the graph.
    pub fn assemble(&self, policy: DanglingEdgePolicy) -> SourceResult<RiskGraph> {
        let nodes = self
            .nodes
            .iter()
            .map(|f| decode_node_fragment(&f.name, &f.payload))
            .collect::<Result<Vec<_>, _>>()?;
        let edges = self
            .edges
            .iter()
            .map(|f| decode_edge_fragment(&f.name, &f.payload))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(dr_graph::build(nodes, edges, policy)?)
    }

    pub fn payload_bytes(&self) -> usize {
        self.nodes.iter().chain(&self.edges).map(|f| f.payload.len()).sum()
    }
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Fetch (or read) every fragment named by `config`.
pub fn load_fragments<F: Fetcher + ?Sized>(
    config:  &SourceConfig,
    fetcher: &F,
) -> SourceResult<FragmentSet> {
    config.validate()?;
    let set = match &config.source {
        SourceKind::Sharded { base, node_count, edge_count } => FragmentSet {
            nodes: fetch_all(fetcher, shard_targets(base, &config.node_prefix, *node_count))?,
            edges: fetch_all(fetcher, shard_targets(base, &config.edge_prefix, *edge_count))?,
        },
        SourceKind::Archive { location } => {
            let bytes = fetcher.fetch(location)?;
            read_archive(location, bytes, &config.node_prefix, &config.edge_prefix)?
        }
        SourceKind::Directory { path } => {
            let nodes = scan_directory(path, &config.node_prefix)?;
            if nodes.is_empty() {
                return Err(SourceError::NoFragments {
                    what:     "node",
                    location: path.display().to_string(),
                });
            }
            FragmentSet {
                nodes: fetch_all(fetcher, nodes)?,
                edges: fetch_all(fetcher, scan_directory(path, &config.edge_prefix)?)?,
            }
        }
    };

    tracing::info!(
        source = %config.identity(),
        node_fragments = set.nodes.len(),
        edge_fragments = set.edges.len(),
        bytes = set.payload_bytes(),
        "fragments loaded"
    );
    Ok(set)
}

/// Load fragments and assemble them into a graph.
pub fn load_graph<F: Fetcher + ?Sized>(config: &SourceConfig, fetcher: &F) -> SourceResult<RiskGraph> {
    let graph = load_fragments(config, fetcher)?.assemble(config.dangling_edges)?;
    tracing::info!(nodes = graph.node_count(), edges = graph.edge_count(), "graph assembled");
    Ok(graph)
}

// ── Targets ───────────────────────────────────────────────────────────────────

/// A fragment to fetch: report name and location.
struct Target {
    name:     String,
    location: String,
}

fn shard_targets(base: &str, prefix: &str, count: usize) -> Vec<Target> {
    (1..=count)
        .map(|i| {
            let name = SourceConfig::shard_name(prefix, i);
            Target { location: join(base, &name), name }
        })
        .collect()
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() || base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}

/// `{prefix}{i}.json` files in `dir`, ordered by `i` and then by file name,
/// so `nodos_01.json` and `nodos_1.json` merge in the same order on every
/// filesystem.
fn scan_directory(dir: &Path, prefix: &str) -> SourceResult<Vec<Target>> {
    let mut found: Vec<(u64, Target)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        let index = file_name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(FRAGMENT_EXTENSION))
            .and_then(|i| i.parse::<u64>().ok());
        if let Some(index) = index {
            found.push((index, Target {
                location: entry.path().display().to_string(),
                name:     file_name,
            }));
        }
    }
    found.sort_by(|(a, ta), (b, tb)| a.cmp(b).then_with(|| ta.name.cmp(&tb.name)));
    Ok(found.into_iter().map(|(_, t)| t).collect())
}

// ── Fetching ──────────────────────────────────────────────────────────────────

fn fetch_one<F: Fetcher + ?Sized>(fetcher: &F, target: Target) -> SourceResult<Fragment> {
    tracing::debug!(fragment = %target.name, location = %target.location, "fetching fragment");
    let payload = fetcher.fetch(&target.location)?;
    Ok(Fragment { name: target.name, payload })
}

#[cfg(not(feature = "parallel"))]
fn fetch_all<F: Fetcher + ?Sized>(fetcher: &F, targets: Vec<Target>) -> SourceResult<Vec<Fragment>> {
    targets.into_iter().map(|t| fetch_one(fetcher, t)).collect()
}

/// Collecting a parallel iterator into `Result<Vec<_>, _>` keeps input order.
#[cfg(feature = "parallel")]
fn fetch_all<F: Fetcher + ?Sized>(fetcher: &F, targets: Vec<Target>) -> SourceResult<Vec<Fragment>> {
    use rayon::prelude::*;
    targets.into_par_iter().map(|t| fetch_one(fetcher, t)).collect()
}
