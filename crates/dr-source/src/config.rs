//! Where the fragments live and how to read them.
//!
//! # TOML format
//!
//! ```toml
//! node_prefix    = "nodos_"
//! edge_prefix    = "aristas_"
//! timeout_secs   = 30
//! cache_ttl_secs = 3600
//! dangling_edges = "reject"        # or "create_node"
//!
//! [source]
//! kind       = "sharded"           # or "archive" / "directory"
//! base       = "https://raw.githubusercontent.com/dryroutes/app_2/main/"
//! node_count = 4
//! edge_count = 14
//! ```
//!
//! Every key is optional; the defaults reproduce the public DryRoutes
//! deployment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use dr_graph::DanglingEdgePolicy;

use crate::{SourceError, SourceResult};

pub const DEFAULT_BASE_URL:    &str  = "https://raw.githubusercontent.com/dryroutes/app_2/main/";
pub const DEFAULT_NODE_PREFIX: &str  = "nodos_";
pub const DEFAULT_EDGE_PREFIX: &str  = "aristas_";
pub const DEFAULT_NODE_SHARDS: usize = 4;
pub const DEFAULT_EDGE_SHARDS: usize = 14;
pub const DEFAULT_TIMEOUT_SECS: u64  = 30;

/// Extension every fragment file carries.
pub const FRAGMENT_EXTENSION: &str = ".json";

/// Fragment delivery.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// `{base}{prefix}{i}.json` for i = 1..=count.  `base` is a URL or a
    /// local directory.
    Sharded {
        #[serde(default = "default_base")]
        base:       String,
        #[serde(default = "default_node_shards")]
        node_count: usize,
        #[serde(default = "default_edge_shards")]
        edge_count: usize,
    },
    /// One zip archive (URL or path) holding every fragment.
    Archive { location: String },
    /// A local directory scanned for `{prefix}{i}.json` files.
    Directory { path: PathBuf },
}

fn default_base() -> String { DEFAULT_BASE_URL.to_owned() }
fn default_node_shards() -> usize { DEFAULT_NODE_SHARDS }
fn default_edge_shards() -> usize { DEFAULT_EDGE_SHARDS }

impl Default for SourceKind {
    fn default() -> Self {
        SourceKind::Sharded {
            base:       default_base(),
            node_count: default_node_shards(),
            edge_count: default_edge_shards(),
        }
    }
}

/// Everything needed to load a graph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub source:         SourceKind,
    pub node_prefix:    String,
    pub edge_prefix:    String,
    /// HTTP request timeout.
    pub timeout_secs:   u64,
    /// How long a cached graph stays fresh; `None` keeps it for the session.
    pub cache_ttl_secs: Option<u64>,
    pub dangling_edges: DanglingEdgePolicy,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            source:         SourceKind::default(),
            node_prefix:    DEFAULT_NODE_PREFIX.to_owned(),
            edge_prefix:    DEFAULT_EDGE_PREFIX.to_owned(),
            timeout_secs:   DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: None,
            dangling_edges: DanglingEdgePolicy::default(),
        }
    }
}

impl SourceConfig {
    /// Default settings pointed at another source.
    pub fn with_source(source: SourceKind) -> Self {
        Self { source, ..Self::default() }
    }

    pub fn from_toml_str(text: &str) -> SourceResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SourceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> SourceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject settings that cannot name any fragment.
    pub fn validate(&self) -> SourceResult<()> {
        if self.node_prefix.is_empty() || self.edge_prefix.is_empty() {
            return Err(SourceError::Config("fragment prefixes must not be empty".into()));
        }
        if self.node_prefix == self.edge_prefix {
            return Err(SourceError::Config(format!(
                "node and edge prefixes are both {:?}",
                self.node_prefix
            )));
        }
        if let SourceKind::Sharded { node_count: 0, .. } = self.source {
            return Err(SourceError::Config("sharded source needs at least one node fragment".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    /// Key identifying the data this config loads, used by the graph cache.
    ///
    /// Settings that change the resulting graph are part of the key; the
    /// timeout and TTL are not.
    pub fn identity(&self) -> String {
        let source = match &self.source {
            SourceKind::Sharded { base, node_count, edge_count } => {
                format!("sharded:{base}[{node_count}/{edge_count}]")
            }
            SourceKind::Archive { location } => format!("archive:{location}"),
            SourceKind::Directory { path } => format!("directory:{}", path.display()),
        };
        format!(
            "{source}|{}|{}|{:?}",
            self.node_prefix, self.edge_prefix, self.dangling_edges
        )
    }

    /// File name of shard `index` (1-based) for `prefix`.
    pub fn shard_name(prefix: &str, index: usize) -> String {
        format!("{prefix}{index}{FRAGMENT_EXTENSION}")
    }
}
