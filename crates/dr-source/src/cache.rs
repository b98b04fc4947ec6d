//! Caller-owned graph cache.
//!
//! Graphs are keyed by [`SourceConfig::identity`] and stamped with the time
//! they were fetched.  There is no global state: the session that owns the
//! cache decides when to reuse, expire, or drop an entry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dr_graph::RiskGraph;

use crate::config::SourceConfig;
use crate::fetch::Fetcher;
use crate::fragments::load_graph;
use crate::SourceResult;

/// A loaded graph and when it was fetched.
#[derive(Clone)]
pub struct CachedGraph {
    pub graph:      Arc<RiskGraph>,
    pub fetched_at: SystemTime,
}

impl CachedGraph {
    /// Fresh if younger than `ttl` (always fresh without one).  A fetch time
    /// in the future counts as stale.
    pub fn is_fresh(&self, ttl: Option<Duration>, now: SystemTime) -> bool {
        match ttl {
            None => true,
            Some(ttl) => now
                .duration_since(self.fetched_at)
                .map(|age| age <= ttl)
                .unwrap_or(false),
        }
    }
}

#[derive(Default)]
pub struct GraphCache {
    ttl:     Option<Duration>,
    entries: HashMap<String, CachedGraph>,
}

impl GraphCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    /// The cached graph for `config`, loading it on a miss or when stale.
    pub fn get_or_load<F: Fetcher + ?Sized>(
        &mut self,
        config:  &SourceConfig,
        fetcher: &F,
    ) -> SourceResult<Arc<RiskGraph>> {
        self.get_or_load_at(config, fetcher, SystemTime::now())
    }

    /// [`get_or_load`](Self::get_or_load) with an explicit clock.
    pub fn get_or_load_at<F: Fetcher + ?Sized>(
        &mut self,
        config:  &SourceConfig,
        fetcher: &F,
        now:     SystemTime,
    ) -> SourceResult<Arc<RiskGraph>> {
        let identity = config.identity();
        if let Some(hit) = self.entries.get(&identity) {
            if hit.is_fresh(self.ttl, now) {
                tracing::debug!(source = %identity, "graph cache hit");
                return Ok(Arc::clone(&hit.graph));
            }
            tracing::info!(source = %identity, "cached graph expired; reloading");
        }

        // A failed reload leaves the stale entry in place for inspection but
        // never serves it.
        let graph = Arc::new(load_graph(config, fetcher)?);
        self.entries.insert(identity, CachedGraph { graph: Arc::clone(&graph), fetched_at: now });
        Ok(graph)
    }

    pub fn get(&self, config: &SourceConfig) -> Option<&CachedGraph> {
        self.entries.get(&config.identity())
    }

    /// Drop the entry for `config`; returns whether one existed.
    pub fn invalidate(&mut self, config: &SourceConfig) -> bool {
        self.entries.remove(&config.identity()).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
