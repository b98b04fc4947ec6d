//! [`Session`]: one configured data source and its cached graph.

use std::sync::Arc;

use dr_core::{Criterion, NodeKey};
use dr_graph::{ConnectivityReport, DijkstraRouter, PathResult, RiskGraph, Router};
use dr_source::{DefaultFetcher, Fetcher, GraphCache, SourceConfig};

use crate::ops::{RouteSummary, compute_route_with, connectivity_report};
use crate::SessionResult;

/// A data source, its fetcher, a routing engine, and the cached graph.
///
/// Construct with [`SessionBuilder`](crate::SessionBuilder).  The graph is
/// loaded on first use and shared read-only afterwards.
pub struct Session<F: Fetcher = DefaultFetcher, R: Router = DijkstraRouter> {
    pub(crate) config:  SourceConfig,
    pub(crate) fetcher: F,
    pub(crate) router:  R,
    pub(crate) cache:   GraphCache,
}

impl<F: Fetcher, R: Router> Session<F, R> {
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// The graph for this session's source, loading it if not cached (or
    /// if the cached copy has expired).
    pub fn load_graph(&mut self) -> SessionResult<Arc<RiskGraph>> {
        Ok(self.cache.get_or_load(&self.config, &self.fetcher)?)
    }

    /// Drop the cached graph and load it again.
    pub fn reload(&mut self) -> SessionResult<Arc<RiskGraph>> {
        if self.cache.invalidate(&self.config) {
            tracing::info!(source = %self.config.identity(), "graph cache invalidated");
        }
        self.load_graph()
    }

    /// `true` if a graph is cached for this session's source.
    pub fn is_loaded(&self) -> bool {
        self.cache.get(&self.config).is_some()
    }

    pub fn connectivity(&mut self) -> SessionResult<ConnectivityReport> {
        let graph = self.load_graph()?;
        Ok(connectivity_report(&graph))
    }

    /// Route between two keys on the session graph with the session router.
    pub fn route(
        &mut self,
        origin:      &NodeKey,
        destination: &NodeKey,
        criterion:   Criterion,
    ) -> SessionResult<(Arc<RiskGraph>, PathResult)> {
        let graph = self.load_graph()?;
        let path  = compute_route_with(&self.router, &graph, origin, destination, criterion)?;
        Ok((graph, path))
    }

    /// [`route`](Self::route) summarised under every criterion.
    pub fn route_summary(
        &mut self,
        origin:      &NodeKey,
        destination: &NodeKey,
        criterion:   Criterion,
    ) -> SessionResult<RouteSummary> {
        let (graph, path) = self.route(origin, destination, criterion)?;
        Ok(RouteSummary::new(&graph, &path))
    }
}
