//! Fluent builder for constructing a [`Session`].

use std::time::Duration;

use dr_graph::{DijkstraRouter, Router};
use dr_source::{DefaultFetcher, Fetcher, GraphCache, SourceConfig};

use crate::{Session, SessionResult};

/// Fluent builder for [`Session<F, R>`].
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                         |
/// |-----------------|-------------------------------------------------|
/// | `.fetcher(f)`   | `DefaultFetcher` with the config's HTTP timeout |
/// | `.router(r)`    | `DijkstraRouter`                                |
/// | `.cache_ttl(t)` | `config.cache_ttl()`                            |
///
/// # Example
///
/// ```rust,ignore
/// let config  = SourceConfig::from_path(Path::new("dryroutes.toml"))?;
/// let mut session = SessionBuilder::new(config).build()?;
/// let graph = session.load_graph()?;
/// ```
pub struct SessionBuilder<F: Fetcher = DefaultFetcher, R: Router = DijkstraRouter> {
    config:    SourceConfig,
    fetcher:   F,
    router:    R,
    cache_ttl: Option<Duration>,
}

impl SessionBuilder {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            fetcher:   DefaultFetcher::new(config.timeout()),
            router:    DijkstraRouter,
            cache_ttl: config.cache_ttl(),
            config,
        }
    }
}

impl<F: Fetcher, R: Router> SessionBuilder<F, R> {
    /// Replace where fragment bytes come from.
    pub fn fetcher<G: Fetcher>(self, fetcher: G) -> SessionBuilder<G, R> {
        SessionBuilder {
            config:    self.config,
            fetcher,
            router:    self.router,
            cache_ttl: self.cache_ttl,
        }
    }

    /// Replace the routing engine used by [`Session::route`].
    pub fn router<S: Router>(self, router: S) -> SessionBuilder<F, S> {
        SessionBuilder {
            config:    self.config,
            fetcher:   self.fetcher,
            router,
            cache_ttl: self.cache_ttl,
        }
    }

    /// How long a loaded graph is reused; `None` keeps it until
    /// [`Session::reload`].
    pub fn cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Validate the configuration and return a session.  No data is
    /// fetched until the first [`Session::load_graph`].
    pub fn build(self) -> SessionResult<Session<F, R>> {
        self.config.validate()?;
        Ok(Session {
            config:  self.config,
            fetcher: self.fetcher,
            router:  self.router,
            cache:   GraphCache::new(self.cache_ttl),
        })
    }
}
