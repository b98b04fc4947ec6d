//! Byte fetchers for fragment payloads.
//!
//! [`Fetcher`] is the seam between "where the bytes come from" and graph
//! assembly.  [`DefaultFetcher`] sends `http://` / `https://` locations to
//! [`HttpFetcher`] (synchronous `ureq`) and everything else to the local
//! filesystem.  Tests plug in an in-memory implementation.

use std::io::Read;
use std::time::Duration;

use crate::{SourceError, SourceResult};

/// Refuse bodies larger than this (fragments are a few MB at most).
pub const MAX_PAYLOAD_BYTES: u64 = 256 * 1024 * 1024;

/// Read all of `reader`, failing once more than `limit` bytes arrive.
///
/// Nothing is pre-allocated from declared sizes; the buffer only grows with
/// bytes actually read.
pub fn read_capped(reader: impl Read, limit: u64) -> Result<Vec<u8>, String> {
    let mut body = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|e| e.to_string())?;
    if body.len() as u64 > limit {
        return Err(format!("body exceeds {limit} bytes"));
    }
    Ok(body)
}

/// Retrieve the raw bytes at `location`.
///
/// Implementations must be `Send + Sync` so fragments can be fetched from
/// Rayon workers (feature `parallel`).
pub trait Fetcher: Send + Sync {
    fn fetch(&self, location: &str) -> SourceResult<Vec<u8>>;
}

/// `true` for locations handled over HTTP.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

// ── HTTP ──────────────────────────────────────────────────────────────────────

/// Blocking HTTP GET with a per-request timeout.  No retries: a failed
/// fetch fails the load and the caller decides whether to try again.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, location: &str) -> SourceResult<Vec<u8>> {
        let response = match self.agent.get(location).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(SourceError::Status { location: location.into(), status });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(SourceError::Fetch {
                    location: location.into(),
                    reason:   transport.to_string(),
                });
            }
        };

        let body = read_capped(response.into_reader(), MAX_PAYLOAD_BYTES).map_err(|reason| {
            SourceError::Fetch { location: location.into(), reason: format!("read body: {reason}") }
        })?;

        tracing::debug!(location, bytes = body.len(), "fetched");
        Ok(body)
    }
}

// ── Local files ───────────────────────────────────────────────────────────────

/// Reads `location` as a filesystem path.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl Fetcher for FileFetcher {
    fn fetch(&self, location: &str) -> SourceResult<Vec<u8>> {
        std::fs::read(location).map_err(|e| SourceError::Fetch {
            location: location.into(),
            reason:   e.to_string(),
        })
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// HTTP for URLs, filesystem for everything else.
pub struct DefaultFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl DefaultFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { http: HttpFetcher::new(timeout), file: FileFetcher }
    }
}

impl Fetcher for DefaultFetcher {
    fn fetch(&self, location: &str) -> SourceResult<Vec<u8>> {
        if is_remote(location) {
            self.http.fetch(location)
        } else {
            self.file.fetch(location)
        }
    }
}
