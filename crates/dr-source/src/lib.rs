//! `dr-source` — fragment loading and graph caching.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`config`]    | `SourceConfig`, `SourceKind` (TOML-loadable)               |
//! | [`fetch`]     | `Fetcher` trait, `HttpFetcher`, `FileFetcher`, `DefaultFetcher` |
//! | [`archive`]   | `read_archive` (zip → fragments)                           |
//! | [`fragments`] | `FragmentSet`, `load_fragments`, `load_graph`              |
//! | [`cache`]     | `GraphCache`, `CachedGraph`                                |
//! | [`error`]     | `SourceError`, `SourceResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Fetch fragments concurrently with Rayon (order preserved). |

pub mod archive;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fragments;


pub use cache::{CachedGraph, GraphCache};
pub use config::{SourceConfig, SourceKind};
pub use error::{SourceError, SourceResult};
pub use fetch::{DefaultFetcher, Fetcher, FileFetcher, HttpFetcher};
pub use fragments::{Fragment, FragmentSet, load_fragments, load_graph};
