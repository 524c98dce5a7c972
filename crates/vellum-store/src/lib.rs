//! Document and version storage for Vellum.
//!
//! The comparison pipeline never talks to a database directly. It issues
//! [`FetchRequest`]s against a [`DocumentSource`], which either serves them
//! from memory or forwards them to a CMS REST API over HTTP.
//!
//! # Key Types
//!
//! - [`VersionSnapshot`] -- One immutable historical version of a document
//! - [`FetchRequest`] / [`FetchParams`] -- Resource URL plus depth, locale and draft flags
//! - [`DocumentSource`] -- Async data-access boundary
//! - [`InMemoryDocumentStore`] -- Schema-aware store for tests, demos and the CLI
//! - [`HttpDocumentSource`] -- REST client backed by `reqwest`

pub mod error;
pub mod http;
pub mod memory;
pub mod request;
pub mod snapshot;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use http::HttpDocumentSource;
pub use memory::InMemoryDocumentStore;
pub use request::{ApiConfig, FetchParams, FetchRequest, LocaleParam, Resource, DEFAULT_DEPTH};
pub use snapshot::{VersionSnapshot, VersionStatus, VersionSummary};
pub use traits::DocumentSource;
