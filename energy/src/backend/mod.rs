//! Search backend access
//!
//! The service never talks to Elasticsearch directly: it asks a
//! [`Connector`] for a [`SearchBackend`] handle on each request. The
//! production connector shares one HTTP connection pool across handles.

mod elastic;

pub use elastic::{decode_cloud_id, ElasticClient, ElasticConnector};

use crate::query::SearchRequest;
use crate::response::SearchResponse;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A handle able to run search requests against one cluster
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a search (with optional aggregations) against `index`
    async fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse>;
}

/// Produces ready-to-use backend handles
pub trait Connector: Send + Sync {
    /// Open a handle. Fails with `EnergyError::Configuration` before any
    /// network I/O when credentials are missing.
    fn connect(&self) -> Result<Arc<dyn SearchBackend>>;
}
