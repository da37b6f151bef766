//! HTTP storage backend for Zarr access.
//!
//! Builds an `object_store` HTTP client for a Zarr endpoint (for example the
//! `/zarr/` route of a dataset server) and adapts it to the synchronous
//! `zarrs` storage traits.

use std::sync::Arc;
use std::time::Duration;

use object_store::http::{HttpBuilder, HttpStore};
use object_store::ClientOptions;
use zarrs_object_store::AsyncObjectStore;
use zarrs_storage::storage_adapter::async_to_sync::{
    AsyncToSyncBlockOn, AsyncToSyncStorageAdapter,
};

use super::ZarrStore;
use crate::error::{DatasetError, Result};

/// Blocking executor backed by a dedicated current-thread runtime.
///
/// The pipeline is synchronous, so the store owns the runtime that drives the
/// HTTP client rather than borrowing an ambient one.
pub struct RuntimeBlockOn(tokio::runtime::Runtime);

impl RuntimeBlockOn {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DatasetError::storage(format!("failed to start runtime: {}", e)))?;
        Ok(Self(runtime))
    }
}

impl AsyncToSyncBlockOn for RuntimeBlockOn {
    fn block_on<F: core::future::Future>(&self, future: F) -> F::Output {
        self.0.block_on(future)
    }
}

/// Configuration for connecting to an HTTP Zarr endpoint.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Base URL of the Zarr store (e.g., "http://0.0.0.0:9000/zarr/")
    pub url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Allow plain HTTP (required for local dataset servers)
    pub allow_http: bool,
}

impl HttpStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            url: "http://0.0.0.0:9000/zarr/".to_string(),
            timeout: Duration::from_secs(60),
            allow_http: true,
        }
    }
}

/// Storage type alias for HTTP-backed Zarr access (async).
pub type AsyncHttpStorage = AsyncObjectStore<HttpStore>;

/// Storage type alias for HTTP-backed Zarr access (sync adapter).
pub type HttpStorage = AsyncToSyncStorageAdapter<AsyncHttpStorage, RuntimeBlockOn>;

/// Create an HTTP storage backend for Zarr access.
///
/// Building the client does not contact the server; an unreachable endpoint
/// surfaces on the first read.
pub fn create_http_storage(config: &HttpStoreConfig) -> Result<Arc<HttpStorage>> {
    let options = ClientOptions::new()
        .with_allow_http(config.allow_http)
        .with_timeout(config.timeout);

    let http = HttpBuilder::new()
        .with_url(config.url.as_str())
        .with_client_options(options)
        .build()
        .map_err(|e| DatasetError::storage(format!("Failed to create HTTP client: {}", e)))?;

    let async_store = Arc::new(AsyncObjectStore::new(http));
    let sync_store = AsyncToSyncStorageAdapter::new(async_store, RuntimeBlockOn::new()?);

    Ok(Arc::new(sync_store))
}

/// Open the Zarr store served at `url`.
pub fn open_http_store(url: &str) -> Result<ZarrStore<HttpStorage>> {
    let config = HttpStoreConfig::new(url);
    let storage = create_http_storage(&config)?;
    Ok(ZarrStore::new(storage, config.url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpStoreConfig::default();
        assert_eq!(config.url, "http://0.0.0.0:9000/zarr/");
        assert!(config.allow_http);
    }

    #[test]
    fn test_rejects_malformed_url() {
        assert!(open_http_store("not a url").is_err());
    }
}
