//! Object store abstraction over the remote config API
//!
//! The cloner only needs four namespace-scoped primitives. Keeping them
//! behind a trait lets the orchestrator run against the HTTP API or an
//! in-memory store in tests.

pub mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use async_trait::async_trait;

use crate::domain::{ConfigObject, Kind};
use crate::errors::Result;

pub use http::{ClientConfig, HttpObjectStore};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::{InMemoryObjectStore, StoreCall};

/// Namespace-scoped read/write access to configuration objects
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object; `CloneError::NotFound` when absent
    async fn fetch(&self, kind: Kind, namespace: &str, name: &str) -> Result<ConfigObject>;

    /// Lightweight existence check
    async fn exists(&self, kind: Kind, namespace: &str, name: &str) -> Result<bool>;

    /// Create `body` in `namespace`; any non-success response is an error
    async fn create(&self, kind: Kind, namespace: &str, body: &ConfigObject) -> Result<ConfigObject>;

    /// Names of the certificates present in `namespace`
    async fn list_certificates(&self, namespace: &str) -> Result<Vec<String>>;
}
