//! # lbclone
//!
//! Copies an HTTP load balancer, together with the app firewall, origin pools
//! and health checks it depends on, from one namespace of a config REST API
//! into another.
//!
//! ## Architecture
//!
//! ```text
//! CLI → Cloner → ReferenceExtractor / Sanitizer → ObjectStore → config API
//!                      ↓
//!              CertificateVerifier
//! ```
//!
//! - **Cloner**: walks the dependency graph and creates dependencies before
//!   their dependents, skipping shared objects and objects already present
//! - **Sanitizer**: strips server-managed fields and rewrites namespaces,
//!   domains and TLS settings for the destination
//! - **ObjectStore**: async seam over the REST API (`HttpObjectStore`) or an
//!   in-memory fake (`InMemoryObjectStore`, behind the `test-utils` feature)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lbclone::{ClientConfig, CloneRequest, Cloner, DomainStrategy, HttpObjectStore, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = HttpObjectStore::new(ClientConfig {
//!         base_url: "https://tenant.example.com/api/config".to_string(),
//!         token: "secret".to_string(),
//!         ..Default::default()
//!     })?;
//!     let request = CloneRequest::new("ns-a", "ns-b", DomainStrategy::Fixed("example.com".into()));
//!     let report = Cloner::new(Arc::new(store), request).clone_load_balancer("lb1").await?;
//!     println!("copied: {:?}", report.copied_names());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod services;
pub mod store;

// Re-export commonly used types and traits
pub use domain::{CloneRequest, ConfigObject, DomainStrategy, Kind, ObjectReference};
pub use errors::{CloneError, Result};
pub use services::{CloneOptions, CloneReport, Cloner, CopyOutcome};
pub use store::{ClientConfig, HttpObjectStore, ObjectStore};
#[cfg(any(test, feature = "test-utils"))]
pub use store::InMemoryObjectStore;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
