//! Certificate pre-flight check
//!
//! Manual-certificate clones reference a certificate by name in the
//! destination namespace. The check runs before anything is copied.

use tracing::{info, warn};

use crate::errors::{CloneError, Result};
use crate::store::ObjectStore;

/// Confirms a named certificate exists in a namespace.
pub struct CertificateVerifier;

impl CertificateVerifier {
    /// `Ok` when `certificate` is listed in `namespace`, otherwise
    /// `CloneError::MissingCertificate` carrying the names that are present.
    pub async fn verify(store: &dyn ObjectStore, certificate: &str, namespace: &str) -> Result<()> {
        info!(certificate, namespace, "Verifying certificate");

        let available = store.list_certificates(namespace).await?;
        if available.iter().any(|name| name == certificate) {
            info!(certificate, namespace, "Certificate found");
            return Ok(());
        }

        warn!(certificate, namespace, available = ?available, "Certificate not found");
        Err(CloneError::MissingCertificate {
            name: certificate.to_string(),
            namespace: namespace.to_string(),
            available,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryObjectStore, StoreCall};

    #[tokio::test]
    async fn test_certificate_present() {
        let store = InMemoryObjectStore::new();
        store.set_certificates("ns-b", &["other", "wildcard"]);

        assert!(CertificateVerifier::verify(&store, "wildcard", "ns-b").await.is_ok());
        assert_eq!(store.calls(), vec![StoreCall::ListCertificates("ns-b".to_string())]);
    }

    #[tokio::test]
    async fn test_certificate_missing_reports_available() {
        let store = InMemoryObjectStore::new();
        store.set_certificates("ns-b", &["other"]);

        let error = CertificateVerifier::verify(&store, "wildcard", "ns-b").await.unwrap_err();
        match error {
            CloneError::MissingCertificate { name, namespace, available } => {
                assert_eq!(name, "wildcard");
                assert_eq!(namespace, "ns-b");
                assert_eq!(available, vec!["other".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_certificate_in_other_namespace_does_not_count() {
        let store = InMemoryObjectStore::new();
        store.set_certificates("ns-a", &["wildcard"]);

        assert!(CertificateVerifier::verify(&store, "wildcard", "ns-b").await.is_err());
    }
}
