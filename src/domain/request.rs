//! Parameters of one clone run

use serde::{Deserialize, Serialize};

use crate::errors::{CloneError, Result};

/// How the cloned load balancer's `domains` are chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStrategy {
    /// Replace the domain list with this single domain
    Fixed(String),
    /// Keep the source domains, inserting one random 4-digit suffix after
    /// each domain's first label. Automatic-certificate mode only.
    RandomSuffix,
}

/// TLS strategy for the cloned load balancer, derived from the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode<'a> {
    /// HTTPS with an explicitly referenced certificate in the destination
    ManualCertificate { tenant: &'a str, certificate: &'a str },
    /// HTTPS with a platform-provisioned certificate
    AutomaticCertificate,
}

/// Immutable parameters for one clone invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneRequest {
    pub tenant: String,
    pub source_namespace: String,
    pub destination_namespace: String,
    pub domain: DomainStrategy,
    pub certificate: Option<String>,
}

impl CloneRequest {
    /// Build a request for automatic-certificate mode
    pub fn new(
        source_namespace: impl Into<String>,
        destination_namespace: impl Into<String>,
        domain: DomainStrategy,
    ) -> Self {
        Self {
            tenant: String::new(),
            source_namespace: source_namespace.into(),
            destination_namespace: destination_namespace.into(),
            domain,
            certificate: None,
        }
    }

    /// Switch to manual-certificate mode using `certificate` owned by `tenant`
    pub fn with_certificate(mut self, tenant: impl Into<String>, certificate: impl Into<String>) -> Self {
        self.tenant = tenant.into();
        self.certificate = Some(certificate.into());
        self
    }

    /// Selected TLS strategy
    pub fn tls_mode(&self) -> TlsMode<'_> {
        match &self.certificate {
            Some(certificate) => TlsMode::ManualCertificate { tenant: &self.tenant, certificate },
            None => TlsMode::AutomaticCertificate,
        }
    }

    /// Reject combinations that cannot produce a postable load balancer
    pub fn validate(&self) -> Result<()> {
        if self.source_namespace.is_empty() {
            return Err(CloneError::invalid_request("source namespace must not be empty"));
        }
        if self.destination_namespace.is_empty() {
            return Err(CloneError::invalid_request("destination namespace must not be empty"));
        }
        if let DomainStrategy::Fixed(domain) = &self.domain {
            if domain.trim().is_empty() {
                return Err(CloneError::invalid_request("domain name must not be empty"));
            }
        }

        if let Some(certificate) = &self.certificate {
            if certificate.is_empty() {
                return Err(CloneError::invalid_request("certificate name must not be empty"));
            }
            if self.tenant.is_empty() {
                return Err(CloneError::invalid_request(
                    "a tenant is required when a certificate is specified",
                ));
            }
            if self.domain == DomainStrategy::RandomSuffix {
                return Err(CloneError::invalid_request(
                    "a domain name is required when a certificate is specified",
                ));
            }
        }

        Ok(())
    }
}
