//! # Error Types
//!
//! Error taxonomy for a clone run using `thiserror`. Every variant is fatal to
//! the run that produced it; "already exists" on a dependency is not an error
//! at all and is reported as a skip instead.

use crate::domain::Kind;

/// Custom result type for clone operations
pub type Result<T> = std::result::Result<T, CloneError>;

/// Main error type for the load balancer cloner
#[derive(thiserror::Error, Debug)]
pub enum CloneError {
    /// Source object absent
    #[error("{kind} '{name}' not found in namespace '{namespace}'")]
    NotFound { kind: Kind, namespace: String, name: String },

    /// Non-2xx response from the config API
    #[error("{method} {url} failed with status {status}")]
    Api {
        status: u16,
        method: String,
        url: String,
        body: String,
        /// Request body that was sent, pretty-printed
        sent: Option<String>,
    },

    /// Named certificate absent at the destination
    #[error(
        "certificate '{name}' not found in namespace '{namespace}' (available: {})",
        format_available(.available)
    )]
    MissingCertificate { name: String, namespace: String, available: Vec<String> },

    /// Network transport errors
    #[error("Transport error: {context}")]
    Transport {
        #[source]
        source: reqwest::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Clone parameters that cannot produce a postable object
    #[error("Invalid clone request: {message}")]
    InvalidRequest { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

impl CloneError {
    /// Create a not found error
    pub fn not_found<N: Into<String>, S: Into<String>>(kind: Kind, namespace: N, name: S) -> Self {
        Self::NotFound { kind, namespace: namespace.into(), name: name.into() }
    }

    /// Create an invalid request error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a transport error with context
    pub fn transport<S: Into<String>>(source: reqwest::Error, context: S) -> Self {
        Self::Transport { source, context: context.into() }
    }

    /// Create a serialization error with context
    pub fn serialization<S: Into<String>>(source: serde_json::Error, context: S) -> Self {
        Self::Serialization { source, context: context.into() }
    }

    /// HTTP status attached to this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CloneError::Api { status, .. } => Some(*status),
            CloneError::NotFound { .. } => Some(404),
            CloneError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the store rejected a create because the object already exists
    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(409)
    }

    /// Operator-facing diagnostic block: status, response body and the body
    /// that was sent. `None` for errors that carry no HTTP exchange.
    pub fn diagnostics(&self) -> Option<String> {
        match self {
            CloneError::Api { status, body, sent, .. } => {
                let mut out = format!("HTTP status: {}\nResponse: {}", status, body);
                if let Some(sent) = sent {
                    out.push_str("\nSent body:\n");
                    out.push_str(sent);
                }
                Some(out)
            }
            CloneError::MissingCertificate { available, .. } => {
                Some(format!("Available certificates: {}", format_available(available)))
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CloneError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error, "JSON serialization failed")
    }
}

impl From<reqwest::Error> for CloneError {
    fn from(error: reqwest::Error) -> Self {
        Self::transport(error, "HTTP request failed")
    }
}
