//! References between configuration objects

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Kind;

/// Namespace holding globally shared objects. References into it are never
/// followed, copied or rewritten.
pub const SHARED_NAMESPACE: &str = "shared";

/// Identity of a configuration object: (kind, name, namespace)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub kind: Kind,
    pub name: String,
    pub namespace: String,
}

impl ObjectKey {
    pub fn new(kind: Kind, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self { kind, name: name.into(), namespace: namespace.into() }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.name, self.namespace)
    }
}

/// A dependency found inside an object's spec: "this object depends on that one"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectReference {
    pub kind: Kind,
    pub name: String,
    pub namespace: String,
}

impl ObjectReference {
    pub fn new(kind: Kind, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self { kind, name: name.into(), namespace: namespace.into() }
    }

    /// Whether the referenced object lives in the shared namespace
    pub fn is_shared(&self) -> bool {
        self.namespace == SHARED_NAMESPACE
    }

    /// Identity of the referenced object
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.kind, self.name.clone(), self.namespace.clone())
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.name, self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_detection() {
        assert!(ObjectReference::new(Kind::HealthCheck, "hc", "shared").is_shared());
        assert!(!ObjectReference::new(Kind::HealthCheck, "hc", "ns-a").is_shared());
    }

    #[test]
    fn test_display() {
        let reference = ObjectReference::new(Kind::OriginPool, "pool1", "ns-a");
        assert_eq!(reference.to_string(), "origin_pool pool1 (ns-a)");
        assert_eq!(reference.key().to_string(), "origin_pool pool1 (ns-a)");
    }
}
