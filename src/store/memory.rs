//! In-memory object store
//!
//! Behaves like the config API for the four primitives the cloner uses and
//! records every call so tests can assert on traffic and ordering.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::ObjectStore;
use crate::domain::{ConfigObject, Kind, ObjectKey};
use crate::errors::{CloneError, Result};

/// One recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Fetch(ObjectKey),
    Exists(ObjectKey),
    Create(ObjectKey),
    ListCertificates(String),
}

#[derive(Debug, Default)]
struct State {
    objects: BTreeMap<ObjectKey, ConfigObject>,
    certificates: HashMap<String, Vec<String>>,
    calls: Vec<StoreCall>,
    created: Vec<(ObjectKey, ConfigObject)>,
    fail_creates: Vec<(ObjectKey, u16)>,
}

/// Object store backed by a map
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    state: Mutex<State>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an object; its identity comes from `metadata.name`/`namespace`
    pub fn insert(&self, kind: Kind, object: ConfigObject) {
        let key = ObjectKey::new(
            kind,
            object.name().unwrap_or_default(),
            object.namespace().unwrap_or_default(),
        );
        self.state().objects.insert(key, object);
    }

    /// Seed the certificate names of a namespace
    pub fn set_certificates(&self, namespace: &str, names: &[&str]) {
        self.state()
            .certificates
            .insert(namespace.to_string(), names.iter().map(|n| n.to_string()).collect());
    }

    /// Make creates of `key` fail with `status`
    pub fn fail_create(&self, key: ObjectKey, status: u16) {
        self.state().fail_creates.push((key, status));
    }

    pub fn get(&self, kind: Kind, namespace: &str, name: &str) -> Option<ConfigObject> {
        self.state().objects.get(&ObjectKey::new(kind, name, namespace)).cloned()
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    /// Successful creates so far, in order
    pub fn created(&self) -> Vec<(ObjectKey, ConfigObject)> {
        self.state().created.clone()
    }

    /// Number of create attempts, successful or not
    pub fn create_attempts(&self) -> usize {
        self.state().calls.iter().filter(|c| matches!(c, StoreCall::Create(_))).count()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn fetch(&self, kind: Kind, namespace: &str, name: &str) -> Result<ConfigObject> {
        let key = ObjectKey::new(kind, name, namespace);
        let mut state = self.state();
        state.calls.push(StoreCall::Fetch(key.clone()));
        state.objects.get(&key).cloned().ok_or_else(|| CloneError::not_found(kind, namespace, name))
    }

    async fn exists(&self, kind: Kind, namespace: &str, name: &str) -> Result<bool> {
        let key = ObjectKey::new(kind, name, namespace);
        let mut state = self.state();
        state.calls.push(StoreCall::Exists(key.clone()));
        Ok(state.objects.contains_key(&key))
    }

    async fn create(&self, kind: Kind, namespace: &str, body: &ConfigObject) -> Result<ConfigObject> {
        let key = ObjectKey::new(kind, body.name().unwrap_or_default(), namespace);
        let mut state = self.state();
        state.calls.push(StoreCall::Create(key.clone()));

        let url = format!("memory:///namespaces/{}/{}", namespace, kind.plural());
        let sent = serde_json::to_string_pretty(body).ok();

        if let Some((_, status)) = state.fail_creates.iter().find(|(k, _)| *k == key) {
            return Err(CloneError::Api {
                status: *status,
                method: "POST".to_string(),
                url,
                body: format!("{{\"message\":\"create of {} rejected\"}}", key.name),
                sent,
            });
        }
        if state.objects.contains_key(&key) {
            return Err(CloneError::Api {
                status: 409,
                method: "POST".to_string(),
                url,
                body: format!("{{\"message\":\"{} already exists\"}}", key.name),
                sent,
            });
        }

        state.objects.insert(key.clone(), body.clone());
        state.created.push((key, body.clone()));
        Ok(body.clone())
    }

    async fn list_certificates(&self, namespace: &str) -> Result<Vec<String>> {
        let mut state = self.state();
        state.calls.push(StoreCall::ListCertificates(namespace.to_string()));
        Ok(state.certificates.get(namespace).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_exists() {
        let store = InMemoryObjectStore::new();
        assert!(!store.exists(Kind::HealthCheck, "ns-b", "hc1").await.unwrap());

        let body = ConfigObject::new("hc1", "ns-b", json!({}));
        store.create(Kind::HealthCheck, "ns-b", &body).await.unwrap();
        assert!(store.exists(Kind::HealthCheck, "ns-b", "hc1").await.unwrap());

        let duplicate = store.create(Kind::HealthCheck, "ns-b", &body).await.unwrap_err();
        assert!(duplicate.is_conflict());
        assert_eq!(store.create_attempts(), 2);
        assert_eq!(store.created().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found() {
        let store = InMemoryObjectStore::new();
        let error = store.fetch(Kind::OriginPool, "ns-a", "nope").await.unwrap_err();
        assert!(matches!(error, CloneError::NotFound { .. }));
    }
}
