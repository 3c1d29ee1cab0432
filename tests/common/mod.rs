//! Shared test infrastructure
//!
//! `FakeConfigApi` is a wiremock server that behaves like a small config API:
//! objects posted to it can be fetched back, a second create of the same
//! name answers 409 and requests without the expected token answer 401.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use lbclone::{ClientConfig, HttpObjectStore};
use serde_json::{json, Value};
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TOKEN: &str = "test-token";

type ObjectMap = HashMap<(String, String, String), Value>;

#[derive(Default)]
struct ApiState {
    /// (namespace, plural, name) -> stored body
    objects: ObjectMap,
    certificates: HashMap<String, Vec<String>>,
}

pub struct FakeConfigApi {
    pub server: MockServer,
    state: Arc<Mutex<ApiState>>,
}

impl FakeConfigApi {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(ApiState::default()));

        let handler_state = state.clone();
        Mock::given(path_regex(r"^/api/config/namespaces/.*"))
            .respond_with(move |req: &Request| respond(&handler_state, req))
            .mount(&server)
            .await;

        Self { server, state }
    }

    pub fn base_url(&self) -> String {
        format!("{}/api/config", self.server.uri())
    }

    pub fn store(&self) -> HttpObjectStore {
        HttpObjectStore::new(ClientConfig {
            base_url: self.base_url(),
            token: TOKEN.to_string(),
            timeout: 5,
            verbose: true,
        })
        .unwrap()
    }

    /// Seed an object as the server would return it, including server-owned fields
    pub fn seed(&self, plural: &str, namespace: &str, name: &str, spec: Value) {
        let body = json!({
            "metadata": {
                "name": name,
                "namespace": namespace,
                "labels": {"team": "web"},
                "resource_version": "42",
                "system_metadata": {"uid": format!("uid-{}", name)},
            },
            "spec": spec,
            "system_metadata": {"tenant": "acme"},
            "referring_objects": [],
        });
        self.lock().objects.insert(key(namespace, plural, name), body);
    }

    pub fn set_certificates(&self, namespace: &str, names: &[&str]) {
        self.lock()
            .certificates
            .insert(namespace.to_string(), names.iter().map(|n| n.to_string()).collect());
    }

    pub fn object(&self, plural: &str, namespace: &str, name: &str) -> Option<Value> {
        self.lock().objects.get(&key(namespace, plural, name)).cloned()
    }

    /// `(path, body)` of every POST received, in order
    pub async fn posts(&self) -> Vec<(String, Value)> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|req| req.method.as_str() == "POST")
            .map(|req| {
                let body = serde_json::from_slice(&req.body).unwrap_or(Value::Null);
                (req.url.path().to_string(), body)
            })
            .collect()
    }

    /// Names of the objects posted, in order
    pub async fn posted_names(&self) -> Vec<String> {
        self.posts()
            .await
            .into_iter()
            .map(|(_, body)| body["metadata"]["name"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ApiState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn key(namespace: &str, plural: &str, name: &str) -> (String, String, String) {
    (namespace.to_string(), plural.to_string(), name.to_string())
}

fn error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({"code": status, "message": message}))
}

fn respond(state: &Mutex<ApiState>, req: &Request) -> ResponseTemplate {
    let authorized = req
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("APIToken {}", TOKEN))
        .unwrap_or(false);
    if !authorized {
        return error(401, "unauthorized");
    }

    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let segments: Vec<&str> = req
        .url
        .path()
        .trim_start_matches("/api/config/namespaces/")
        .split('/')
        .collect();

    match (req.method.as_str(), segments.as_slice()) {
        ("GET", [namespace, "certificates"]) => {
            let items: Vec<Value> = state
                .certificates
                .get(*namespace)
                .map(|names| names.iter().map(|name| json!({"name": name, "namespace": namespace})).collect())
                .unwrap_or_default();
            ResponseTemplate::new(200).set_body_json(json!({"items": items}))
        }
        ("GET", [namespace, plural, name]) => match state.objects.get(&key(namespace, plural, name)) {
            Some(body) => ResponseTemplate::new(200).set_body_json(body.clone()),
            None => error(404, "object not found"),
        },
        ("POST", [namespace, plural]) => {
            let body: Value = match serde_json::from_slice(&req.body) {
                Ok(body) => body,
                Err(_) => return error(400, "invalid json"),
            };
            let Some(name) = body["metadata"]["name"].as_str().map(str::to_string) else {
                return error(400, "metadata.name is required");
            };
            if body["metadata"]["namespace"].as_str() != Some(*namespace) {
                return error(400, "metadata.namespace does not match the request path");
            }

            let object_key = key(namespace, plural, &name);
            if state.objects.contains_key(&object_key) {
                return error(409, "object already exists");
            }
            state.objects.insert(object_key, body.clone());
            ResponseTemplate::new(200).set_body_json(body)
        }
        _ => error(404, "no such route"),
    }
}
