//! Sanitizer Service
//!
//! Turns a fetched object into a body that can be created in the destination
//! namespace: server-owned fields are stripped, namespace-scoped references
//! are rewritten and the load balancer gets its new domains and HTTPS block.
//!
//! ## TLS strategies
//!
//! - **Manual certificate**: `domains` becomes the requested domain and an
//!   `https` block references the named certificate in the destination.
//! - **Automatic certificate**: an `https_auto_cert` block is attached and the
//!   platform provisions the certificate. Domains are either replaced by the
//!   requested domain or kept with a random numeric suffix on the first label.

use rand::Rng;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::domain::tree::{self, ensure_object, remove_keys};
use crate::domain::{CloneRequest, ConfigObject, DomainStrategy, Kind, TlsMode, SHARED_NAMESPACE};

/// Metadata fields the API owns; removed from every kind
pub const FORBIDDEN_METADATA_FIELDS: [&str; 7] = [
    "system_metadata",
    "resource_version",
    "referring_objects",
    "deleted_referred_objects",
    "disabled_referred_objects",
    "create_form",
    "replace_form",
];

const LOAD_BALANCER_RUNTIME_FIELDS: [&str; 9] = [
    "status",
    "dns_info",
    "auto_cert_info",
    "cert_state",
    "create_form",
    "replace_form",
    "downstream_tls_certificate_expiration_timestamps",
    "internet_vip_info",
    "state",
];

const ORIGIN_POOL_RUNTIME_FIELDS: [&str; 2] = ["status", "endpoint_subsets"];

const HEALTHCHECK_RUNTIME_FIELDS: [&str; 4] =
    ["status", "referring_objects", "deleted_referred_objects", "disabled_referred_objects"];

/// HTTPS block keys on a load balancer spec
const HTTPS: &str = "https";
const HTTPS_AUTO_CERT: &str = "https_auto_cert";

/// Inclusive range of the random domain suffix
pub const DOMAIN_SUFFIX_RANGE: std::ops::RangeInclusive<u16> = 1000..=9999;

/// Draw a domain suffix from [`DOMAIN_SUFFIX_RANGE`]
pub fn random_domain_suffix() -> u16 {
    rand::thread_rng().gen_range(DOMAIN_SUFFIX_RANGE)
}

/// Insert `suffix` right after the first label of `original`.
///
/// `app.example.com` with 4321 becomes `app4321.example.com`. A leading
/// wildcard label is kept and the next label takes the suffix instead.
pub fn derive_domain(original: &str, suffix: u16) -> String {
    let (wildcard, rest) = match original.strip_prefix("*.") {
        Some(rest) => ("*.", rest),
        None => ("", original),
    };

    match rest.split_once('.') {
        Some((first, remainder)) => format!("{}{}{}.{}", wildcard, first, suffix, remainder),
        None => format!("{}{}{}", wildcard, rest, suffix),
    }
}

/// Settings shared by both HTTPS strategies
fn https_defaults() -> Map<String, Value> {
    let defaults = json!({
        "http_redirect": false,
        "add_hsts": false,
        "port": 443,
        "default_header": {},
        "enable_path_normalize": {},
        "non_default_loadbalancer": {},
        "header_transformation_type": {"legacy_header_transformation": {}},
        "connection_idle_timeout": 120000,
        "http_protocol_options": {"http_protocol_enable_v1_v2": {}},
        "coalescing_options": {"default_coalescing": {}},
    });
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// `https` block referencing a certificate in the destination namespace
fn manual_https_block(tenant: &str, namespace: &str, certificate: &str) -> Value {
    let mut block = https_defaults();
    block.insert(
        "tls_cert_params".to_string(),
        json!({
            "tls_config": {"default_security": {}},
            "certificates": [{
                "tenant": tenant,
                "namespace": namespace,
                "name": certificate,
                "kind": "certificate",
            }],
            "no_mtls": {},
        }),
    );
    Value::Object(block)
}

/// `https_auto_cert` block
fn auto_cert_https_block() -> Value {
    let mut block = https_defaults();
    block.insert("tls_config".to_string(), json!({"default_security": {}}));
    block.insert("no_mtls".to_string(), json!({}));
    Value::Object(block)
}

/// Per-kind transformation of fetched objects for one clone run.
///
/// The random domain suffix is drawn once on construction so every domain of
/// the run gets the same one.
#[derive(Debug, Clone)]
pub struct Sanitizer<'a> {
    request: &'a CloneRequest,
    domain_suffix: u16,
}

impl<'a> Sanitizer<'a> {
    /// Sanitizer with a freshly drawn domain suffix
    pub fn new(request: &'a CloneRequest) -> Self {
        Self::with_suffix(request, random_domain_suffix())
    }

    /// Sanitizer with a fixed domain suffix
    pub fn with_suffix(request: &'a CloneRequest, domain_suffix: u16) -> Self {
        Self { request, domain_suffix }
    }

    /// Suffix applied to domains, when the request asks for one
    pub fn domain_suffix(&self) -> Option<u16> {
        match self.request.domain {
            DomainStrategy::RandomSuffix => Some(self.domain_suffix),
            DomainStrategy::Fixed(_) => None,
        }
    }

    /// Sanitized copy of `object`; the input is left untouched
    pub fn sanitize(&self, kind: Kind, object: &ConfigObject) -> ConfigObject {
        let mut cleaned = object.clone();
        let destination = self.request.destination_namespace.as_str();

        remove_keys(&mut cleaned.metadata, &FORBIDDEN_METADATA_FIELDS);
        cleaned.set_namespace(destination);

        let spec = ensure_object(&mut cleaned.spec);
        match kind {
            Kind::LoadBalancer => self.sanitize_load_balancer(spec),
            Kind::OriginPool => {
                remove_keys(spec, &ORIGIN_POOL_RUNTIME_FIELDS);
                if let Some(healthcheck) = tree::first_healthcheck_mut(spec) {
                    rewrite_namespace(healthcheck, destination);
                }
            }
            Kind::HealthCheck => remove_keys(spec, &HEALTHCHECK_RUNTIME_FIELDS),
            Kind::AppFirewall => {}
        }

        cleaned
    }

    fn sanitize_load_balancer(&self, spec: &mut Map<String, Value>) {
        let destination = self.request.destination_namespace.as_str();

        remove_keys(spec, &LOAD_BALANCER_RUNTIME_FIELDS);
        remove_keys(spec, &[HTTPS, HTTPS_AUTO_CERT]);
        spec.insert("host_name".to_string(), Value::String(String::new()));

        let domains = self.domains(spec.get("domains"));
        debug!(?domains, "Setting load balancer domains");
        spec.insert("domains".to_string(), json!(domains));

        match self.request.tls_mode() {
            TlsMode::ManualCertificate { tenant, certificate } => {
                debug!(certificate, "Configuring HTTPS with custom certificate");
                spec.insert(HTTPS.to_string(), manual_https_block(tenant, destination, certificate));
            }
            TlsMode::AutomaticCertificate => {
                debug!("Configuring HTTPS with automatic certificate");
                spec.insert(HTTPS_AUTO_CERT.to_string(), auto_cert_https_block());
            }
        }

        tree::for_each_pool_mut(spec, |pool| rewrite_namespace(pool, destination));

        if let Some(gc_spec) = spec.get_mut(tree::GC_SPEC).and_then(Value::as_object_mut) {
            normalize_gc_spec(gc_spec, destination);
        }
    }

    fn domains(&self, current: Option<&Value>) -> Vec<String> {
        match &self.request.domain {
            DomainStrategy::Fixed(domain) => vec![domain.clone()],
            DomainStrategy::RandomSuffix => current
                .and_then(Value::as_array)
                .map(|domains| {
                    domains
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|domain| derive_domain(domain, self.domain_suffix))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Point a `{name, namespace}` reference at `destination` unless it is shared
fn rewrite_namespace(reference: &mut Map<String, Value>, destination: &str) {
    if tree::str_field(reference, "namespace") != Some(SHARED_NAMESPACE) {
        reference.insert("namespace".to_string(), Value::String(destination.to_string()));
    }
}

/// Fallback block: HTTPS blocks lose explicit certificates and mTLS, pools
/// move to the destination
fn normalize_gc_spec(gc_spec: &mut Map<String, Value>, destination: &str) {
    for key in [HTTPS_AUTO_CERT, HTTPS] {
        if let Some(https) = gc_spec.get_mut(key).and_then(Value::as_object_mut) {
            remove_keys(https, &["tls_cert_params", "tls_certificates"]);
            https.insert("no_mtls".to_string(), json!({}));
            https.insert("tls_config".to_string(), json!({"default_security": {}}));
        }
    }

    tree::for_each_default_pool_mut(gc_spec, |pool| rewrite_namespace(pool, destination));
}
