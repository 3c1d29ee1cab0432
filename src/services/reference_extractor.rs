//! Reference Extractor Service
//!
//! Scans an object's spec tree for the objects it depends on. Only direct
//! dependencies are returned; the cloner recurses.
//!
//! | Kind           | Dependencies                                              |
//! |----------------|-----------------------------------------------------------|
//! | load balancer  | `app_firewall`, pools in `default_route_pools` and routes |
//! | origin pool    | `healthcheck[0]`                                          |
//! | firewall, hc   | none                                                      |

use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

use crate::domain::tree::{self, str_field};
use crate::domain::{Kind, ObjectReference};

/// Service for extracting dependency references from spec trees.
pub struct ReferenceExtractor;

impl ReferenceExtractor {
    /// Direct dependencies of an object of `kind` with the given `spec`.
    ///
    /// `default_namespace` is used for references that omit a namespace and
    /// should be the namespace the object itself lives in. Shared references
    /// are returned like any other; callers decide not to follow them.
    pub fn extract(kind: Kind, spec: &Value, default_namespace: &str) -> Vec<ObjectReference> {
        match kind {
            Kind::LoadBalancer => Self::load_balancer_references(spec, default_namespace),
            Kind::OriginPool => {
                Self::healthcheck_reference(spec, default_namespace).into_iter().collect()
            }
            Kind::AppFirewall | Kind::HealthCheck => Vec::new(),
        }
    }

    /// Firewall first, then every distinct pool in first-seen order
    fn load_balancer_references(spec: &Value, default_namespace: &str) -> Vec<ObjectReference> {
        let mut references = Vec::new();

        if let Some(firewall) = spec.get("app_firewall").and_then(Value::as_object) {
            if let Some(reference) = Self::named_reference(Kind::AppFirewall, firewall, default_namespace) {
                debug!(dependency = %reference, "Found app firewall");
                references.push(reference);
            }
        }

        let mut seen_pools = HashSet::new();
        for pool in tree::pool_targets(spec) {
            let Some(reference) = Self::named_reference(Kind::OriginPool, pool, default_namespace) else {
                continue;
            };
            if seen_pools.insert((reference.name.clone(), reference.namespace.clone())) {
                debug!(dependency = %reference, "Found origin pool");
                references.push(reference);
            }
        }

        references
    }

    /// The pool's first health check, if it names one
    fn healthcheck_reference(spec: &Value, default_namespace: &str) -> Option<ObjectReference> {
        let healthcheck = tree::first_healthcheck(spec)?;
        let reference = Self::named_reference(Kind::HealthCheck, healthcheck, default_namespace)?;
        debug!(dependency = %reference, "Found health check");
        Some(reference)
    }

    /// `{name, namespace?}` map to a reference; `None` without a string name
    fn named_reference(
        kind: Kind,
        target: &Map<String, Value>,
        default_namespace: &str,
    ) -> Option<ObjectReference> {
        let name = str_field(target, "name")?;
        let namespace = str_field(target, "namespace").unwrap_or(default_namespace);
        Some(ObjectReference::new(kind, name, namespace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn pool_entry(name: &str, namespace: &str) -> Value {
        json!({"pool": {"name": name, "namespace": namespace}})
    }

    #[test]
    fn test_load_balancer_firewall_and_pools() {
        let spec = json!({
            "app_firewall": {"name": "fw1", "namespace": "ns-a"},
            "default_route_pools": [pool_entry("pool1", "ns-a")],
            "routes": [
                {"simple_route": {"origin_pools": [pool_entry("pool2", "ns-a")]}}
            ]
        });

        let references = ReferenceExtractor::extract(Kind::LoadBalancer, &spec, "ns-a");
        assert_eq!(
            references,
            vec![
                ObjectReference::new(Kind::AppFirewall, "fw1", "ns-a"),
                ObjectReference::new(Kind::OriginPool, "pool1", "ns-a"),
                ObjectReference::new(Kind::OriginPool, "pool2", "ns-a"),
            ]
        );
    }

    #[test]
    fn test_pool_in_default_and_route_is_returned_once() {
        let spec = json!({
            "default_route_pools": [pool_entry("pool1", "ns-a")],
            "routes": [
                {"simple_route": {"origin_pools": [pool_entry("pool1", "ns-a"), pool_entry("pool1", "shared")]}}
            ]
        });

        let references = ReferenceExtractor::extract(Kind::LoadBalancer, &spec, "ns-a");
        assert_eq!(
            references,
            vec![
                ObjectReference::new(Kind::OriginPool, "pool1", "ns-a"),
                ObjectReference::new(Kind::OriginPool, "pool1", "shared"),
            ]
        );
    }

    #[test]
    fn test_shared_references_are_still_reported() {
        let spec = json!({"app_firewall": {"name": "global-waf", "namespace": "shared"}});
        let references = ReferenceExtractor::extract(Kind::LoadBalancer, &spec, "ns-a");
        assert_eq!(references.len(), 1);
        assert!(references[0].is_shared());
    }

    #[test]
    fn test_missing_and_malformed_fields_yield_nothing() {
        let specs = [
            json!({}),
            json!(null),
            json!({"app_firewall": null, "default_route_pools": null, "routes": null}),
            json!({"app_firewall": {"namespace": "ns-a"}}),
            json!({"disable_waf": {}, "default_route_pools": [{"pool": null}, {}]}),
            json!({"routes": [{}, {"simple_route": {}}, {"simple_route": {"origin_pools": [{"cluster": {}}]}}]}),
        ];

        for spec in specs {
            assert!(ReferenceExtractor::extract(Kind::LoadBalancer, &spec, "ns-a").is_empty(), "{}", spec);
        }
    }

    #[test]
    fn test_missing_namespace_defaults_to_owner() {
        let spec = json!({"app_firewall": {"name": "fw1"}});
        let references = ReferenceExtractor::extract(Kind::LoadBalancer, &spec, "ns-a");
        assert_eq!(references, vec![ObjectReference::new(Kind::AppFirewall, "fw1", "ns-a")]);
    }

    #[test]
    fn test_origin_pool_healthcheck() {
        let spec = json!({"healthcheck": [{"name": "hc1", "namespace": "ns-a"}, {"name": "hc2"}]});
        let references = ReferenceExtractor::extract(Kind::OriginPool, &spec, "ns-a");
        assert_eq!(references, vec![ObjectReference::new(Kind::HealthCheck, "hc1", "ns-a")]);
    }

    #[test]
    fn test_origin_pool_healthcheck_defaults_to_pool_namespace() {
        let spec = json!({"healthcheck": [{"name": "hc1"}]});
        let references = ReferenceExtractor::extract(Kind::OriginPool, &spec, "ns-pool");
        assert_eq!(references, vec![ObjectReference::new(Kind::HealthCheck, "hc1", "ns-pool")]);
    }

    #[test]
    fn test_origin_pool_without_healthcheck() {
        assert!(ReferenceExtractor::extract(Kind::OriginPool, &json!({"healthcheck": []}), "ns").is_empty());
        assert!(ReferenceExtractor::extract(Kind::OriginPool, &json!({}), "ns").is_empty());
    }

    #[test]
    fn test_terminal_kinds() {
        let spec = json!({"healthcheck": [{"name": "hc1"}], "app_firewall": {"name": "fw"}});
        assert!(ReferenceExtractor::extract(Kind::AppFirewall, &spec, "ns").is_empty());
        assert!(ReferenceExtractor::extract(Kind::HealthCheck, &spec, "ns").is_empty());
    }

    fn pool_ref_strategy() -> impl Strategy<Value = (String, String)> {
        (prop::sample::select(vec!["p1", "p2", "p3"]), prop::sample::select(vec!["ns-a", "shared"]))
            .prop_map(|(n, ns)| (n.to_string(), ns.to_string()))
    }

    proptest! {
        #[test]
        fn prop_pools_are_unique_and_complete(
            defaults in prop::collection::vec(pool_ref_strategy(), 0..6),
            routes in prop::collection::vec(prop::collection::vec(pool_ref_strategy(), 0..4), 0..4),
        ) {
            let spec = json!({
                "default_route_pools": defaults.iter().map(|(n, ns)| pool_entry(n, ns)).collect::<Vec<_>>(),
                "routes": routes.iter().map(|pools| json!({
                    "simple_route": {"origin_pools": pools.iter().map(|(n, ns)| pool_entry(n, ns)).collect::<Vec<_>>()}
                })).collect::<Vec<_>>(),
            });

            let references = ReferenceExtractor::extract(Kind::LoadBalancer, &spec, "ns-a");
            let keys: Vec<(String, String)> =
                references.iter().map(|r| (r.name.clone(), r.namespace.clone())).collect();

            let unique: HashSet<&(String, String)> = keys.iter().collect();
            prop_assert_eq!(unique.len(), keys.len());

            let mut expected = Vec::new();
            for key in defaults.iter().chain(routes.iter().flatten()) {
                if !expected.contains(key) {
                    expected.push(key.clone());
                }
            }
            prop_assert_eq!(keys, expected);
        }
    }
}
