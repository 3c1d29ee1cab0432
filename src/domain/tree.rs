//! Typed accessors over spec trees
//!
//! Specs are kept as `serde_json::Value` so unknown fields round-trip
//! untouched. The handful of locations the cloner reads or rewrites are
//! reached through these helpers; absent or mistyped nodes read as "nothing
//! there" and are never an error.

use serde_json::{Map, Value};

/// Top-level list of `{pool: {...}}` entries on a load balancer
pub const DEFAULT_ROUTE_POOLS: &str = "default_route_pools";

/// Route list on a load balancer
pub const ROUTES: &str = "routes";

/// Fallback spec block on a load balancer
pub const GC_SPEC: &str = "gc_spec";

/// Health check reference list on an origin pool
pub const HEALTHCHECK: &str = "healthcheck";

/// String value of `key` in `map`
pub fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// Remove every key in `keys` from `map`
pub fn remove_keys(map: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        map.remove(*key);
    }
}

/// View `value` as a map, replacing any non-map value with an empty one
pub fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

/// `{pool: {...}}` target of one pool list entry
pub fn pool_of(entry: &Value) -> Option<&Map<String, Value>> {
    entry.get("pool").and_then(Value::as_object)
}

fn pool_of_mut(entry: &mut Value) -> Option<&mut Map<String, Value>> {
    entry.get_mut("pool").and_then(Value::as_object_mut)
}

fn array<'a>(map: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    map.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

/// Per-route pool list: `routes[i].simple_route.origin_pools`
fn route_pools(route: &Value) -> &[Value] {
    route
        .get("simple_route")
        .and_then(|simple| simple.get("origin_pools"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Every pool target on a load balancer spec, default list first, then each
/// route's list in route order
pub fn pool_targets(spec: &Value) -> Vec<&Map<String, Value>> {
    let Some(spec) = spec.as_object() else {
        return Vec::new();
    };

    let defaults = array(spec, DEFAULT_ROUTE_POOLS).iter();
    let routed = array(spec, ROUTES).iter().flat_map(route_pools);

    defaults.chain(routed).filter_map(pool_of).collect()
}

/// Apply `f` to every pool target in a `default_route_pools` list under `map`
pub fn for_each_default_pool_mut<F>(map: &mut Map<String, Value>, mut f: F)
where
    F: FnMut(&mut Map<String, Value>),
{
    if let Some(entries) = map.get_mut(DEFAULT_ROUTE_POOLS).and_then(Value::as_array_mut) {
        entries.iter_mut().filter_map(pool_of_mut).for_each(&mut f);
    }
}

/// Apply `f` to every pool target on a load balancer spec: the default list
/// and each route's list
pub fn for_each_pool_mut<F>(spec: &mut Map<String, Value>, mut f: F)
where
    F: FnMut(&mut Map<String, Value>),
{
    for_each_default_pool_mut(spec, &mut f);

    if let Some(routes) = spec.get_mut(ROUTES).and_then(Value::as_array_mut) {
        for route in routes {
            let pools = route
                .get_mut("simple_route")
                .and_then(|simple| simple.get_mut("origin_pools"))
                .and_then(Value::as_array_mut);
            if let Some(pools) = pools {
                pools.iter_mut().filter_map(pool_of_mut).for_each(&mut f);
            }
        }
    }
}

/// First entry of an origin pool's `healthcheck` list, if it is a map
pub fn first_healthcheck(spec: &Value) -> Option<&Map<String, Value>> {
    spec.get(HEALTHCHECK)?.as_array()?.first()?.as_object()
}

/// Mutable first entry of an origin pool's `healthcheck` list
pub fn first_healthcheck_mut(spec: &mut Map<String, Value>) -> Option<&mut Map<String, Value>> {
    spec.get_mut(HEALTHCHECK)?.as_array_mut()?.first_mut()?.as_object_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pool_targets_order_and_tolerance() {
        let spec = json!({
            "default_route_pools": [
                {"pool": {"name": "a", "namespace": "ns"}},
                {"weight": 1},
            ],
            "routes": [
                {"simple_route": {"origin_pools": [{"pool": {"name": "b", "namespace": "ns"}}]}},
                {"redirect_route": {"host_redirect": "example.com"}},
                {"simple_route": null},
            ]
        });

        let names: Vec<&str> =
            pool_targets(&spec).into_iter().filter_map(|p| str_field(p, "name")).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_pool_targets_on_non_object_spec() {
        assert!(pool_targets(&json!(null)).is_empty());
        assert!(pool_targets(&json!({"default_route_pools": "oops"})).is_empty());
    }

    #[test]
    fn test_for_each_pool_mut_visits_both_locations() {
        let mut spec = json!({
            "default_route_pools": [{"pool": {"name": "a"}}],
            "routes": [{"simple_route": {"origin_pools": [{"pool": {"name": "b"}}]}}]
        });

        let mut visited = 0;
        for_each_pool_mut(spec.as_object_mut().unwrap(), |pool| {
            pool.insert("namespace".to_string(), json!("ns-b"));
            visited += 1;
        });

        assert_eq!(visited, 2);
        assert_eq!(spec["default_route_pools"][0]["pool"]["namespace"], "ns-b");
        assert_eq!(spec["routes"][0]["simple_route"]["origin_pools"][0]["pool"]["namespace"], "ns-b");
    }

    #[test]
    fn test_first_healthcheck() {
        let spec = json!({"healthcheck": [{"name": "hc1"}, {"name": "hc2"}]});
        assert_eq!(str_field(first_healthcheck(&spec).unwrap(), "name"), Some("hc1"));
        assert!(first_healthcheck(&json!({"healthcheck": []})).is_none());
        assert!(first_healthcheck(&json!({"healthcheck": null})).is_none());
        assert!(first_healthcheck(&json!({})).is_none());
    }

    #[test]
    fn test_ensure_object_replaces_scalars() {
        let mut value = json!(null);
        ensure_object(&mut value).insert("k".to_string(), json!(1));
        assert_eq!(value, json!({"k": 1}));
    }
}
