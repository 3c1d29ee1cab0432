//! Object kinds understood by the cloner

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a configuration object.
///
/// The serialized form matches the singular resource name used by the
/// config API (`http_loadbalancer`, `origin_pool`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "http_loadbalancer")]
    LoadBalancer,
    #[serde(rename = "origin_pool")]
    OriginPool,
    #[serde(rename = "app_firewall")]
    AppFirewall,
    #[serde(rename = "healthcheck")]
    HealthCheck,
}

impl Kind {
    /// All kinds, root first
    pub const ALL: [Kind; 4] = [Kind::LoadBalancer, Kind::OriginPool, Kind::AppFirewall, Kind::HealthCheck];

    /// Singular resource name
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::LoadBalancer => "http_loadbalancer",
            Kind::OriginPool => "origin_pool",
            Kind::AppFirewall => "app_firewall",
            Kind::HealthCheck => "healthcheck",
        }
    }

    /// Plural collection segment used in API paths
    pub fn plural(&self) -> &'static str {
        match self {
            Kind::LoadBalancer => "http_loadbalancers",
            Kind::OriginPool => "origin_pools",
            Kind::AppFirewall => "app_firewalls",
            Kind::HealthCheck => "healthchecks",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
