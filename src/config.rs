//! Runtime configuration for a map session.
//!
//! Every value has a built-in default and can be overridden through a
//! `GEO_CLUSTER_*` environment variable. Unparseable values fall back to the
//! default.

use crate::core_modules::cluster_engine::EngineConfig;
use std::time::Duration;

pub const ENV_CLUSTER_RADIUS: &str = "GEO_CLUSTER_RADIUS";
pub const ENV_ZOOM_DEBOUNCE_MS: &str = "GEO_CLUSTER_ZOOM_DEBOUNCE_MS";
pub const ENV_LOOKUP_URL: &str = "GEO_CLUSTER_LOOKUP_URL";
pub const ENV_LOOKUP_TIMEOUT_SECS: &str = "GEO_CLUSTER_LOOKUP_TIMEOUT_SECS";

const DEFAULT_LOOKUP_URL: &str = "http://ip-api.com/json";
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_ZOOM_DEBOUNCE: Duration = Duration::from_millis(100);

/// Where and how the geolocation provider is queried.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Address prefix; the IP is appended as the last path segment.
    pub base_url: String,
    /// Per-address request timeout.
    pub timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOOKUP_URL.to_string(),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

/// Everything a `MapSession` needs to know at construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub engine: EngineConfig,
    /// How long wheel input must stay quiet before the zoom is applied.
    pub zoom_debounce: Duration,
    pub lookup: LookupConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            zoom_debounce: DEFAULT_ZOOM_DEBOUNCE,
            lookup: LookupConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by whatever `GEO_CLUSTER_*` variables are set.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by the values `lookup` returns for each variable name.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(radius) = lookup(ENV_CLUSTER_RADIUS)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|r| r.is_finite() && *r > 0.0)
        {
            config.engine.cluster_radius_base = radius;
        }
        if let Some(ms) = lookup(ENV_ZOOM_DEBOUNCE_MS).and_then(|v| v.parse::<u64>().ok()) {
            config.zoom_debounce = Duration::from_millis(ms);
        }
        if let Some(url) = lookup(ENV_LOOKUP_URL).filter(|v| !v.trim().is_empty()) {
            config.lookup.base_url = url;
        }
        if let Some(secs) = lookup(ENV_LOOKUP_TIMEOUT_SECS).and_then(|v| v.parse::<u64>().ok()) {
            config.lookup.timeout = Duration::from_secs(secs);
        }

        config
    }
}
