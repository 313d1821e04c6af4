//! Core data types shared across the crate
//!
//! [`Config`] is the merged view of every configuration source for one run. It is
//! produced once by [`crate::config::build_config`] and only read afterwards.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fallback key inside `replicas`.
pub const DEFAULT_KEY: &str = "_default";
/// Fallback key inside `resources` and `strings`.
pub const DEFAULTS_KEY: &str = "_defaults";

/// Resource name -> quantity, e.g. `cpu -> "500m"`.
pub type QuantityMap = IndexMap<String, Quantity>;

/// Regex pattern -> replacement text.
pub type StringMap = IndexMap<String, String>;

/// A resource quantity as written in a config file.
///
/// `0` and `"0"` are removal markers: the key is deleted from the manifest instead
/// of being set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(serde_json::Number),
    Text(String),
}

impl Quantity {
    pub fn is_removal(&self) -> bool {
        match self {
            Quantity::Number(n) => n.as_f64() == Some(0.0),
            Quantity::Text(s) => s == "0",
        }
    }

    /// Convert to a YAML scalar, keeping integers as integers.
    pub fn to_yaml(&self) -> serde_yaml::Value {
        match self {
            Quantity::Text(s) => serde_yaml::Value::String(s.clone()),
            Quantity::Number(n) => {
                let number = if let Some(i) = n.as_i64() {
                    serde_yaml::Number::from(i)
                } else if let Some(u) = n.as_u64() {
                    serde_yaml::Number::from(u)
                } else {
                    serde_yaml::Number::from(n.as_f64().unwrap_or_default())
                };
                serde_yaml::Value::Number(number)
            }
        }
    }
}

/// Requests/limits for one resource name (or for `_defaults`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<QuantityMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<QuantityMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_requests: Option<QuantityMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_limits: Option<QuantityMap>,
}

impl ResourceSetting {
    /// Shallow overlay: every section present in `other` replaces ours wholesale.
    pub fn overlay(&mut self, other: &ResourceSetting) {
        if other.requests.is_some() {
            self.requests = other.requests.clone();
        }
        if other.limits.is_some() {
            self.limits = other.limits.clone();
        }
        if other.init_requests.is_some() {
            self.init_requests = other.init_requests.clone();
        }
        if other.init_limits.is_some() {
            self.init_limits = other.init_limits.clone();
        }
    }

    /// Merge used for `_defaults`: `requests` and `limits` merge key by key, the
    /// init sections are replaced.
    pub fn merge_defaults(&mut self, other: &ResourceSetting) {
        merge_quantities(&mut self.requests, other.requests.as_ref());
        merge_quantities(&mut self.limits, other.limits.as_ref());
        if other.init_requests.is_some() {
            self.init_requests = other.init_requests.clone();
        }
        if other.init_limits.is_some() {
            self.init_limits = other.init_limits.clone();
        }
    }

    /// Pick the `(limits, requests)` pair that applies to a container.
    ///
    /// Init containers prefer `init_limits`/`init_requests` and fall back to the
    /// regular sections.
    pub fn for_container(&self, init: bool) -> (Option<&QuantityMap>, Option<&QuantityMap>) {
        if init {
            (
                self.init_limits.as_ref().or(self.limits.as_ref()),
                self.init_requests.as_ref().or(self.requests.as_ref()),
            )
        } else {
            (self.limits.as_ref(), self.requests.as_ref())
        }
    }
}

fn merge_quantities(target: &mut Option<QuantityMap>, source: Option<&QuantityMap>) {
    let Some(source) = source else {
        return;
    };
    let merged = target.get_or_insert_with(QuantityMap::new);
    for (key, value) in source {
        merged.insert(key.clone(), value.clone());
    }
}

/// Merged settings for a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub versions: IndexMap<String, String>,
    pub replicas: IndexMap<String, u32>,
    pub resources: IndexMap<String, ResourceSetting>,
    pub strings: IndexMap<String, StringMap>,
}

impl Config {
    /// Replica count a named resource should carry: its own entry, else
    /// `_default`, else 0.
    pub fn replica_target(&self, name: &str) -> u32 {
        self.replicas.get(name).or_else(|| self.replicas.get(DEFAULT_KEY)).copied().unwrap_or(0)
    }

    /// `_defaults` overlaid with the entry for `name`.
    pub fn effective_resources(&self, name: &str) -> ResourceSetting {
        let mut effective = self.resources.get(DEFAULTS_KEY).cloned().unwrap_or_default();
        if let Some(specific) = self.resources.get(name) {
            effective.overlay(specific);
        }
        effective
    }

    /// `_defaults` patterns with the entries for `name` winning per pattern.
    pub fn effective_strings(&self, name: &str) -> StringMap {
        let mut effective = self.strings.get(DEFAULTS_KEY).cloned().unwrap_or_default();
        if let Some(specific) = self.strings.get(name) {
            for (pattern, replacement) in specific {
                effective.insert(pattern.clone(), replacement.clone());
            }
        }
        effective
    }
}

/// Resolved options for one run, printed at start-up.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    pub root: PathBuf,
    pub search_patterns: Vec<String>,
    #[serde(rename = "versionFile")]
    pub version_files: Vec<PathBuf>,
    pub package: Option<PathBuf>,
    pub scan_package: bool,
    pub debug: bool,
    pub update: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            search_patterns: DEFAULT_SEARCH_PATTERNS.split(',').map(str::to_string).collect(),
            version_files: vec![PathBuf::from(DEFAULT_VERSION_FILE)],
            package: None,
            scan_package: false,
            debug: false,
            update: true,
        }
    }
}

pub const DEFAULT_VERSION_FILE: &str = "versions.json";
pub const DEFAULT_SEARCH_PATTERNS: &str = "**/*.yaml,**/*.yml";
