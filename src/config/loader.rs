//! Config and package manifest loading

use crate::domain::{ResourceSetting, StringMap};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Top-level keys that mark a structured config document.
const SECTION_KEYS: &[&str] = &["versions", "replicas", "resources", "strings"];

/// One parsed configuration source, before merging.
///
/// Sections absent from the source are `None` so that merging can tell "not
/// mentioned" apart from "explicitly empty".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    pub versions: Option<IndexMap<String, String>>,
    pub replicas: Option<IndexMap<String, u32>>,
    pub resources: Option<IndexMap<String, ResourceSetting>>,
    pub strings: Option<IndexMap<String, StringMap>>,
}

impl ConfigDocument {
    /// A document carrying a single version entry, as produced by a package manifest.
    pub fn from_version(name: String, version: String) -> Self {
        let mut versions = IndexMap::new();
        versions.insert(name, version);
        Self { versions: Some(versions), ..Default::default() }
    }
}

/// Read and parse a JSON config file.
pub fn load_config_file(path: &Path) -> Result<ConfigDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading config file: {}", path.display()))?;
    parse_config(&content, path)
}

/// Parse a config document.
///
/// A document with none of the section keys is read as a flat `{name: version}`
/// map, the format older pipelines still use.
pub fn parse_config(content: &str, path: &Path) -> Result<ConfigDocument> {
    let raw: Value = serde_json::from_str(content)
        .with_context(|| format!("Invalid JSON syntax: {}", path.display()))?;
    let Value::Object(object) = &raw else {
        anyhow::bail!("Config must be a JSON object: {}", path.display());
    };

    if !SECTION_KEYS.iter().any(|key| object.contains_key(*key)) {
        tracing::debug!(
            "{} has no section keys, reading it as a flat versions map",
            path.display()
        );
        return Ok(ConfigDocument {
            versions: Some(versions_from_value(&raw, path)?),
            ..Default::default()
        });
    }

    let versions = object.get("versions").map(|v| versions_from_value(v, path)).transpose()?;
    let replicas = section(object.get("replicas"), "replicas", path)?;
    let resources = section(object.get("resources"), "resources", path)?;
    let strings = section(object.get("strings"), "strings", path)?;

    Ok(ConfigDocument { versions, replicas, resources, strings })
}

fn section<T>(value: Option<&Value>, name: &str, path: &Path) -> Result<Option<T>>
where
    T: for<'de> Deserialize<'de>,
{
    value
        .map(|v| {
            serde_json::from_value(v.clone())
                .with_context(|| format!("Invalid '{}' section in {}", name, path.display()))
        })
        .transpose()
}

/// Versions are usually strings; bare numbers and booleans are accepted and stringified.
fn versions_from_value(value: &Value, path: &Path) -> Result<IndexMap<String, String>> {
    let Value::Object(object) = value else {
        anyhow::bail!("'versions' must be a JSON object: {}", path.display());
    };

    let mut versions = IndexMap::with_capacity(object.len());
    for (name, version) in object {
        let version = match version {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => anyhow::bail!(
                "Version for '{}' must be a string, got {} in {}",
                name,
                other,
                path.display()
            ),
        };
        versions.insert(name.clone(), version);
    }
    Ok(versions)
}

/// The fields read from a `package.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl PackageManifest {
    /// Name with any `@scope/` prefix removed.
    pub fn short_name(&self) -> Option<&str> {
        self.name.as_deref().and_then(|name| name.rsplit('/').next()).filter(|n| !n.is_empty())
    }

    /// `(short name, version)` when both are present.
    pub fn version_entry(&self) -> Option<(String, String)> {
        let name = self.short_name()?;
        let version = self.version.as_deref()?;
        Some((name.to_string(), version.to_string()))
    }
}

pub fn load_package(path: &Path) -> Result<PackageManifest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading package manifest: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid package manifest: {}", path.display()))
}
