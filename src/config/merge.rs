//! Ordered merging of configuration sources
//!
//! Precedence, lowest first: scanned package manifests, the explicit `--package`,
//! then each config file in the order given. The whole merge is a fold over
//! [`ConfigDocument`]s, so a run never observes a half-merged config.

use super::loader::{load_config_file, load_package, ConfigDocument};
use crate::domain::{Config, RunOptions, DEFAULTS_KEY};
use crate::scan::find_package_manifests;
use anyhow::Result;

/// Merge one source into the accumulated config.
///
/// Every section merges per top-level key with the newer value winning, except
/// `resources._defaults`, whose `requests` and `limits` merge key by key.
pub fn merge_document(mut config: Config, document: ConfigDocument) -> Config {
    if let Some(versions) = document.versions {
        config.versions.extend(versions);
    }
    if let Some(replicas) = document.replicas {
        config.replicas.extend(replicas);
    }
    if let Some(resources) = document.resources {
        for (name, setting) in resources {
            if name == DEFAULTS_KEY {
                config.resources.entry(name).or_default().merge_defaults(&setting);
            } else {
                config.resources.insert(name, setting);
            }
        }
    }
    if let Some(strings) = document.strings {
        config.strings.extend(strings);
    }
    config
}

/// Load every source named by `options` and fold them into one [`Config`].
///
/// Any unreadable or malformed source fails the whole merge.
pub fn build_config(options: &RunOptions) -> Result<Config> {
    let mut documents = Vec::new();

    if options.scan_package {
        for path in find_package_manifests(&options.root)? {
            match load_package(&path)?.version_entry() {
                Some((name, version)) => {
                    tracing::debug!("package {} -> {}@{}", path.display(), name, version);
                    documents.push(ConfigDocument::from_version(name, version));
                }
                None => {
                    tracing::debug!("skipping {}: no name/version", path.display());
                }
            }
        }
    }

    if let Some(path) = &options.package {
        tracing::debug!("package {}", path.display());
        let Some((name, version)) = load_package(path)?.version_entry() else {
            anyhow::bail!("Package manifest is missing name or version: {}", path.display());
        };
        documents.push(ConfigDocument::from_version(name, version));
    }

    for path in &options.version_files {
        tracing::debug!("versionFile {}", path.display());
        documents.push(load_config_file(path)?);
    }

    Ok(documents.into_iter().fold(Config::default(), merge_document))
}
