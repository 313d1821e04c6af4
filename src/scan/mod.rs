//! Manifest and package discovery

use anyhow::Result;
use std::path::{Path, PathBuf};

pub mod locator;

pub use locator::{locate_manifests, relative_path};

const PACKAGE_PATTERN: &str = "**/package.json";

/// Find every `package.json` under `root`, skipping `node_modules`.
pub fn find_package_manifests(root: &Path) -> Result<Vec<PathBuf>> {
    locate_manifests(root, &[PACKAGE_PATTERN.to_string()])
}
