//! Glob-based manifest discovery

use crate::utils::normalize_path;
use anyhow::{Context, Result};
use globset::{Glob, GlobBuilder, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Directories never descended into while resolving patterns.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Resolve glob patterns relative to `root` into a list of files.
///
/// Files come back in walk order (entries sorted by file name), de-duplicated
/// across patterns. A pattern starting with `!` removes matches instead of adding
/// them, wherever it appears in the list.
pub fn locate_manifests(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut includes = Vec::new();
    let mut excludes = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.trim();
        if let Some(negated) = pattern.strip_prefix('!') {
            excludes.add(build_glob(strip_dot_slash(negated))?);
        } else if !pattern.is_empty() {
            includes.push(strip_dot_slash(pattern));
        }
    }
    let excludes = excludes.build().context("Failed building exclude patterns")?;

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for pattern in includes {
        for path in resolve_pattern(root, pattern)? {
            let relative = relative_path(root, &path);
            if excludes.is_match(&relative) {
                continue;
            }
            if seen.insert(relative) {
                files.push(path);
            }
        }
    }
    Ok(files)
}

fn resolve_pattern(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !pattern.contains(GLOB_META) {
        let path = root.join(pattern);
        return Ok(if path.is_file() { vec![path] } else { Vec::new() });
    }

    let matcher = build_glob(pattern)?.compile_matcher();
    let start = root.join(literal_prefix(pattern));
    if !start.is_dir() {
        tracing::debug!("pattern {} has no base directory {}", pattern, start.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in walk(&start) {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if matcher.is_match(relative_path(root, entry.path())) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn walk(start: &Path) -> ignore::Walk {
    WalkBuilder::new(start)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry: &DirEntry| {
            if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
                return true;
            }
            entry.file_name().to_str().map_or(true, |name| !SKIPPED_DIRS.contains(&name))
        })
        .build()
}

fn build_glob(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("Invalid glob pattern: {}", pattern))
}

/// Leading path components that contain no glob metacharacters.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let components: Vec<&str> = pattern.split('/').collect();
    for component in &components[..components.len().saturating_sub(1)] {
        if component.contains(GLOB_META) {
            break;
        }
        base.push(component);
    }
    base
}

fn strip_dot_slash(pattern: &str) -> &str {
    pattern.strip_prefix("./").unwrap_or(pattern)
}

/// Forward-slash path of `path` relative to `root`, used for matching.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    normalize_path(&relative.to_string_lossy())
}
