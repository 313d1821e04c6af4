//! Merge-and-apply pipeline
//!
//! The config is merged once, then each located manifest goes through the
//! transforms in a fixed order and is written back only when its text changed.
//! A manifest that fails to read or parse is reported and skipped; the rest of
//! the run continues.

use crate::config::build_config;
use crate::domain::{Config, RunOptions};
use crate::scan::{locate_manifests, relative_path};
use crate::transform::{
    apply_replicas, apply_resources, apply_strings, extract_resource_name, TransformError,
    VersionStamper,
};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const DEBUG_SUFFIX: &str = ".debug";

/// What happened to one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Unchanged,
    /// Content changed; `written` is where it went, if anywhere.
    Updated { written: Option<PathBuf> },
}

/// Counts for a finished run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub updated: Vec<PathBuf>,
    pub unchanged: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Pipeline {
    options: RunOptions,
    config: Config,
    stamper: VersionStamper,
}

impl Pipeline {
    /// Merge every configured source. Fails without touching any manifest if a
    /// source cannot be loaded.
    pub fn new(options: RunOptions) -> Result<Self> {
        let config = build_config(&options)?;
        Self::with_config(options, config)
    }

    pub fn with_config(options: RunOptions, config: Config) -> Result<Self> {
        let stamper = VersionStamper::new(&config.versions)?;
        tracing::debug!(
            "config: {} version(s), {} replica, {} resource, {} string entries",
            config.versions.len(),
            config.replicas.len(),
            config.resources.len(),
            config.strings.len()
        );
        Ok(Self { options, config, stamper })
    }

    /// Run every transform over one manifest's text.
    pub fn transform(&self, text: &str) -> Result<String, TransformError> {
        let stamped = self.stamper.apply(text);

        let Some(name) = extract_resource_name(&stamped) else {
            tracing::debug!("no metadata.name, only versions applied");
            return Ok(stamped);
        };

        let replicated = apply_replicas(&stamped, &name, &self.config);
        let resourced = apply_resources(&replicated, &name, &self.config)?;
        apply_strings(&resourced, &name, &self.config)
    }

    /// Transform one file and persist the result according to the run options.
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        tracing::debug!("reading {}", path.display());
        let before = fs::read_to_string(path)
            .with_context(|| format!("Failed reading manifest: {}", path.display()))?;
        let after = self
            .transform(&before)
            .with_context(|| format!("Failed transforming manifest: {}", path.display()))?;

        if before == after {
            return Ok(FileOutcome::Unchanged);
        }

        let target = if self.options.debug {
            Some(debug_path(path))
        } else if self.options.update {
            Some(path.to_path_buf())
        } else {
            None
        };

        if let Some(target) = &target {
            fs::write(target, &after)
                .with_context(|| format!("Failed writing manifest: {}", target.display()))?;
        }
        Ok(FileOutcome::Updated { written: target })
    }

    /// Locate and process every manifest, printing `update <path>` for each change.
    pub fn run(&self) -> Result<RunSummary> {
        let root = &self.options.root;
        let files = locate_manifests(root, &self.options.search_patterns)?;
        tracing::debug!("{} manifest(s) matched", files.len());

        let mut summary = RunSummary::default();
        for path in files {
            let shown = relative_path(root, &path);
            match self.process_file(&path) {
                Ok(FileOutcome::Unchanged) => summary.unchanged += 1,
                Ok(FileOutcome::Updated { written }) => {
                    println!("update {}", shown);
                    if written.is_none() {
                        tracing::info!("{} not written (updates disabled)", shown);
                    }
                    summary.updated.push(path);
                }
                Err(err) => {
                    tracing::error!("{:#}", err);
                    summary.failed.push((path, format!("{:#}", err)));
                }
            }
        }

        tracing::info!(
            "{} updated, {} unchanged, {} failed",
            summary.updated.len(),
            summary.unchanged,
            summary.failed.len()
        );
        Ok(summary)
    }
}

/// `deploy.yaml` -> `deploy.yaml.debug`
fn debug_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(DEBUG_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{merge_document, parse_config};
    use tempfile::TempDir;

    fn pipeline(json: &str, options: RunOptions) -> Pipeline {
        let document = parse_config(json, Path::new("test.json")).expect("config");
        let config = merge_document(Config::default(), document);
        Pipeline::with_config(options, config).expect("pipeline")
    }

    fn options(root: &Path) -> RunOptions {
        RunOptions { root: root.to_path_buf(), version_files: Vec::new(), ..RunOptions::default() }
    }

    const DEPLOYMENT: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: api
spec:
  replicas: 3
  template:
    spec:
      containers:
      - name: api
        image: registry/api:REPLACE
        env:
        - name: HOST
          value: HOST_VALUE
        resources:
          limits:
            cpu: 500m
            memory: 1Gi
";

    #[test]
    fn unnamed_manifest_only_gets_versions() {
        let p = pipeline(
            r#"{
                "versions": {"api": "1.0.0"},
                "replicas": {"_default": 0},
                "strings": {"_defaults": {"HOST_VALUE": "x"}}
            }"#,
            options(Path::new(".")),
        );
        let text = "spec:\n  replicas: 3\nimage: api:REPLACE\nhost: HOST_VALUE\n";
        similar_asserts::assert_eq!(
            p.transform(text).expect("transform"),
            "spec:\n  replicas: 3\nimage: api:1.0.0\nhost: HOST_VALUE\n".to_string()
        );
    }

    #[test]
    fn full_transform_applies_every_stage() {
        let p = pipeline(
            r#"{
                "versions": {"api": "1.4.2"},
                "replicas": {"_default": 0},
                "resources": {"api": {"limits": {"memory": 0, "cpu": "1"}}},
                "strings": {"api": {"HOST_VALUE": "api.example.com"}}
            }"#,
            options(Path::new(".")),
        );
        let out = p.transform(DEPLOYMENT).expect("transform");
        let doc: serde_yaml::Value = serde_yaml::from_str(&out).expect("yaml");

        assert_eq!(doc["spec"]["replicas"], serde_yaml::Value::from(0));
        let container = &doc["spec"]["template"]["spec"]["containers"][0];
        assert_eq!(container["image"], serde_yaml::Value::from("registry/api:1.4.2"));
        assert_eq!(container["env"][0]["value"], serde_yaml::Value::from("api.example.com"));
        assert_eq!(container["resources"]["limits"]["cpu"], serde_yaml::Value::from("1"));
        assert!(container["resources"]["limits"].get("memory").is_none());
    }

    #[test]
    fn replicas_default_to_zero_without_replica_entries() {
        let text = "metadata:\n  name: api\nspec:\n  replicas: 3\n";
        for json in [r#"{"versions": {"api": "1"}}"#, r#"{"replicas": {}}"#] {
            let p = pipeline(json, options(Path::new(".")));
            assert_eq!(
                p.transform(text).expect("transform"),
                "metadata:\n  name: api\nspec:\n  replicas: 0\n",
                "config {}",
                json
            );
        }
    }

    #[test]
    fn broken_yaml_fails_only_that_file() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("a-broken.yaml"), "metadata:\n  name: bad\nspec: [oops\n")
            .expect("write");
        fs::write(tmp.path().join("b-good.yaml"), "image: api:REPLACE\n").expect("write");

        let p = pipeline(r#"{"api": "2.0.0"}"#, options(tmp.path()));
        let summary = p.run().expect("run");

        assert!(!summary.is_success());
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.updated.len(), 1);
        assert_eq!(
            fs::read_to_string(tmp.path().join("b-good.yaml")).expect("read"),
            "image: api:2.0.0\n"
        );
    }

    #[test]
    fn unchanged_files_are_not_written() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("static.yaml");
        fs::write(&path, "kind: ConfigMap\n").expect("write");

        let p = pipeline(r#"{"api": "2.0.0"}"#, options(tmp.path()));
        assert_eq!(p.process_file(&path).expect("process"), FileOutcome::Unchanged);
        assert!(!debug_path(&path).exists());
    }

    #[test]
    fn no_update_leaves_file_alone() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("deploy.yaml");
        fs::write(&path, "image: api:REPLACE\n").expect("write");

        let p =
            pipeline(r#"{"api": "2.0.0"}"#, RunOptions { update: false, ..options(tmp.path()) });
        assert_eq!(p.process_file(&path).expect("process"), FileOutcome::Updated { written: None });
        assert_eq!(fs::read_to_string(&path).expect("read"), "image: api:REPLACE\n");
    }

    #[test]
    fn debug_writes_sibling_copy() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("deploy.yaml");
        fs::write(&path, "image: api:REPLACE\n").expect("write");

        let p = pipeline(r#"{"api": "2.0.0"}"#, RunOptions { debug: true, ..options(tmp.path()) });
        let outcome = p.process_file(&path).expect("process");

        let debug = tmp.path().join("deploy.yaml.debug");
        assert_eq!(outcome, FileOutcome::Updated { written: Some(debug.clone()) });
        assert_eq!(fs::read_to_string(&debug).expect("read"), "image: api:2.0.0\n");
        assert_eq!(fs::read_to_string(&path).expect("read"), "image: api:REPLACE\n");
    }
}
