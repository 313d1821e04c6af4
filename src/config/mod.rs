//! Configuration loading and merging
//!
//! Handles loading JSON config files and package manifests, and folding them into
//! one [`crate::domain::Config`] with proper precedence (later files > earlier
//! files > `--package` > scanned packages).

pub mod loader;
pub mod merge;

pub use loader::{load_config_file, load_package, parse_config, ConfigDocument, PackageManifest};
pub use merge::{build_config, merge_document};
