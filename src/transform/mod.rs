//! Manifest transforms
//!
//! Stages run in a fixed order (see [`crate::pipeline`]):
//! 1. [`versions`] - regex over raw text, no parsing required
//! 2. [`name`] - resource name lookup, gates everything below
//! 3. [`replicas`] - regex over raw text
//! 4. [`resources`] - parsed YAML tree, re-serialized to text
//! 5. [`strings`] - user-supplied regexes over the resulting text

use thiserror::Error;

pub mod name;
pub mod replicas;
pub mod resources;
pub mod strings;
pub mod versions;

pub use name::extract_resource_name;
pub use replicas::apply_replicas;
pub use resources::apply_resources;
pub use strings::apply_strings;
pub use versions::VersionStamper;

/// Failure while transforming a single manifest.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Failed to parse manifest YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
