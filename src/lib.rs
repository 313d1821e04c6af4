//! manifest-stamp: stamp versions and deployment settings into Kubernetes manifests
//!
//! Merges version, replica, resource and string settings from package manifests
//! and JSON config files, then rewrites matching YAML manifests in place.

pub mod cli;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod scan;
pub mod transform;
pub mod utils;
