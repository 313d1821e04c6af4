//! manifest-stamp: stamp versions and deployment settings into Kubernetes manifests

use anyhow::Result;

fn main() -> Result<()> {
    manifest_stamp::cli::run()
}
