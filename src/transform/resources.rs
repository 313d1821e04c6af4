//! Container resource requests/limits
//!
//! Unlike the other stages this one works on the parsed document. Any container
//! under `spec.template.spec.containers` or `.initContainers` that already has a
//! `resources` block is updated, and the whole document is re-serialized, so
//! comments and original formatting do not survive this stage.

use super::TransformError;
use crate::domain::{Config, QuantityMap};
use serde_yaml::{Mapping, Value};

const LIMITS: &str = "limits";
const REQUESTS: &str = "requests";

/// Apply the effective resource settings for `name` to a manifest.
///
/// Returns the input unchanged when no container carries a `resources` block.
pub fn apply_resources(text: &str, name: &str, config: &Config) -> Result<String, TransformError> {
    let mut document: Value = serde_yaml::from_str(text)?;
    let effective = config.effective_resources(name);

    let Some(pod_spec) = pod_spec_mut(&mut document) else {
        return Ok(text.to_string());
    };

    let mut touched = 0usize;
    for (field, init) in [("containers", false), ("initContainers", true)] {
        let Some(containers) = pod_spec.get_mut(field).and_then(Value::as_sequence_mut) else {
            continue;
        };
        for container in containers {
            let Some(resources) = container.get_mut("resources").and_then(Value::as_mapping_mut)
            else {
                continue;
            };
            let (limits, requests) = effective.for_container(init);
            apply_quantities(resources, LIMITS, limits);
            apply_quantities(resources, REQUESTS, requests);
            touched += 1;
        }
    }

    if touched == 0 {
        return Ok(text.to_string());
    }
    tracing::debug!("resources for {}: {} container(s)", name, touched);
    Ok(serde_yaml::to_string(&document)?)
}

fn pod_spec_mut(document: &mut Value) -> Option<&mut Value> {
    document.get_mut("spec")?.get_mut("template")?.get_mut("spec")
}

fn apply_quantities(resources: &mut Mapping, section: &str, quantities: Option<&QuantityMap>) {
    let Some(quantities) = quantities else {
        return;
    };

    for (key, quantity) in quantities {
        if quantity.is_removal() {
            if let Some(existing) = resources.get_mut(section).and_then(Value::as_mapping_mut) {
                existing.remove(key.as_str());
            }
            continue;
        }

        if !matches!(resources.get(section), Some(Value::Mapping(_))) {
            resources.insert(Value::from(section), Value::Mapping(Mapping::new()));
        }
        if let Some(existing) = resources.get_mut(section).and_then(Value::as_mapping_mut) {
            existing.insert(Value::from(key.as_str()), quantity.to_yaml());
        }
    }
}
