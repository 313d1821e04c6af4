//! Replica count rewriting

use crate::domain::Config;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static REPLICAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(replicas:\s+)(\d+)").expect("valid regex"));

/// Set every `replicas: N` line to the configured count for `name`.
///
/// The first occurrence decides whether anything changes; when it already holds
/// the target, the text is returned untouched.
pub fn apply_replicas(text: &str, name: &str, config: &Config) -> String {
    let target = config.replica_target(name);
    let Some(current) = REPLICAS.captures(text) else {
        return text.to_string();
    };
    if current[2].parse::<u64>().ok() == Some(u64::from(target)) {
        return text.to_string();
    }

    tracing::debug!("replicas for {}: {} -> {}", name, &current[2], target);
    REPLICAS
        .replace_all(text, |caps: &Captures| format!("{}{}", &caps[1], target))
        .into_owned()
}
