//! Version placeholder substitution
//!
//! `name==REPLACE`, `name:REPLACE` and `name@REPLACE` (pip pins, image tags, npm
//! references) become `name==<version>` and so on. Matching ignores case; the
//! configured spelling of the name is what gets written.

use super::TransformError;
use indexmap::IndexMap;
use regex::{Captures, Regex, RegexBuilder};

struct VersionRule {
    name: String,
    version: String,
    pattern: Regex,
}

/// Precompiled substitution rules, one per configured name, in config order.
pub struct VersionStamper {
    rules: Vec<VersionRule>,
}

impl VersionStamper {
    pub fn new(versions: &IndexMap<String, String>) -> Result<Self, TransformError> {
        let rules = versions
            .iter()
            .map(|(name, version)| {
                let source = format!("{}(==|:|@)REPLACE", regex::escape(name));
                let pattern = RegexBuilder::new(&source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| TransformError::Pattern { pattern: name.clone(), source })?;
                Ok(VersionRule { name: name.clone(), version: version.clone(), pattern })
            })
            .collect::<Result<Vec<_>, TransformError>>()?;
        Ok(Self { rules })
    }

    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            let replaced = rule.pattern.replace_all(&out, |caps: &Captures| {
                format!("{}{}{}", rule.name, &caps[1], rule.version)
            });
            out = replaced.into_owned();
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
