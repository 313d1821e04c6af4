//! Per-resource string replacement

use super::TransformError;
use crate::domain::Config;
use regex::RegexBuilder;

/// Replace every configured pattern for `name` (plus `_defaults`).
///
/// Patterns are regexes in multi-line mode and are applied in config order, so a
/// later pattern sees the output of earlier ones. Replacements may refer to
/// capture groups as `$1` or `${name}`.
pub fn apply_strings(text: &str, name: &str, config: &Config) -> Result<String, TransformError> {
    let mut out = text.to_string();
    for (pattern, replacement) in config.effective_strings(name) {
        let regex = RegexBuilder::new(&pattern)
            .multi_line(true)
            .build()
            .map_err(|source| TransformError::Pattern { pattern: pattern.clone(), source })?;
        out = regex.replace_all(&out, replacement.as_str()).into_owned();
    }
    Ok(out)
}
