//! Resource name lookup from raw manifest text

use once_cell::sync::Lazy;
use regex::Regex;

/// `metadata:` followed, directly or after one other line, by `name: <value>`.
static METADATA_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*metadata:[ \t]*\r?\n(?:[^\n]*\n)??[ \t]*name:[ \t]*([^\r\n]*)")
        .expect("valid regex")
});

/// Return the manifest's `metadata.name`, or `None` if it has none.
pub fn extract_resource_name(text: &str) -> Option<String> {
    let caps = METADATA_NAME.captures(text)?;
    let name = strip_quotes(strip_comment(&caps[1]).trim());
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Drop a trailing `# ...` YAML comment.
fn strip_comment(value: &str) -> &str {
    if value.trim_start().starts_with('#') {
        return "";
    }
    let comment = value
        .match_indices('#')
        .map(|(at, _)| at)
        .find(|&at| value[..at].ends_with([' ', '\t']));
    match comment {
        Some(at) => &value[..at],
        None => value,
    }
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
