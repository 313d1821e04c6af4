//! Path normalization

/// Convert backslashes to forward slashes so glob matching and reported paths
/// look the same on every platform.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
