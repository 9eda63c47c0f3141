//! Path utilities for Descry
//!
//! Handles tilde expansion and mapping directory normalization.

use std::path::{Path, PathBuf};

/// Expands a leading tilde (~) to the user's home directory.
/// Examples:
/// "~/mappings" -> "/home/qa/mappings"
/// "/tmp/foo" -> "/tmp/foo" (no change)
pub fn expand_tilde(path: &str) -> String {
    if path == "~" {
        return std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    }
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            format!("{}/{}", home, rest)
        }
        None => path.to_string(),
    }
}

/// Helper to convert a potentially tilde-containing string into a PathBuf.
pub fn get_path(path: &str) -> PathBuf {
    PathBuf::from(expand_tilde(path))
}

/// Ensures a mapping directory path is absolute, resolving relative paths
/// against the current working directory.
pub fn ensure_absolute(path: &Path) -> PathBuf {
    let p = get_path(&path.to_string_lossy());
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&p))
            .unwrap_or(p)
    }
}

/// Returns true for `*.json` files, ignoring extension case.
pub fn is_mapping_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_paths_alone() {
        assert_eq!(expand_tilde("/tmp/mappings"), "/tmp/mappings");
        assert_eq!(expand_tilde("mappings/~draft"), "mappings/~draft");
    }

    #[test]
    fn expands_leading_tilde() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        assert_eq!(expand_tilde("~/mappings"), format!("{}/mappings", home));
    }

    #[test]
    fn recognizes_json_mapping_files() {
        assert!(is_mapping_file(Path::new("login.json")));
        assert!(is_mapping_file(Path::new("dir/LOGIN.JSON")));
        assert!(!is_mapping_file(Path::new("notes.md")));
        assert!(!is_mapping_file(Path::new("json")));
    }

    #[test]
    fn relative_paths_become_absolute() {
        assert!(ensure_absolute(Path::new("mappings")).is_absolute());
    }
}
