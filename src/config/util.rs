//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`.
///
/// Walks up parent directories until finding `config_name`.
/// An absolute `config_name` is only checked as-is.
///
/// # Example
/// ```text
/// /home/user/slides/deck/   ← start
/// /home/user/pagecut.toml   ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_parent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("pagecut.toml"), "").unwrap();

        let found = find_config_file(Path::new("pagecut.toml"), &nested).unwrap();
        assert_eq!(found, dir.path().join("pagecut.toml"));
    }

    #[test]
    fn test_missing_config() {
        let dir = TempDir::new().unwrap();
        assert!(find_config_file(Path::new("no-such-config.toml"), dir.path()).is_none());
    }

    #[test]
    fn test_absolute_path_not_searched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        assert!(find_config_file(&path, dir.path()).is_none());
        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }
}
