//! Configuration paths
//!
//! Utilities for resolving configuration and install paths.

use std::path::{Path, PathBuf};

/// Get the configuration directory
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("skill-installer"))
        .unwrap_or_else(|| home_dir().join(".config").join("skill-installer"))
}

/// Get the main configuration file path
pub fn config_path() -> PathBuf {
    // Check for explicit override
    if let Ok(path) = std::env::var("SKILLS_INSTALLER_CONFIG") {
        return PathBuf::from(path);
    }

    config_dir().join("config.toml")
}

/// The user's home directory, or the current directory if unknown
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Expand a leading `~` against the given home directory
pub fn expand_home_in(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        return home.to_path_buf();
    }
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => rest.split(|c: char| c == '/' || c == '\\').fold(home.to_path_buf(), |acc, part| acc.join(part)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths() {
        // Just ensure these don't panic
        let _ = config_dir();
        let _ = config_path();
    }

    #[test]
    fn test_expand_home() {
        let home = Path::new("/home/dev");
        assert_eq!(expand_home_in("~/.claude/skills", home), home.join(".claude").join("skills"));
        assert_eq!(expand_home_in("~", home), PathBuf::from("/home/dev"));
        assert_eq!(expand_home_in("/opt/skills", home), PathBuf::from("/opt/skills"));
    }
}
