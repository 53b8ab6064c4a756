//! Configuration types module

pub mod source;

use serde::{Deserialize, Serialize};

pub use source::{ArchiveFormat, ArchiveSource, SourceConfig};

/// Main installer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallerConfig {
    /// Where manifests, archives and requirements come from
    #[serde(default)]
    pub source: SourceConfig,

    /// Install-time options
    #[serde(default)]
    pub install: InstallOptions,
}

impl InstallerConfig {
    /// Load configuration from the config file and environment
    ///
    /// Layers, lowest precedence first:
    /// 1. Default values
    /// 2. Config file (if present)
    /// 3. Environment variable overrides
    pub fn from_env() -> crate::error::Result<Self> {
        crate::config::load_config()
    }
}

/// Options controlling a single installer run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallOptions {
    /// Target keys to install into; empty means "ask"
    #[serde(default)]
    pub targets: Vec<String>,
    /// Restrict installation to these skills; empty means the whole catalog
    #[serde(default)]
    pub skills: Vec<String>,
    /// Never show the menu or prompt
    #[serde(default)]
    pub non_interactive: bool,
    /// Auto-approve runtime installation
    #[serde(default)]
    pub assume_yes: bool,
    /// Skip the Python runtime bootstrap
    #[serde(default)]
    pub skip_runtime: bool,
    /// Skip the environment configuration wizard
    #[serde(default)]
    pub skip_config: bool,
}

/// Split a comma/whitespace separated list, dropping empty entries
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b,,c"), vec!["a", "b", "c"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let config: InstallerConfig = toml::from_str(
            r#"
            [source]
            host = "https://git.example.com"
            project = "tools/agent-skills"

            [install]
            targets = ["claude", "codex"]
            skip_config = true
            "#,
        )
        .unwrap();

        assert_eq!(config.source.host, "https://git.example.com");
        assert_eq!(config.source.branch, "main");
        assert_eq!(config.install.targets, vec!["claude", "codex"]);
        assert!(config.install.skip_config);
        assert!(!config.install.skip_runtime);
    }
}
