//! Configuration I/O - Loading configuration
//!
//! Handles reading configuration from files and environment variables.

use std::path::Path;

use super::types::{split_list, InstallerConfig};
use crate::error::{Error, Result};

/// Load configuration with layered precedence:
/// 1. Config file if it exists, otherwise defaults
/// 2. Environment variable overrides (includes .env)
pub fn load_config() -> Result<InstallerConfig> {
    // .env may carry SKILLS_INSTALLER_CONFIG itself
    dotenvy::dotenv().ok();
    let config_path = super::paths::config_path();

    let mut config = if config_path.exists() {
        load_config_from_path(&config_path)?
    } else {
        InstallerConfig::default()
    };

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Load configuration from a specific TOML file
pub fn load_config_from_path(path: &Path) -> Result<InstallerConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid TOML config {}: {}", path.display(), e)))
}

/// Apply environment variable overrides to an existing config.
///
/// Loads `.env` from the working directory first, then overlays any
/// set variables. Env vars take precedence over the config file.
pub fn apply_env_overrides(config: &mut InstallerConfig) {
    dotenvy::dotenv().ok();
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary variable lookup
pub fn apply_overrides_from<F>(config: &mut InstallerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    // Source overrides
    if let Some(url) = get("SKILLS_REPO_BASE_URL") {
        config.source.base_url = Some(url);
    }
    if let Some(host) = get("SKILLS_REPO_HOST") {
        config.source.host = host;
    }
    if let Some(project) = get("SKILLS_REPO_PROJECT") {
        config.source.project = project;
    }
    if let Some(branch) = get("SKILLS_REPO_BRANCH") {
        config.source.branch = branch;
    }

    // Selection overrides
    if let Some(targets) = get("SKILLS_INSTALL_TARGETS") {
        config.install.targets = split_list(&targets);
    }
    if let Some(skills) = get("SKILLS_INSTALL_SKILLS") {
        config.install.skills = split_list(&skills);
    }
    if let Some(v) = get("SKILLS_INSTALL_NONINTERACTIVE") {
        config.install.non_interactive = is_truthy(&v);
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
