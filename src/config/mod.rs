//! Configuration module
//!
//! - types/mod.rs: Core configuration types (InstallerConfig, InstallOptions)
//! - types/source.rs: Remote source and archive locations
//! - io.rs: Configuration loading and environment overrides
//! - validation.rs: Configuration validation
//! - paths.rs: Configuration and install paths

mod io;
mod paths;
mod types;
mod validation;

pub use types::{split_list, ArchiveFormat, ArchiveSource, InstallOptions, InstallerConfig, SourceConfig};

pub use io::{apply_env_overrides, apply_overrides_from, load_config, load_config_from_path};
pub use paths::{config_dir, config_path, expand_home_in, home_dir};
pub use validation::{validate_config, ConfigIssue, ConfigReport, Severity};
