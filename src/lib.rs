//! # skill-installer
//!
//! Installs a shared bundle of agent skills into the skill directories of
//! several AI coding agents at once.
//!
//! ## Flow
//!
//! - **Select:** pick agent targets from a terminal menu, flags, or the environment
//! - **Install:** download the skills bundle and copy each package into every distinct directory
//! - **Runtime:** make sure Python 3 and the skills' Python packages are present
//! - **Configure:** collect the environment variables the skills read and save them

pub mod archive;
pub mod catalog;
pub mod config;
pub mod error;
pub mod installer;
pub mod menu;
pub mod orchestrator;
pub mod prompt;
pub mod runtime;
pub mod session;
pub mod targets;
pub mod ui;
pub mod wizard;

#[cfg(test)]
mod test_support;

pub use config::InstallerConfig;
pub use error::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");
