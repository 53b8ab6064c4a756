//! Error types for the skill installer

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the installer's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the skill installer
#[derive(Error, Debug)]
pub enum Error {
    /// The user quit from the target menu
    #[error("Cancelled by user")]
    UserCancelled,

    /// Ctrl-C arrived while the run was in progress
    #[error("Interrupted")]
    Interrupted,

    /// Remote manifest was unusable (HTML page, empty, HTTP failure)
    #[error("Manifest invalid: {0}")]
    ManifestInvalid(String),

    /// Every archive source failed
    #[error("Archive unreachable, attempted: {}", .attempted.join(", "))]
    ArchiveUnreachable {
        /// URLs tried, in order
        attempted: Vec<String>,
    },

    /// Extracted archive has no `skills` directory
    #[error("No 'skills' directory found within two levels of {}", .0.display())]
    SkillsRootMissing(PathBuf),

    /// A requested skill is not in the package
    #[error("Skill not found: {0}")]
    SkillNotFound(String),

    /// No usable Python runtime
    #[error("Runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    /// Some dependency packages failed to install
    #[error("Dependency install failed: {0}")]
    DependencyInstall(String),

    /// Installing into one target failed
    #[error("Install into {} failed: {reason}", .path.display())]
    TargetInstall {
        /// Target directory
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Interactive prompt failed
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Zip archive error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code when this error ends the run
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::UserCancelled => 0,
            _ => 1,
        }
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            // console reports Ctrl-C read in raw mode as an interrupted read
            dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => Error::Interrupted,
            other => Error::Prompt(other.to_string()),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_exits_cleanly() {
        assert_eq!(Error::UserCancelled.exit_code(), 0);
        assert_eq!(Error::Config("bad".into()).exit_code(), 1);
    }

    #[test]
    fn test_ctrl_c_in_prompt_is_interrupt() {
        let err: Error = dialoguer::Error::IO(std::io::Error::from(std::io::ErrorKind::Interrupted)).into();
        assert!(matches!(err, Error::Interrupted));
        assert_eq!(err.exit_code(), 1);

        let err: Error = dialoguer::Error::IO(std::io::Error::from(std::io::ErrorKind::BrokenPipe)).into();
        assert!(matches!(err, Error::Prompt(_)));
    }

    #[test]
    fn test_unreachable_names_every_url() {
        let err = Error::ArchiveUnreachable {
            attempted: vec!["https://a/x.zip".into(), "https://a/x.tar.gz".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("https://a/x.zip"));
        assert!(msg.contains("https://a/x.tar.gz"));
    }
}
