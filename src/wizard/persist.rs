//! Writing collected values somewhere they survive the process

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};

use crate::error::Result;
use crate::runtime::{args, CommandRunner};

const BLOCK_TITLE: &str = "agent skills environment";

/// Where "save permanently" writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileTarget {
    /// Append `export` lines to a shell startup file
    ShellProfile(PathBuf),
    /// User-scoped environment through `setx`
    UserEnvironment,
}

impl ProfileTarget {
    /// Pick the profile for this machine
    ///
    /// `shell` is the value of `$SHELL`, if any.
    pub fn detect(os: &str, shell: Option<&str>, home: &Path) -> Self {
        if os == "windows" {
            return ProfileTarget::UserEnvironment;
        }
        let shell_name = shell
            .and_then(|s| Path::new(s).file_name())
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let file = match shell_name {
            "zsh" => ".zshrc",
            "bash" => ".bashrc",
            _ => ".profile",
        };
        ProfileTarget::ShellProfile(home.join(file))
    }

    pub fn describe(&self) -> String {
        match self {
            ProfileTarget::ShellProfile(path) => path.display().to_string(),
            ProfileTarget::UserEnvironment => "user environment (setx)".to_string(),
        }
    }
}

/// Single-quote a value for POSIX shells
pub fn quote_posix(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Single-quote a value for PowerShell
pub fn quote_powershell(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// The block appended to a shell profile
pub fn render_profile_block(entries: &[(&str, &SecretString)], stamp: &str) -> String {
    let mut block = format!("\n# >>> {} ({}) >>>\n", BLOCK_TITLE, stamp);
    for (name, value) in entries {
        block.push_str(&format!("export {}={}\n", name, quote_posix(value.expose_secret())));
    }
    block.push_str(&format!("# <<< {} <<<\n", BLOCK_TITLE));
    block
}

/// Assignment lines for manual copy
pub fn render_manual_block(entries: &[(&str, &SecretString)], os: &str) -> String {
    entries
        .iter()
        .map(|(name, value)| {
            let value = value.expose_secret();
            if os == "windows" {
                format!(
                    "[Environment]::SetEnvironmentVariable('{}', {}, 'User')",
                    name,
                    quote_powershell(value)
                )
            } else {
                format!("export {}={}", name, quote_posix(value))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append `block` to the profile at `path`, creating it if missing
pub fn append_block(path: &Path, block: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(block.as_bytes())?;
    Ok(())
}

/// Set each variable in the user environment, returning the names that failed
pub async fn set_user_environment(runner: &dyn CommandRunner, entries: &[(&str, &SecretString)]) -> Vec<String> {
    let mut failed = Vec::new();
    for (name, value) in entries {
        let ok = match runner.run("setx", &args(&[name, value.expose_secret()])).await {
            Ok(output) => output.success,
            Err(e) => {
                tracing::debug!("setx {} failed: {}", name, e);
                false
            }
        };
        if !ok {
            failed.push(name.to_string());
        }
    }
    failed
}
