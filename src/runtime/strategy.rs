//! Runtime install strategies
//!
//! Each strategy wraps one OS package manager. The bootstrapper walks an
//! ordered list of them until one installs Python successfully.

use async_trait::async_trait;

use super::command::{args, CommandRunner};
use crate::error::{Error, Result};

/// One way of installing the Python runtime
#[async_trait]
pub trait RuntimeInstallStrategy: Send + Sync {
    /// Human-readable name
    fn name(&self) -> &str;

    /// Whether this strategy can run on this machine
    fn detect(&self, runner: &dyn CommandRunner) -> bool;

    /// Try to install the runtime
    async fn attempt(&self, runner: &dyn CommandRunner) -> Result<()>;
}

/// Installs Python through a system package manager
pub struct PackageManagerStrategy {
    name: &'static str,
    manager: &'static str,
    /// Run through `sudo` when available
    privileged: bool,
    steps: Vec<Vec<&'static str>>,
}

impl PackageManagerStrategy {
    pub fn new(name: &'static str, manager: &'static str, privileged: bool, steps: Vec<Vec<&'static str>>) -> Self {
        PackageManagerStrategy {
            name,
            manager,
            privileged,
            steps,
        }
    }
}

#[async_trait]
impl RuntimeInstallStrategy for PackageManagerStrategy {
    fn name(&self) -> &str {
        self.name
    }

    fn detect(&self, runner: &dyn CommandRunner) -> bool {
        runner.exists(self.manager)
    }

    async fn attempt(&self, runner: &dyn CommandRunner) -> Result<()> {
        let use_sudo = self.privileged && runner.exists("sudo");

        for step in &self.steps {
            let (program, rest) = match (use_sudo, step.split_first()) {
                (true, Some(_)) => ("sudo", args(step)),
                (false, Some((first, rest))) => (*first, args(rest)),
                (_, None) => continue,
            };

            let output = runner.run(program, &rest).await?;
            if !output.success {
                return Err(Error::RuntimeUnavailable(format!(
                    "{} failed: {}",
                    step.join(" "),
                    output.combined()
                )));
            }
        }
        Ok(())
    }
}

/// The ordered strategy cascade for an operating system
///
/// `os` takes the values of `std::env::consts::OS`.
pub fn default_strategies(os: &str) -> Vec<Box<dyn RuntimeInstallStrategy>> {
    match os {
        "macos" => vec![Box::new(PackageManagerStrategy::new(
            "Homebrew",
            "brew",
            false,
            vec![vec!["brew", "install", "python@3"]],
        ))],
        "windows" => vec![
            Box::new(PackageManagerStrategy::new(
                "winget",
                "winget",
                false,
                vec![vec![
                    "winget",
                    "install",
                    "--id",
                    "Python.Python.3.12",
                    "-e",
                    "--silent",
                    "--accept-package-agreements",
                    "--accept-source-agreements",
                ]],
            )),
            Box::new(PackageManagerStrategy::new(
                "Chocolatey",
                "choco",
                false,
                vec![vec!["choco", "install", "python", "-y"]],
            )),
            Box::new(PackageManagerStrategy::new(
                "Scoop",
                "scoop",
                false,
                vec![vec!["scoop", "install", "python"]],
            )),
        ],
        _ => vec![
            Box::new(PackageManagerStrategy::new(
                "apt",
                "apt-get",
                true,
                vec![
                    vec!["apt-get", "update"],
                    vec!["apt-get", "install", "-y", "python3", "python3-pip"],
                ],
            )),
            Box::new(PackageManagerStrategy::new(
                "dnf",
                "dnf",
                true,
                vec![vec!["dnf", "install", "-y", "python3", "python3-pip"]],
            )),
            Box::new(PackageManagerStrategy::new(
                "yum",
                "yum",
                true,
                vec![vec!["yum", "install", "-y", "python3", "python3-pip"]],
            )),
            Box::new(PackageManagerStrategy::new(
                "pacman",
                "pacman",
                true,
                vec![vec!["pacman", "-S", "--noconfirm", "python", "python-pip"]],
            )),
            Box::new(PackageManagerStrategy::new(
                "zypper",
                "zypper",
                true,
                vec![vec!["zypper", "--non-interactive", "install", "python3", "python3-pip"]],
            )),
        ],
    }
}
