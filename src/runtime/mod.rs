//! Python runtime bootstrap
//!
//! Finds a Python 3 interpreter with pip, offers to install one through
//! the OS package-manager cascade when none is found, then installs the
//! skills' Python dependencies. Nothing here aborts the run: a missing
//! runtime degrades it, failed packages are warnings.

mod command;
mod strategy;

use std::path::Path;

pub use command::{args, CommandOutput, CommandRunner, SystemRunner};
pub use strategy::{default_strategies, PackageManagerStrategy, RuntimeInstallStrategy};

use crate::archive::ArchiveFetcher;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::ui;

/// Where to send people when automatic installation is impossible
pub const MANUAL_INSTALL_HINT: &str =
    "Install Python 3 with pip from https://www.python.org/downloads/ and re-run the installer";

/// A usable interpreter and its package installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeHandle {
    /// Interpreter invocation, e.g. `["py", "-3"]`
    pub interpreter: Vec<String>,
    /// Package installer invocation, e.g. `["python3", "-m", "pip"]`
    pub package_manager: Vec<String>,
    /// Reported version, e.g. `3.12.1`
    pub version: String,
}

impl RuntimeHandle {
    pub fn interpreter_command(&self) -> String {
        self.interpreter.join(" ")
    }

    pub fn package_manager_command(&self) -> String {
        self.package_manager.join(" ")
    }
}

/// Per-package result of installing dependencies
#[derive(Debug, Clone, Default)]
pub struct DependencyReport {
    pub installed: Vec<String>,
    pub failed: Vec<String>,
}

/// What happened to dependencies after a runtime was found
#[derive(Debug, Clone)]
pub enum DependencyStatus {
    Installed(DependencyReport),
    /// No dependency manifest could be obtained
    ManifestUnavailable,
}

/// Result of the whole bootstrap step
#[derive(Debug, Clone)]
pub enum RuntimeOutcome {
    Ready {
        handle: RuntimeHandle,
        dependencies: DependencyStatus,
    },
    /// No runtime; skills needing Python will not work until fixed
    Degraded { reason: String },
    /// Bootstrap was not requested for this run
    Skipped,
}

/// Interpreter invocations to try, in order
pub fn interpreter_candidates(os: &str) -> Vec<Vec<&'static str>> {
    match os {
        "windows" => vec![vec!["py", "-3"], vec!["python"], vec!["python3"]],
        _ => vec![vec!["python3"], vec!["python"]],
    }
}

/// Extract `X.Y.Z` from `Python X.Y.Z` output
pub fn parse_python_version(output: &str) -> Option<(u32, String)> {
    let rest = output
        .lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("Python "))?;
    let version = rest.split_whitespace().next()?.to_string();
    let major = version.split('.').next()?.parse().ok()?;
    Some((major, version))
}

/// Requirement specifiers from a requirements file
///
/// Comments, blank lines and pip options (`-r`, `--index-url`, ...) are dropped.
pub fn parse_requirements(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split(" #").next().unwrap_or(line).trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .map(str::to_string)
        .collect()
}

/// Detects or installs Python and installs skill dependencies
pub struct RuntimeBootstrapper<'a> {
    runner: &'a dyn CommandRunner,
    candidates: Vec<Vec<&'static str>>,
    strategies: Vec<Box<dyn RuntimeInstallStrategy>>,
    assume_yes: bool,
}

impl<'a> RuntimeBootstrapper<'a> {
    /// Bootstrapper for the given OS (`std::env::consts::OS` values)
    pub fn new(runner: &'a dyn CommandRunner, os: &str) -> Self {
        RuntimeBootstrapper {
            runner,
            candidates: interpreter_candidates(os),
            strategies: default_strategies(os),
            assume_yes: false,
        }
    }

    /// Install without asking
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    /// Try candidates; the first Python 3 with pip wins
    pub async fn detect(&self) -> Option<RuntimeHandle> {
        for candidate in &self.candidates {
            let Some((program, rest)) = candidate.split_first() else {
                continue;
            };

            let mut version_check = args(rest);
            version_check.push("--version".to_string());
            let output = match self.runner.run(program, &version_check).await {
                Ok(output) if output.success => output,
                _ => continue,
            };

            let Some((major, version)) = parse_python_version(&output.combined()) else {
                continue;
            };
            if major != 3 {
                tracing::debug!("{} is Python {}, need 3.x", candidate.join(" "), version);
                continue;
            }

            let interpreter = args(candidate);
            match self.find_pip(&interpreter).await {
                Some(package_manager) => {
                    return Some(RuntimeHandle {
                        interpreter,
                        package_manager,
                        version,
                    })
                }
                None => tracing::debug!("{} has no pip", candidate.join(" ")),
            }
        }
        None
    }

    async fn find_pip(&self, interpreter: &[String]) -> Option<Vec<String>> {
        let (program, rest) = interpreter.split_first()?;
        let pip: Vec<String> = rest.iter().cloned().chain(args(&["-m", "pip"])).collect();

        let mut version = pip.clone();
        version.push("--version".to_string());
        if self.pip_ok(program, &version).await {
            return Some(interpreter.iter().cloned().chain(args(&["-m", "pip"])).collect());
        }

        // Some distributions ship Python without pip but with ensurepip
        let ensure: Vec<String> = rest.iter().cloned().chain(args(&["-m", "ensurepip", "--upgrade"])).collect();
        if self.pip_ok(program, &ensure).await && self.pip_ok(program, &version).await {
            return Some(interpreter.iter().cloned().chain(args(&["-m", "pip"])).collect());
        }
        None
    }

    async fn pip_ok(&self, program: &str, arguments: &[String]) -> bool {
        matches!(self.runner.run(program, arguments).await, Ok(output) if output.success)
    }

    /// Detect a runtime, installing one through the cascade if allowed
    pub async fn ensure(&self, prompter: &mut dyn Prompter) -> Result<RuntimeHandle> {
        if let Some(handle) = self.detect().await {
            ui::success(format!("Python {} ({})", handle.version, handle.interpreter_command()));
            return Ok(handle);
        }

        ui::warn("Python 3 with pip was not found");
        let approved = self.assume_yes
            || match prompter.confirm("Install Python 3 automatically?", true) {
                Ok(answer) => answer,
                Err(Error::Interrupted) => return Err(Error::Interrupted),
                Err(e) => {
                    tracing::debug!("Install prompt failed: {}", e);
                    false
                }
            };
        if !approved {
            return Err(Error::RuntimeUnavailable("automatic installation declined".into()));
        }

        for strategy in &self.strategies {
            if !strategy.detect(self.runner) {
                tracing::debug!("{} not available", strategy.name());
                continue;
            }

            ui::info(format!("Installing Python with {}...", strategy.name()));
            match strategy.attempt(self.runner).await {
                Ok(()) => match self.detect().await {
                    Some(handle) => {
                        ui::success(format!("Python {} installed via {}", handle.version, strategy.name()));
                        return Ok(handle);
                    }
                    None => ui::warn(format!(
                        "{} finished but Python 3 is still not on PATH",
                        strategy.name()
                    )),
                },
                Err(e) => ui::warn(format!("{}: {}", strategy.name(), e)),
            }
        }

        Err(Error::RuntimeUnavailable("no install strategy succeeded".into()))
    }

    /// Install each requirement separately so one bad package can't block the rest
    pub async fn install_dependencies(&self, handle: &RuntimeHandle, requirements: &[String]) -> DependencyReport {
        let mut report = DependencyReport::default();
        let Some((program, rest)) = handle.package_manager.split_first() else {
            report.failed = requirements.to_vec();
            return report;
        };

        for requirement in requirements {
            let mut install: Vec<String> = rest.to_vec();
            install.extend(args(&["install", "--user", "--quiet"]));
            install.push(requirement.clone());

            match self.runner.run(program, &install).await {
                Ok(output) if output.success => report.installed.push(requirement.clone()),
                Ok(output) => {
                    tracing::debug!("pip install {} failed: {}", requirement, output.combined());
                    report.failed.push(requirement.clone());
                }
                Err(e) => {
                    tracing::debug!("pip install {} failed: {}", requirement, e);
                    report.failed.push(requirement.clone());
                }
            }
        }
        report
    }

    /// Full bootstrap: runtime, then dependencies
    ///
    /// The dependency manifest is taken from the first of `requirement_urls`
    /// that answers, then from `bundled_manifest` inside the downloaded bundle.
    pub async fn bootstrap(
        &self,
        prompter: &mut dyn Prompter,
        fetcher: &ArchiveFetcher,
        requirement_urls: &[String],
        bundled_manifest: Option<&Path>,
    ) -> Result<RuntimeOutcome> {
        let handle = match self.ensure(prompter).await {
            Ok(handle) => handle,
            Err(Error::Interrupted) => return Err(Error::Interrupted),
            Err(e) => {
                ui::warn(format!("{}. Skills that need Python will not run.", e));
                ui::info(MANUAL_INSTALL_HINT);
                return Ok(RuntimeOutcome::Degraded { reason: e.to_string() });
            }
        };

        let manifest = match fetcher.fetch_text(requirement_urls).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!("Remote requirements unavailable: {}", e);
                bundled_manifest.and_then(|p| std::fs::read_to_string(p).ok())
            }
        };
        let Some(manifest) = manifest else {
            ui::warn("No dependency manifest found; skipping Python packages");
            return Ok(RuntimeOutcome::Ready {
                handle,
                dependencies: DependencyStatus::ManifestUnavailable,
            });
        };

        let requirements = parse_requirements(&manifest);
        ui::info(format!("Installing {} Python packages...", requirements.len()));
        let report = self.install_dependencies(&handle, &requirements).await;

        if report.failed.is_empty() {
            ui::success(format!("{} Python packages installed", report.installed.len()));
        } else {
            ui::warn(format!(
                "{} of {} Python packages failed: {}",
                report.failed.len(),
                requirements.len(),
                report.failed.join(", ")
            ));
            ui::info(format!(
                "Install them manually: {} install --user {}",
                handle.package_manager_command(),
                report.failed.join(" ")
            ));
        }

        Ok(RuntimeOutcome::Ready {
            handle,
            dependencies: DependencyStatus::Installed(report),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use crate::prompt::Interruptible;
    use crate::test_support::{FakeRunner, ScriptedPrompter};

    const PY3: &str = "Python 3.12.1";

    #[test]
    fn test_parse_python_version() {
        assert_eq!(parse_python_version("Python 3.12.1\n"), Some((3, "3.12.1".into())));
        assert_eq!(parse_python_version("Python 2.7.18"), Some((2, "2.7.18".into())));
        assert_eq!(parse_python_version("command not found"), None);
    }

    #[test]
    fn test_parse_requirements() {
        let reqs = parse_requirements("# deps\nrequests>=2.31\n\n-r other.txt\npyotp # totp\n--index-url x\n");
        assert_eq!(reqs, vec!["requests>=2.31", "pyotp"]);
    }

    #[tokio::test]
    async fn test_detect_skips_python2() {
        let runner = FakeRunner::new()
            .responding("python3 --version", false, "")
            .responding("python --version", true, "Python 2.7.18");
        let boot = RuntimeBootstrapper::new(&runner, "linux");

        assert!(boot.detect().await.is_none());
    }

    #[tokio::test]
    async fn test_detect_first_python3_with_pip() {
        let runner = FakeRunner::new()
            .responding("python3 --version", true, PY3)
            .responding("python3 -m pip --version", true, "pip 24.0");
        let boot = RuntimeBootstrapper::new(&runner, "linux");

        let handle = boot.detect().await.unwrap();
        assert_eq!(handle.interpreter_command(), "python3");
        assert_eq!(handle.package_manager_command(), "python3 -m pip");
        assert_eq!(handle.version, "3.12.1");
    }

    #[tokio::test]
    async fn test_windows_launcher() {
        let runner = FakeRunner::new()
            .responding("py -3 --version", true, PY3)
            .responding("py -3 -m pip --version", true, "pip 24.0");
        let boot = RuntimeBootstrapper::new(&runner, "windows");

        let handle = boot.detect().await.unwrap();
        assert_eq!(handle.package_manager, vec!["py", "-3", "-m", "pip"]);
    }

    #[tokio::test]
    async fn test_ensurepip_recovers_missing_pip() {
        let runner = FakeRunner::new()
            .responding("python3 --version", true, PY3)
            .responding("python3 -m pip --version", false, "")
            .responding("python3 -m pip --version", true, "pip 24.0")
            .responding("python3 -m ensurepip --upgrade", true, "");
        let boot = RuntimeBootstrapper::new(&runner, "linux");

        assert!(boot.detect().await.is_some());
        assert!(runner.calls().contains(&"python3 -m ensurepip --upgrade".to_string()));
    }

    #[tokio::test]
    async fn test_decline_degrades_without_running_strategies() {
        let runner = FakeRunner::new().with_programs(&["apt-get"]);
        let mut prompter = ScriptedPrompter::default().confirming(&[false]);
        let boot = RuntimeBootstrapper::new(&runner, "linux");

        let err = boot.ensure(&mut prompter).await.unwrap_err();

        assert!(matches!(err, Error::RuntimeUnavailable(_)));
        assert!(!runner.calls().iter().any(|c| c.contains("apt-get")));
    }

    #[tokio::test]
    async fn test_cascade_continues_after_failure() {
        // apt fails, dnf succeeds and Python appears afterwards
        let runner = FakeRunner::new()
            .with_programs(&["apt-get", "dnf"])
            .failing("apt-get update")
            .responding("python3 --version", false, "")
            .responding("python3 --version", true, PY3)
            .responding("python3 -m pip --version", true, "pip 24.0");
        let mut prompter = ScriptedPrompter::default();
        let boot = RuntimeBootstrapper::new(&runner, "linux").assume_yes(true);

        let handle = boot.ensure(&mut prompter).await.unwrap();

        assert_eq!(handle.version, "3.12.1");
        let calls = runner.calls();
        assert!(calls.contains(&"apt-get update".to_string()));
        assert!(calls.contains(&"dnf install -y python3 python3-pip".to_string()));
        assert!(prompter.asked.is_empty());
    }

    #[tokio::test]
    async fn test_all_strategies_fail() {
        let runner = FakeRunner::new()
            .with_programs(&["brew"])
            .failing("brew install python@3");
        let mut prompter = ScriptedPrompter::default().confirming(&[true]);
        let boot = RuntimeBootstrapper::new(&runner, "macos");

        assert!(boot.ensure(&mut prompter).await.is_err());
    }

    #[tokio::test]
    async fn test_partial_dependency_failure() {
        let runner = FakeRunner::new()
            .with_programs(&["python3"])
            .failing("python3 -m pip install --user --quiet broken-pkg");
        let boot = RuntimeBootstrapper::new(&runner, "linux");
        let handle = RuntimeHandle {
            interpreter: args(&["python3"]),
            package_manager: args(&["python3", "-m", "pip"]),
            version: "3.12.1".into(),
        };

        let report = boot
            .install_dependencies(&handle, &["requests".into(), "broken-pkg".into(), "pyotp".into()])
            .await;

        assert_eq!(report.installed, vec!["requests", "pyotp"]);
        assert_eq!(report.failed, vec!["broken-pkg"]);
    }

    #[tokio::test]
    async fn test_bootstrap_uses_bundled_manifest_when_remote_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/requirements.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let bundled = dir.path().join("requirements.txt");
        std::fs::write(&bundled, "requests\n").unwrap();

        let runner = FakeRunner::new()
            .with_programs(&["python3"])
            .responding("python3 --version", true, PY3);
        let mut prompter = ScriptedPrompter::default();
        let boot = RuntimeBootstrapper::new(&runner, "linux");
        let fetcher = ArchiveFetcher::new(Client::new());
        let urls = vec![format!("{}/requirements.txt", server.uri())];

        let outcome = boot.bootstrap(&mut prompter, &fetcher, &urls, Some(&bundled)).await.unwrap();

        match outcome {
            RuntimeOutcome::Ready {
                dependencies: DependencyStatus::Installed(report),
                ..
            } => assert_eq!(report.installed, vec!["requests"]),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bootstrap_degrades_when_runtime_missing() {
        let runner = FakeRunner::new();
        let mut prompter = ScriptedPrompter::default().confirming(&[false]);
        let boot = RuntimeBootstrapper::new(&runner, "linux");
        let fetcher = ArchiveFetcher::new(Client::new());

        let outcome = boot.bootstrap(&mut prompter, &fetcher, &[], None).await.unwrap();

        assert!(matches!(outcome, RuntimeOutcome::Degraded { .. }));
    }

    #[tokio::test]
    async fn test_ctrl_c_at_install_prompt_stops_run() {
        let runner = FakeRunner::new().with_programs(&["apt-get"]);
        let flag = Arc::new(AtomicBool::new(true));
        let mut scripted = ScriptedPrompter::default().confirming(&[true]);
        let mut prompter = Interruptible::new(&mut scripted, flag);
        let boot = RuntimeBootstrapper::new(&runner, "linux");
        let fetcher = ArchiveFetcher::new(Client::new());

        let result = boot.bootstrap(&mut prompter, &fetcher, &[], None).await;

        assert!(matches!(result, Err(Error::Interrupted)));
        assert!(!runner.calls().iter().any(|c| c.contains("apt-get")));
    }
}
