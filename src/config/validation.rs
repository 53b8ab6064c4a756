//! Checks run on the layered configuration before any network access

use std::fmt;

use url::Url;

use super::types::InstallerConfig;
use crate::targets::AgentTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The run cannot start
    Error,
    /// Reported, then ignored
    Warning,
}

/// One problem with a config field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted field name, e.g. `source.base_url`
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigReport {
    pub issues: Vec<ConfigIssue>,
}

impl ConfigReport {
    fn push(&mut self, severity: Severity, field: &'static str, message: impl Into<String>) {
        self.issues.push(ConfigIssue {
            severity,
            field,
            message: message.into(),
        });
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }
}

/// Check the source location and the configured target keys
pub fn validate_config(config: &InstallerConfig, targets: &[AgentTarget]) -> ConfigReport {
    let mut report = ConfigReport::default();
    check_source(config, &mut report);
    check_targets(config, targets, &mut report);
    report
}

fn check_http_url(report: &mut ConfigReport, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => report.push(
            Severity::Error,
            field,
            format!("Unsupported scheme '{}' in {}", url.scheme(), value),
        ),
        Err(_) => report.push(Severity::Error, field, format!("Not a valid URL: {}", value)),
    }
}

fn check_source(config: &InstallerConfig, report: &mut ConfigReport) {
    let source = &config.source;

    // An explicit base URL replaces host, project and branch entirely
    if let Some(base) = &source.base_url {
        check_http_url(report, "source.base_url", base);
        return;
    }

    check_http_url(report, "source.host", &source.host);
    if source.project.trim_matches('/').is_empty() {
        report.push(Severity::Error, "source.project", "Project path is empty");
    }
    if source.branch.trim().is_empty() {
        report.push(Severity::Error, "source.branch", "Branch is empty");
    }
}

fn check_targets(config: &InstallerConfig, targets: &[AgentTarget], report: &mut ConfigReport) {
    let unknown = config
        .install
        .targets
        .iter()
        .filter(|key| !key.eq_ignore_ascii_case("all"))
        .filter(|key| !targets.iter().any(|t| t.key == key.as_str()));
    for key in unknown {
        report.push(
            Severity::Warning,
            "install.targets",
            format!("Unknown target '{}'", key),
        );
    }
}
