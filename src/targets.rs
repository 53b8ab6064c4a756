//! Agent targets
//!
//! The built-in catalog of agent integration directories, selection by key,
//! and de-duplication of targets that share one physical install path.

use std::path::{Path, PathBuf};

use crate::config::{expand_home_in, home_dir};
use crate::error::{Error, Result};

/// One agent integration point skills can be installed into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentTarget {
    /// Unique key used on the command line
    pub key: String,
    /// Human-readable name
    pub display_name: String,
    /// Directory skills are copied into
    pub install_path: PathBuf,
}

impl AgentTarget {
    pub fn new(key: impl Into<String>, display_name: impl Into<String>, install_path: impl Into<PathBuf>) -> Self {
        AgentTarget {
            key: key.into(),
            display_name: display_name.into(),
            install_path: install_path.into(),
        }
    }
}

const BUILTIN: &[(&str, &str, &str)] = &[
    ("claude", "Claude Code", "~/.claude/skills"),
    ("codex", "Codex CLI", "~/.codex/skills"),
    ("gemini", "Gemini CLI", "~/.gemini/skills"),
    ("cursor", "Cursor", "~/.cursor/skills"),
    // OpenCode reads Claude-compatible skills from the same directory
    ("opencode", "OpenCode", "~/.claude/skills"),
];

/// The built-in target catalog, resolved against the user's home
pub fn builtin_targets() -> Vec<AgentTarget> {
    builtin_targets_in(&home_dir())
}

/// The built-in target catalog, resolved against `home`
pub fn builtin_targets_in(home: &Path) -> Vec<AgentTarget> {
    BUILTIN
        .iter()
        .map(|(key, name, path)| AgentTarget::new(*key, *name, expand_home_in(path, home)))
        .collect()
}

/// Pick targets by key, in catalog order
///
/// The literal key `all` selects every target. Unknown keys are an error.
pub fn select_by_keys(catalog: &[AgentTarget], keys: &[String]) -> Result<Vec<AgentTarget>> {
    if keys.iter().any(|k| k.eq_ignore_ascii_case("all")) {
        return Ok(catalog.to_vec());
    }

    if let Some(unknown) = keys.iter().find(|k| !catalog.iter().any(|t| t.key == **k)) {
        let known: Vec<&str> = catalog.iter().map(|t| t.key.as_str()).collect();
        return Err(Error::InvalidInput(format!(
            "unknown target '{}' (expected one of: {}, all)",
            unknown,
            known.join(", ")
        )));
    }

    Ok(catalog
        .iter()
        .filter(|t| keys.contains(&t.key))
        .cloned()
        .collect())
}

/// A physical install location and every selected target pointing at it
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub path: PathBuf,
    pub targets: Vec<AgentTarget>,
}

impl InstallPlan {
    /// Display names of every target sharing this path
    pub fn display_names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.display_name.as_str()).collect()
    }
}

/// Group selected targets by install path, preserving first-seen order
pub fn plan_installs(selection: &[AgentTarget]) -> Vec<InstallPlan> {
    let mut plans: Vec<InstallPlan> = Vec::new();

    for target in selection {
        match plans.iter_mut().find(|p| p.path == target.install_path) {
            Some(plan) => plan.targets.push(target.clone()),
            None => plans.push(InstallPlan {
                path: target.install_path.clone(),
                targets: vec![target.clone()],
            }),
        }
    }

    plans
}
