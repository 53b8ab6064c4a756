//! Environment configuration wizard
//!
//! Walks the grouped variable catalog, asks for anything not already set,
//! then offers to save what was entered. Prompts for a gated variable only
//! appear once its sibling has a value.

mod catalog;
mod persist;

use console::style;
use secrecy::SecretString;

pub use catalog::{builtin_catalog, EnvGroup, EnvVarSpec};
pub use persist::{
    append_block, quote_posix, quote_powershell, render_manual_block, render_profile_block, set_user_environment,
    ProfileTarget,
};

use crate::error::Result;
use crate::prompt::Prompter;
use crate::runtime::CommandRunner;
use crate::ui;

/// What happened to one variable during the prompt pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarStatus {
    AlreadySet,
    Provided,
    Skipped,
    SkippedRequired,
    /// Its sibling had no value so it was never asked
    Gated,
}

/// Per-variable results of the prompt pass, in catalog order
#[derive(Debug, Default, Clone)]
pub struct WizardReport {
    pub entries: Vec<(String, VarStatus)>,
}

impl WizardReport {
    fn count(&self, status: VarStatus) -> usize {
        self.entries.iter().filter(|(_, s)| *s == status).count()
    }

    pub fn provided(&self) -> usize {
        self.count(VarStatus::Provided)
    }

    pub fn already_set(&self) -> usize {
        self.count(VarStatus::AlreadySet)
    }

    pub fn skipped_required(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, s)| *s == VarStatus::SkippedRequired)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    pub fn status_of(&self, name: &str) -> Option<VarStatus> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| *s)
    }
}

/// Where the entered values ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved(ProfileTarget),
    /// Saved, except for the listed names
    PartiallySaved { target: ProfileTarget, failed: Vec<String> },
    Printed,
    Discarded,
    NothingToSave,
}

/// The wizard's overall result for the run summary
#[derive(Debug, Clone)]
pub enum WizardOutcome {
    Completed { report: WizardReport, persisted: PersistOutcome },
    Skipped,
}

type EnvLookup<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;

pub struct ConfigWizard<'a> {
    groups: Vec<EnvGroup>,
    lookup: EnvLookup<'a>,
    target: ProfileTarget,
    os: String,
}

impl<'a> ConfigWizard<'a> {
    /// Wizard over the built-in catalog reading the process environment
    pub fn new(target: ProfileTarget) -> Self {
        ConfigWizard {
            groups: builtin_catalog(),
            lookup: Box::new(|name| std::env::var(name).ok()),
            target,
            os: std::env::consts::OS.to_string(),
        }
    }

    /// Replace the environment lookup
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        self.lookup = Box::new(lookup);
        self
    }

    pub fn with_groups(mut self, groups: Vec<EnvGroup>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_os(mut self, os: &str) -> Self {
        self.os = os.to_string();
        self
    }

    /// Prompt pass then persistence
    pub async fn run(&mut self, prompter: &mut dyn Prompter, runner: &dyn CommandRunner) -> Result<WizardOutcome> {
        let report = self.collect(prompter)?;
        let persisted = self.persist(prompter, runner).await?;
        Ok(WizardOutcome::Completed { report, persisted })
    }

    /// Ask for every unset variable whose gate is open
    pub fn collect(&mut self, prompter: &mut dyn Prompter) -> Result<WizardReport> {
        let mut report = WizardReport::default();

        for group in &mut self.groups {
            println!("\n  {}", style(group.title).bold());

            for i in 0..group.vars.len() {
                let gate_open = match group.vars[i].requires {
                    Some(sibling) => group.vars.iter().any(|v| v.name == sibling && v.has_value()),
                    None => true,
                };

                let var = &mut group.vars[i];
                var.current_value = (self.lookup)(var.name).filter(|v| !v.trim().is_empty());

                let status = if var.current_value.is_some() {
                    ui::success(format!("{} already set", var.name));
                    VarStatus::AlreadySet
                } else if !gate_open {
                    tracing::debug!("{} skipped, {} has no value", var.name, var.requires.unwrap_or_default());
                    VarStatus::Gated
                } else {
                    ask(prompter, var)?
                };
                report.entries.push((var.name.to_string(), status));
            }
        }

        Ok(report)
    }

    /// Offer to save, print, or discard the values entered in `collect`
    pub async fn persist(&mut self, prompter: &mut dyn Prompter, runner: &dyn CommandRunner) -> Result<PersistOutcome> {
        let provided: Vec<(&'static str, SecretString)> = self
            .groups
            .iter_mut()
            .flat_map(|g| g.vars.iter_mut())
            .filter_map(|v| v.provided_value.take().map(|value| (v.name, value)))
            .collect();

        if provided.is_empty() {
            ui::info("Nothing was configured");
            return Ok(PersistOutcome::NothingToSave);
        }
        let entries: Vec<(&str, &SecretString)> = provided.iter().map(|(n, v)| (*n, v)).collect();

        let save_label = format!("Save to {}", self.target.describe());
        let choices = [save_label.as_str(), "Print for manual setup", "Discard"];
        let choice = prompter.choose(
            &format!("{} value(s) entered. What should happen to them?", entries.len()),
            &choices,
            0,
        )?;

        match choice {
            0 => self.save(&entries, runner).await,
            1 => {
                println!("\n{}\n", render_manual_block(&entries, &self.os));
                Ok(PersistOutcome::Printed)
            }
            _ => {
                ui::info("Discarded the entered values");
                Ok(PersistOutcome::Discarded)
            }
        }
    }

    async fn save(&self, entries: &[(&str, &SecretString)], runner: &dyn CommandRunner) -> Result<PersistOutcome> {
        match &self.target {
            ProfileTarget::ShellProfile(path) => {
                let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
                append_block(path, &render_profile_block(entries, &stamp))?;
                ui::success(format!("Saved {} variable(s) to {}", entries.len(), path.display()));
                ui::info(format!("Run `source {}` or open a new shell to use them", path.display()));
                Ok(PersistOutcome::Saved(self.target.clone()))
            }
            ProfileTarget::UserEnvironment => {
                let failed = set_user_environment(runner, entries).await;
                if failed.is_empty() {
                    ui::success(format!("Saved {} variable(s) to the user environment", entries.len()));
                    ui::info("Open a new terminal to use them");
                    Ok(PersistOutcome::Saved(self.target.clone()))
                } else {
                    ui::warn(format!("Could not save: {}", failed.join(", ")));
                    Ok(PersistOutcome::PartiallySaved {
                        target: self.target.clone(),
                        failed,
                    })
                }
            }
        }
    }
}

fn ask(prompter: &mut dyn Prompter, var: &mut EnvVarSpec) -> Result<VarStatus> {
    if let Some(url) = var.reference_url {
        println!("    {}", style(format!("see {}", url)).dim());
    }

    let message = format!("{} ({})", var.name, var.description);
    let answer = if var.secret {
        prompter.secret(&message)?
    } else {
        prompter.input(&message)?
    };
    let answer = answer.trim();

    if !answer.is_empty() {
        var.provided_value = Some(SecretString::from(answer.to_string()));
        return Ok(VarStatus::Provided);
    }
    if var.optional {
        Ok(VarStatus::Skipped)
    } else {
        ui::warn(format!("{} skipped (required)", var.name));
        Ok(VarStatus::SkippedRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use crate::error::Error;
    use crate::prompt::Interruptible;
    use crate::test_support::{FakeRunner, ScriptedPrompter};

    fn mysql_only() -> Vec<EnvGroup> {
        builtin_catalog().into_iter().filter(|g| g.title == "MySQL").collect()
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn wizard_with<'a>(vars: &'a HashMap<String, String>, target: ProfileTarget) -> ConfigWizard<'a> {
        ConfigWizard::new(target)
            .with_groups(mysql_only())
            .with_lookup(move |name| vars.get(name).cloned())
    }

    fn profile_in(dir: &tempfile::TempDir) -> ProfileTarget {
        ProfileTarget::ShellProfile(dir.path().join(".profile"))
    }

    #[test]
    fn test_set_variable_is_never_prompted() {
        let dir = tempdir().unwrap();
        let vars = env(&[("MYSQL_HOST", "db.local")]);
        let mut wizard = wizard_with(&vars, profile_in(&dir));
        let mut prompter = ScriptedPrompter::with_answers(&["3306", "root", "pw"]);

        let report = wizard.collect(&mut prompter).unwrap();

        assert!(!prompter.was_asked("MYSQL_HOST"));
        assert_eq!(report.status_of("MYSQL_HOST"), Some(VarStatus::AlreadySet));
        assert!(prompter.was_asked("MYSQL_PASSWORD"));
        assert_eq!(report.provided(), 3);
    }

    #[test]
    fn test_empty_host_closes_the_gate() {
        let dir = tempdir().unwrap();
        let vars = env(&[]);
        let mut wizard = wizard_with(&vars, profile_in(&dir));
        let mut prompter = ScriptedPrompter::with_answers(&[""]);

        let report = wizard.collect(&mut prompter).unwrap();

        assert_eq!(prompter.asked.len(), 1);
        assert!(!prompter.was_asked("MYSQL_PASSWORD"));
        assert_eq!(report.status_of("MYSQL_PASSWORD"), Some(VarStatus::Gated));
        assert!(report.skipped_required().is_empty());
    }

    #[test]
    fn test_required_skip_is_recorded() {
        let dir = tempdir().unwrap();
        let vars = env(&[]);
        let mut wizard = wizard_with(&vars, profile_in(&dir));
        let mut prompter = ScriptedPrompter::with_answers(&["db.local", "", "", ""]);

        let report = wizard.collect(&mut prompter).unwrap();

        assert_eq!(report.status_of("MYSQL_PORT"), Some(VarStatus::Skipped));
        assert_eq!(report.skipped_required(), vec!["MYSQL_PASSWORD"]);
    }

    #[test]
    fn test_blank_env_value_counts_as_unset() {
        let dir = tempdir().unwrap();
        let vars = env(&[("MYSQL_HOST", "  ")]);
        let mut wizard = wizard_with(&vars, profile_in(&dir));
        let mut prompter = ScriptedPrompter::with_answers(&[""]);

        wizard.collect(&mut prompter).unwrap();

        assert!(prompter.was_asked("MYSQL_HOST"));
    }

    #[tokio::test]
    async fn test_nothing_entered_offers_no_choice() {
        let dir = tempdir().unwrap();
        let vars = env(&[]);
        let mut wizard = wizard_with(&vars, profile_in(&dir));
        let mut prompter = ScriptedPrompter::with_answers(&[]);
        let runner = FakeRunner::new();

        let outcome = wizard.run(&mut prompter, &runner).await.unwrap();

        match outcome {
            WizardOutcome::Completed { persisted, .. } => assert_eq!(persisted, PersistOutcome::NothingToSave),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(prompter.asked.len(), 1);
        assert!(!dir.path().join(".profile").exists());
    }

    #[tokio::test]
    async fn test_save_appends_profile_block() {
        let dir = tempdir().unwrap();
        let vars = env(&[]);
        let mut wizard = wizard_with(&vars, profile_in(&dir));
        let mut prompter = ScriptedPrompter::with_answers(&["db.local", "", "admin", "s3cr'et"]).choosing(&[0]);
        let runner = FakeRunner::new();

        wizard.collect(&mut prompter).unwrap();
        let persisted = wizard.persist(&mut prompter, &runner).await.unwrap();

        assert_eq!(persisted, PersistOutcome::Saved(profile_in(&dir)));
        let content = std::fs::read_to_string(dir.path().join(".profile")).unwrap();
        assert!(content.contains("export MYSQL_HOST='db.local'"));
        assert!(content.contains("export MYSQL_USERNAME='admin'"));
        assert!(content.contains(r"export MYSQL_PASSWORD='s3cr'\''et'"));
        assert!(!content.contains("MYSQL_PORT"));
    }

    #[tokio::test]
    async fn test_values_are_consumed_once() {
        let dir = tempdir().unwrap();
        let vars = env(&[]);
        let mut wizard = wizard_with(&vars, profile_in(&dir));
        let mut prompter = ScriptedPrompter::with_answers(&["db.local"]).choosing(&[2]);
        let runner = FakeRunner::new();

        wizard.collect(&mut prompter).unwrap();
        assert_eq!(wizard.persist(&mut prompter, &runner).await.unwrap(), PersistOutcome::Discarded);
        assert_eq!(
            wizard.persist(&mut prompter, &runner).await.unwrap(),
            PersistOutcome::NothingToSave
        );
    }

    #[tokio::test]
    async fn test_windows_save_uses_setx() {
        let vars = env(&[("MYSQL_HOST", "db")]);
        let mut wizard = wizard_with(&vars, ProfileTarget::UserEnvironment).with_os("windows");
        let mut prompter = ScriptedPrompter::with_answers(&["", "", "pw"]).choosing(&[0]);
        let runner = FakeRunner::new().with_programs(&["setx"]);

        wizard.run(&mut prompter, &runner).await.unwrap();

        assert_eq!(runner.calls(), vec!["setx MYSQL_PASSWORD pw"]);
    }

    /// Answers from a script; Ctrl-C arrives while the password is being typed
    struct CtrlCDuringSecret {
        scripted: ScriptedPrompter,
        flag: Arc<AtomicBool>,
    }

    impl Prompter for CtrlCDuringSecret {
        fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
            self.scripted.confirm(message, default)
        }

        fn input(&mut self, message: &str) -> Result<String> {
            self.scripted.input(message)
        }

        fn secret(&mut self, _message: &str) -> Result<String> {
            self.flag.store(true, Ordering::SeqCst);
            Ok("pw".into())
        }

        fn choose(&mut self, message: &str, items: &[&str], default: usize) -> Result<usize> {
            self.scripted.choose(message, items, default)
        }
    }

    #[tokio::test]
    async fn test_ctrl_c_mid_wizard_saves_nothing() {
        let dir = tempdir().unwrap();
        let vars = env(&[]);
        let mut wizard = wizard_with(&vars, profile_in(&dir));
        let flag = Arc::new(AtomicBool::new(false));
        let mut inner = CtrlCDuringSecret {
            scripted: ScriptedPrompter::with_answers(&["db.local", "3306", "admin"]).choosing(&[0]),
            flag: flag.clone(),
        };
        let mut prompter = Interruptible::new(&mut inner, flag);
        let runner = FakeRunner::new();

        let result = wizard.run(&mut prompter, &runner).await;

        assert!(matches!(result, Err(Error::Interrupted)));
        assert!(!dir.path().join(".profile").exists());
        assert!(runner.calls().is_empty());
    }
}
