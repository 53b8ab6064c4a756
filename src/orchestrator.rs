//! Run orchestration
//!
//! Resolves which targets to install into, installs once per physical
//! directory, bootstraps the Python runtime, runs the configuration
//! wizard, and summarizes everything. Failures are collected per target;
//! only the summary decides the exit status.

use std::path::PathBuf;

use async_trait::async_trait;
use console::style;
use reqwest::Client;

use crate::archive::ArchiveFetcher;
use crate::catalog::{CatalogSource, SkillCatalog};
use crate::config::{home_dir, ArchiveSource, InstallerConfig};
use crate::error::{Error, Result};
use crate::installer::{InstallReport, SkillInstaller};
use crate::menu;
use crate::prompt::Prompter;
use crate::runtime::{CommandRunner, RuntimeBootstrapper, RuntimeOutcome};
use crate::session::InstallSession;
use crate::targets::{plan_installs, select_by_keys, AgentTarget, InstallPlan};
use crate::ui;
use crate::wizard::{ConfigWizard, PersistOutcome, ProfileTarget, WizardOutcome};

/// Installs a skill list into one physical directory
#[async_trait]
pub trait TargetPipeline: Send {
    async fn install(&mut self, plan: &InstallPlan, skills: &[String]) -> Result<InstallReport>;

    /// `requirements.txt` found inside a downloaded bundle, if any
    fn bundled_requirements(&self) -> Option<PathBuf> {
        None
    }
}

/// Downloads and extracts the bundle into the session, then installs from it
pub struct BundlePipeline<'s> {
    fetcher: ArchiveFetcher,
    sources: Vec<ArchiveSource>,
    session: &'s mut InstallSession,
    bundled_requirements: Option<PathBuf>,
}

impl<'s> BundlePipeline<'s> {
    pub fn new(fetcher: ArchiveFetcher, sources: Vec<ArchiveSource>, session: &'s mut InstallSession) -> Self {
        BundlePipeline {
            fetcher,
            sources,
            session,
            bundled_requirements: None,
        }
    }
}

#[async_trait]
impl TargetPipeline for BundlePipeline<'_> {
    async fn install(&mut self, plan: &InstallPlan, skills: &[String]) -> Result<InstallReport> {
        let work_dir = self.session.work_dir("bundle")?;
        let skills_root = self.fetcher.fetch_and_extract(&self.sources, &work_dir).await?;

        if self.bundled_requirements.is_none() {
            self.bundled_requirements = skills_root
                .parent()
                .map(|top| top.join("requirements.txt"))
                .filter(|p| p.is_file());
        }

        SkillInstaller::new(&skills_root)
            .install(skills, &plan.path)
            .map_err(|e| match e {
                Error::Io(io) => Error::TargetInstall {
                    path: plan.path.clone(),
                    reason: io.to_string(),
                },
                other => other,
            })
    }

    fn bundled_requirements(&self) -> Option<PathBuf> {
        self.bundled_requirements.clone()
    }
}

/// Result for one physical install directory
#[derive(Debug)]
pub struct TargetResult {
    pub path: PathBuf,
    /// Every selected target sharing this directory
    pub names: Vec<String>,
    pub outcome: std::result::Result<InstallReport, String>,
}

/// Everything that happened during a run
#[derive(Debug)]
pub struct RunSummary {
    pub selected: Vec<String>,
    pub catalog_source: Option<CatalogSource>,
    pub targets: Vec<TargetResult>,
    pub runtime: RuntimeOutcome,
    pub wizard: WizardOutcome,
}

impl RunSummary {
    fn nothing_selected() -> Self {
        RunSummary {
            selected: Vec::new(),
            catalog_source: None,
            targets: Vec::new(),
            runtime: RuntimeOutcome::Skipped,
            wizard: WizardOutcome::Skipped,
        }
    }

    pub fn failed_targets(&self) -> usize {
        self.targets.iter().filter(|t| t.outcome.is_err()).count()
    }

    /// 1 when any target failed; missing skills never count
    pub fn exit_code(&self) -> u8 {
        if self.failed_targets() > 0 {
            1
        } else {
            0
        }
    }

    pub fn print(&self) {
        ui::section("Summary");

        if self.selected.is_empty() {
            ui::info("No targets selected; nothing to do");
            return;
        }
        ui::info(format!("Selected: {}", self.selected.join(", ")));
        if self.catalog_source == Some(CatalogSource::Fallback) {
            ui::info("Skill list: built-in (remote manifest unavailable)");
        }

        for target in &self.targets {
            let label = format!("{} ({})", target.path.display(), target.names.join(", "));
            match &target.outcome {
                Ok(report) if report.not_found() == 0 => {
                    ui::success(format!("{}: {} installed", label, report.installed()));
                }
                Ok(report) => ui::warn(format!(
                    "{}: {} installed, {} not found ({})",
                    label,
                    report.installed(),
                    report.not_found(),
                    report.missing().collect::<Vec<_>>().join(", ")
                )),
                Err(reason) => ui::error(format!("{}: {}", label, reason)),
            }
        }

        match &self.runtime {
            RuntimeOutcome::Ready { handle, .. } => {
                ui::success(format!("Python {} ({})", handle.version, handle.interpreter_command()))
            }
            RuntimeOutcome::Degraded { reason } => ui::warn(format!("Python runtime unavailable: {}", reason)),
            RuntimeOutcome::Skipped => ui::info("Python runtime: skipped"),
        }

        match &self.wizard {
            WizardOutcome::Skipped => ui::info("Environment configuration: skipped"),
            WizardOutcome::Completed { report, persisted } => {
                let saved = match persisted {
                    PersistOutcome::Saved(target) | PersistOutcome::PartiallySaved { target, .. } => {
                        format!("saved to {}", target.describe())
                    }
                    PersistOutcome::Printed => "printed".to_string(),
                    PersistOutcome::Discarded => "discarded".to_string(),
                    PersistOutcome::NothingToSave => "nothing new".to_string(),
                };
                ui::info(format!(
                    "Environment: {} already set, {} entered ({})",
                    report.already_set(),
                    report.provided(),
                    saved
                ));
                let skipped = report.skipped_required();
                if !skipped.is_empty() {
                    ui::warn(format!("Required but not set: {}", skipped.join(", ")));
                }
            }
        }

        println!();
        if self.exit_code() == 0 {
            println!("  {}", style("Installation complete").green().bold());
        } else {
            println!(
                "  {}",
                style(format!(
                    "Installation completed with errors ({} target(s) failed)",
                    self.failed_targets()
                ))
                .red()
                .bold()
            );
        }
    }
}

type Selector<'a> = Box<dyn FnMut(&[AgentTarget]) -> Result<Vec<AgentTarget>> + 'a>;

pub struct Orchestrator<'a> {
    config: InstallerConfig,
    targets: Vec<AgentTarget>,
    client: Client,
    prompter: &'a mut dyn Prompter,
    runner: &'a dyn CommandRunner,
    selector: Selector<'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: InstallerConfig,
        targets: Vec<AgentTarget>,
        client: Client,
        prompter: &'a mut dyn Prompter,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Orchestrator {
            config,
            targets,
            client,
            prompter,
            runner,
            selector: Box::new(menu::select_targets),
        }
    }

    /// Replace the interactive target menu
    pub fn with_selector(mut self, selector: impl FnMut(&[AgentTarget]) -> Result<Vec<AgentTarget>> + 'a) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// Print the resolved catalog and its origin
    pub async fn list(&self) -> SkillCatalog {
        let catalog = SkillCatalog::resolve(&self.client, &self.config.source.manifest_url()).await;
        let origin = match catalog.source() {
            CatalogSource::Remote => self.config.source.manifest_url(),
            CatalogSource::Fallback => "built-in list".to_string(),
        };

        println!("{} skills ({}):", catalog.len(), origin);
        for skill in catalog.skills() {
            println!("  {}", skill);
        }
        catalog
    }

    /// The full install run
    ///
    /// Returns `Error::UserCancelled` when the user quit the menu and
    /// `Error::Interrupted` after Ctrl-C at a prompt; every other problem ends
    /// up in the summary.
    pub async fn run(&mut self, session: &mut InstallSession) -> Result<RunSummary> {
        let selection = self.resolve_selection()?;
        if selection.is_empty() {
            return Ok(RunSummary::nothing_selected());
        }

        self.log_sources();
        let catalog = SkillCatalog::resolve(&self.client, &self.config.source.manifest_url()).await;
        let skills = self.requested_skills(&catalog);

        let mut pipeline = BundlePipeline::new(
            ArchiveFetcher::new(self.client.clone()),
            self.config.source.archive_sources(),
            session,
        );
        let targets = self.install_all(&selection, &skills, &mut pipeline).await;
        let bundled_requirements = pipeline.bundled_requirements();

        let runtime = self.bootstrap_runtime(bundled_requirements).await?;
        let wizard = self.configure_environment().await?;

        Ok(RunSummary {
            selected: selection.iter().map(|t| t.display_name.clone()).collect(),
            catalog_source: Some(catalog.source()),
            targets,
            runtime,
            wizard,
        })
    }

    /// Flags and environment first, the menu otherwise
    pub fn resolve_selection(&mut self) -> Result<Vec<AgentTarget>> {
        let options = &self.config.install;

        let selection = if !options.targets.is_empty() {
            select_by_keys(&self.targets, &options.targets)?
        } else if options.non_interactive {
            ui::info("Non-interactive run without targets; installing into all of them");
            self.targets.clone()
        } else {
            ui::section("Select agents");
            (self.selector)(&self.targets)?
        };

        if selection.is_empty() {
            ui::info("No targets selected");
        }
        Ok(selection)
    }

    /// The catalog, or the `--skills` subset of it
    pub fn requested_skills(&self, catalog: &SkillCatalog) -> Vec<String> {
        let requested = &self.config.install.skills;
        if requested.is_empty() {
            return catalog.skills().to_vec();
        }

        let mut skills: Vec<String> = Vec::with_capacity(requested.len());
        for skill in requested {
            if skills.contains(skill) {
                continue;
            }
            if !catalog.contains(skill) {
                ui::warn(format!("{} is not in the skill list; trying anyway", skill));
            }
            skills.push(skill.clone());
        }
        skills
    }

    /// Install into each distinct directory once
    pub async fn install_all(
        &self,
        selection: &[AgentTarget],
        skills: &[String],
        pipeline: &mut dyn TargetPipeline,
    ) -> Vec<TargetResult> {
        let mut results = Vec::new();

        for plan in plan_installs(selection) {
            let names: Vec<String> = plan.display_names().iter().map(|n| n.to_string()).collect();
            ui::section(&format!("Installing for {}", names.join(", ")));
            ui::info(format!("{} skills into {}", skills.len(), plan.path.display()));

            let outcome = match pipeline.install(&plan, skills).await {
                Ok(report) => {
                    ui::success(format!("{} installed", report.installed()));
                    for skill in report.missing() {
                        ui::warn(format!("{} not found in the bundle", skill));
                    }
                    Ok(report)
                }
                Err(e) => {
                    ui::error(format!("Failed: {}", e));
                    Err(e.to_string())
                }
            };

            results.push(TargetResult {
                path: plan.path,
                names,
                outcome,
            });
        }

        results
    }

    async fn bootstrap_runtime(&mut self, bundled_requirements: Option<PathBuf>) -> Result<RuntimeOutcome> {
        if self.config.install.skip_runtime {
            tracing::debug!("Runtime bootstrap skipped");
            return Ok(RuntimeOutcome::Skipped);
        }

        ui::section("Python runtime");
        let fetcher = ArchiveFetcher::new(self.client.clone());
        let urls = vec![self.config.source.requirements_url()];
        RuntimeBootstrapper::new(self.runner, std::env::consts::OS)
            .assume_yes(self.config.install.assume_yes)
            .bootstrap(&mut *self.prompter, &fetcher, &urls, bundled_requirements.as_deref())
            .await
    }

    async fn configure_environment(&mut self) -> Result<WizardOutcome> {
        let options = &self.config.install;
        if options.skip_config || options.non_interactive {
            tracing::debug!("Configuration wizard skipped");
            return Ok(WizardOutcome::Skipped);
        }

        ui::section("Environment configuration");
        let shell = std::env::var("SHELL").ok();
        let target = ProfileTarget::detect(std::env::consts::OS, shell.as_deref(), &home_dir());

        match ConfigWizard::new(target).run(&mut *self.prompter, self.runner).await {
            Ok(outcome) => Ok(outcome),
            Err(Error::Interrupted) => Err(Error::Interrupted),
            Err(e) => {
                ui::warn(format!("Configuration wizard stopped: {}", e));
                Ok(WizardOutcome::Skipped)
            }
        }
    }

    fn log_sources(&self) {
        let source = &self.config.source;
        tracing::debug!("Manifest: {}", source.manifest_url());
        tracing::debug!("Requirements: {}", source.requirements_url());
        for archive in source.archive_sources() {
            tracing::debug!("Archive: {}", archive.url);
        }
    }
}
