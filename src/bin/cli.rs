//! skills-install
//!
//! Installs the agent skills bundle into the selected agents' skill
//! directories, then sets up the Python runtime and environment variables.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::Parser;
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use skill_installer::config::{split_list, validate_config};
use skill_installer::menu::restore_terminal;
use skill_installer::orchestrator::Orchestrator;
use skill_installer::prompt::{DialoguerPrompter, Interruptible, NonInteractive, Prompter};
use skill_installer::runtime::SystemRunner;
use skill_installer::session::InstallSession;
use skill_installer::targets::builtin_targets;
use skill_installer::{ui, Error, InstallerConfig, Result, NAME, VERSION};

#[derive(Parser)]
#[command(
    name = "skills-install",
    version = VERSION,
    about = "Install agent skills into Claude Code, Codex, Gemini, Cursor and OpenCode",
    long_about = None
)]
struct Cli {
    /// Target agent key (claude, codex, gemini, cursor, opencode, all); repeatable
    #[arg(short, long = "target", value_name = "KEY")]
    targets: Vec<String>,

    /// Install into every target
    #[arg(short, long)]
    all: bool,

    /// Only install these skills (comma separated)
    #[arg(short, long, value_name = "A,B,C")]
    skills: Option<String>,

    /// Print the available skills and exit
    #[arg(short, long)]
    list: bool,

    /// Never show menus or prompts
    #[arg(long)]
    non_interactive: bool,

    /// Approve installing Python automatically
    #[arg(short = 'y', long)]
    yes: bool,

    /// Do not check or install the Python runtime
    #[arg(long)]
    skip_runtime: bool,

    /// Do not run the environment configuration wizard
    #[arg(long)]
    skip_config: bool,

    /// Serve manifest, archives and requirements from this base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Layer command-line flags over file and environment settings
    fn apply_to(&self, config: &mut InstallerConfig) {
        let install = &mut config.install;

        if self.all {
            install.targets = vec!["all".to_string()];
        } else if !self.targets.is_empty() {
            install.targets = self.targets.iter().flat_map(|t| split_list(t)).collect();
        }
        if let Some(skills) = &self.skills {
            install.skills = split_list(skills);
        }
        install.non_interactive |= self.non_interactive;
        install.assume_yes |= self.yes;
        install.skip_runtime |= self.skip_runtime;
        install.skip_config |= self.skip_config;

        if let Some(url) = &self.base_url {
            config.source.base_url = Some(url.clone());
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    // Initialize logging
    let default_level = if cli.verbose { "skill_installer=debug" } else { "skill_installer=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(Error::UserCancelled) => {
            restore_terminal();
            ui::info("Installation cancelled");
            ExitCode::SUCCESS
        }
        Err(Error::Interrupted) => {
            restore_terminal();
            ui::warn("Interrupted; nothing further was saved");
            ExitCode::from(Error::Interrupted.exit_code())
        }
        Err(e) => {
            ui::error(e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let mut config = InstallerConfig::from_env()?;
    cli.apply_to(&mut config);

    if !config.install.non_interactive && !io::stdin().is_terminal() {
        tracing::debug!("stdin is not a terminal; configuration wizard disabled");
        config.install.skip_config = true;
    }

    let targets = builtin_targets();
    let validation = validate_config(&config, &targets);
    for warning in validation.warnings() {
        ui::warn(warning.to_string());
    }
    if !validation.is_valid() {
        for error in validation.errors() {
            ui::error(error.to_string());
        }
        return Err(Error::Config("invalid configuration".to_string()));
    }

    let client = Client::builder().user_agent(format!("{}/{}", NAME, VERSION)).build()?;
    let runner = SystemRunner;
    let mut interactive = DialoguerPrompter::new();
    let mut unattended = NonInteractive;
    let inner: &mut dyn Prompter = if config.install.non_interactive || !io::stdin().is_terminal() {
        &mut unattended
    } else {
        &mut interactive
    };

    // A line read blocks this task, so the select below never sees Ctrl-C
    // while a prompt is open. The flag lets the prompter end the run instead.
    let interrupted = Arc::new(AtomicBool::new(false));
    let watcher = {
        let interrupted = interrupted.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupted.store(true, Ordering::SeqCst);
            }
        })
    };
    let mut prompter = Interruptible::new(inner, interrupted);

    let list_only = cli.list;
    let mut orchestrator = Orchestrator::new(config, targets, client, &mut prompter, &runner);

    if list_only {
        orchestrator.list().await;
        watcher.abort();
        return Ok(0);
    }

    ui::banner(VERSION);
    let mut session = InstallSession::start()?;

    let outcome = tokio::select! {
        result = orchestrator.run(&mut session) => {
            let summary = result?;
            summary.print();
            Ok(summary.exit_code())
        }
        _ = tokio::signal::ctrl_c() => {
            restore_terminal();
            ui::warn("Interrupted; cleaning up");
            Ok(Error::Interrupted.exit_code())
        }
    };
    watcher.abort();
    outcome
}
