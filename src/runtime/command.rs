//! External command execution

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::Result;

/// Captured result of one process
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr, trimmed
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout.trim(), self.stderr.trim()).trim().to_string()
    }
}

/// Runs programs and checks whether they exist
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;

    /// Whether `program` resolves on PATH
    fn exists(&self, program: &str) -> bool;
}

/// Runs real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        // Arguments can carry secrets (setx NAME VALUE), so only their count is logged
        tracing::debug!("Running {} with {} argument(s)", program, args.len());
        let output = Command::new(program).args(args).output().await?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Turn a borrowed argument list into owned strings
pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CapturedLogs;

    #[test]
    fn test_combined_output() {
        let out = CommandOutput {
            success: false,
            stdout: "  \n".into(),
            stderr: "Python 2.7.18\n".into(),
        };
        assert_eq!(out.combined(), "Python 2.7.18");
    }

    #[tokio::test]
    async fn test_missing_program_is_io_error() {
        let result = SystemRunner
            .run("definitely-not-a-real-program-4711", &[])
            .await;
        assert!(result.is_err());
        assert!(!SystemRunner.exists("definitely-not-a-real-program-4711"));
    }

    #[tokio::test]
    async fn test_arguments_never_logged() {
        let logs = CapturedLogs::default();
        let _guard = logs.install(tracing::Level::DEBUG);

        let _ = SystemRunner
            .run("definitely-not-a-real-program-4711", &args(&["HIWORKS_PWD", "hunter2-secret"]))
            .await;

        let output = logs.contents();
        assert!(output.contains("definitely-not-a-real-program-4711 with 2 argument(s)"));
        assert!(!output.contains("hunter2-secret"));
        assert!(!output.contains("HIWORKS_PWD"));
    }
}
