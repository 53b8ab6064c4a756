//! Leveled user-facing output
//!
//! Every decision point prints one styled line and mirrors it as a
//! debug-level tracing event, so `-v` or `RUST_LOG` captures the same story
//! without the default filter printing each line twice.

use console::style;

/// Informational line
pub fn info(message: impl AsRef<str>) {
    let message = message.as_ref();
    tracing::debug!(level = "info", "{}", message);
    println!("   {} {}", style("ℹ").blue(), message);
}

/// Something completed
pub fn success(message: impl AsRef<str>) {
    let message = message.as_ref();
    tracing::debug!(level = "success", "{}", message);
    println!("   {} {}", style("✓").green(), message);
}

/// Non-fatal problem
pub fn warn(message: impl AsRef<str>) {
    let message = message.as_ref();
    tracing::debug!(level = "warn", "{}", message);
    println!("   {} {}", style("⚠").yellow(), message);
}

/// Failure of the current unit of work
pub fn error(message: impl AsRef<str>) {
    let message = message.as_ref();
    tracing::debug!(level = "error", "{}", message);
    eprintln!("   {} {}", style("✗").red(), message);
}

/// Print a section header
pub fn section(title: &str) {
    println!("\n{}", style("─".repeat(50)).dim());
    println!("  {}", style(title).cyan().bold());
    println!("{}", style("─".repeat(50)).dim());
}

/// Print the welcome banner
pub fn banner(version: &str) {
    println!();
    println!("{}", style("╔══════════════════════════════════════════════════╗").cyan());
    println!("{}", style("║             🧩  Agent Skills Installer           ║").cyan());
    println!("{}", style("╚══════════════════════════════════════════════════╝").cyan());
    println!("   {}", style(format!("v{}", version)).dim());
}
