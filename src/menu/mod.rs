//! Target selection menu
//!
//! An interactive checkbox list when a terminal is attached, a numbered
//! stdin prompt when it is not, and select-everything when there is no
//! input at all.
//!
//! Keys: ↑/↓ (or k/j) move, Space toggles, `a` selects all, `n` clears,
//! Enter confirms, `q`/Esc/Ctrl-C quits the whole program.

mod fallback;
mod state;
mod terminal;

use std::io::{self, IsTerminal};

use console::style;

pub use fallback::{parse_answer, prompt_numbered, FallbackChoice};
pub use state::{MenuKey, MenuState, MenuStep};
pub use terminal::{
    decode_key, install_restore_hook, restore_terminal, CrosstermBackend, CrosstermKeys, KeySource,
    RawModeGuard, TerminalBackend,
};

use crate::error::{Error, Result};
use crate::targets::AgentTarget;
use crate::ui;

/// Ask the user which targets to install into
///
/// Returns the chosen targets in catalog order (possibly empty), or
/// `Error::UserCancelled` when the user quit.
pub fn select_targets(targets: &[AgentTarget]) -> Result<Vec<AgentTarget>> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        let mut backend = CrosstermBackend::new();
        let mut keys = CrosstermKeys;
        return run_menu(targets, &mut backend, &mut keys);
    }

    let stdin = io::stdin();
    let choice = prompt_numbered(targets, &mut stdin.lock(), &mut io::stdout())?;
    Ok(apply_fallback(targets, choice))
}

/// Turn a textual-menu answer into targets
pub fn apply_fallback(targets: &[AgentTarget], choice: FallbackChoice) -> Vec<AgentTarget> {
    match choice {
        FallbackChoice::All => targets.to_vec(),
        FallbackChoice::DefaultAll => {
            ui::info("No input available; defaulting to all targets");
            targets.to_vec()
        }
        FallbackChoice::Indices(indices) => indices.into_iter().map(|i| targets[i].clone()).collect(),
    }
}

/// Drive the checkbox menu with the given terminal and key source
pub fn run_menu<B, K>(targets: &[AgentTarget], backend: &mut B, keys: &mut K) -> Result<Vec<AgentTarget>>
where
    B: TerminalBackend,
    K: KeySource,
{
    let mut state = MenuState::new(targets.len());
    let mut guard = RawModeGuard::acquire(backend)?;

    loop {
        guard.draw(&render(targets, &state))?;

        match state.apply(keys.next_key()?) {
            MenuStep::Continue => {}
            MenuStep::Confirmed(indices) => {
                return Ok(indices.into_iter().map(|i| targets[i].clone()).collect());
            }
            MenuStep::Cancelled => return Err(Error::UserCancelled),
        }
    }
}

/// Render the menu as display lines
pub fn render(targets: &[AgentTarget], state: &MenuState) -> Vec<String> {
    let mut lines = vec![
        format!("{}", style("Select install targets").cyan().bold()),
        format!(
            "{}",
            style("  ↑/↓ move · Space toggle · a all · n none · Enter confirm · q quit").dim()
        ),
        String::new(),
    ];

    for (i, target) in targets.iter().enumerate() {
        let pointer = if i == state.cursor() { style("❯").cyan().to_string() } else { " ".to_string() };
        let checkbox = if state.is_selected(i) { style("[x]").green().to_string() } else { "[ ]".to_string() };

        let shared = targets
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && other.install_path == target.install_path);
        let note = if shared { " (shared directory)" } else { "" };

        lines.push(format!(
            " {} {} {:<12} {}{}",
            pointer,
            checkbox,
            target.display_name,
            style(target.install_path.display()).dim(),
            style(note).dim()
        ));
    }

    lines.push(String::new());
    lines.push(format!("  {} selected", state.selected_count()));
    lines
}
