//! Numbered-list selection for non-interactive terminals

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::targets::AgentTarget;
use crate::ui;

/// How the textual menu reached its answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackChoice {
    /// User typed `all`
    All,
    /// User typed option numbers (zero-based, deduplicated, ascending)
    Indices(Vec<usize>),
    /// No input channel; every target chosen by default
    DefaultAll,
}

/// Print a numbered list to `out` and read one answer line from `input`
pub fn prompt_numbered<R, W>(targets: &[AgentTarget], input: &mut R, out: &mut W) -> Result<FallbackChoice>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "\nSelect install targets:")?;
    for (i, target) in targets.iter().enumerate() {
        writeln!(out, "  {}) {}  ({})", i + 1, target.display_name, target.install_path.display())?;
    }
    write!(out, "Enter numbers separated by spaces, or 'all': ")?;
    out.flush()?;

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => return Ok(FallbackChoice::DefaultAll),
        Ok(_) => {}
        Err(e) => {
            tracing::debug!("stdin unreadable: {}", e);
            return Ok(FallbackChoice::DefaultAll);
        }
    }

    Ok(parse_answer(line.trim(), targets.len()))
}

/// Parse `all` or a list of 1-based option numbers
pub fn parse_answer(answer: &str, len: usize) -> FallbackChoice {
    if answer.eq_ignore_ascii_case("all") {
        return FallbackChoice::All;
    }

    let mut indices = Vec::new();
    for token in answer.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
        match token.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => indices.push(n - 1),
            _ => ui::warn(format!("Ignoring invalid option '{}'", token)),
        }
    }
    indices.sort_unstable();
    indices.dedup();

    FallbackChoice::Indices(indices)
}
