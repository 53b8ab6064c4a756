//! Interactive prompts
//!
//! `Prompter` is the seam between the installer and the person at the
//! keyboard. The dialoguer implementation is used at runtime; tests script
//! the answers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};

use crate::error::{Error, Result};

/// Line-oriented questions asked during a run
pub trait Prompter {
    /// Yes/no question
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Free text; may return an empty string
    fn input(&mut self, message: &str) -> Result<String>;

    /// Hidden text; may return an empty string
    fn secret(&mut self, message: &str) -> Result<String>;

    /// Pick one of `items`, returning its index
    fn choose(&mut self, message: &str, items: &[&str], default: usize) -> Result<usize>;
}

/// dialoguer-backed prompter with the colorful theme
#[derive(Default)]
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(message.trim())
            .default(default)
            .interact()?)
    }

    fn input(&mut self, message: &str) -> Result<String> {
        let value: String = Input::with_theme(&self.theme)
            .with_prompt(message.trim())
            .allow_empty(true)
            .interact_text()?;
        Ok(value.trim().to_string())
    }

    fn secret(&mut self, message: &str) -> Result<String> {
        Ok(Password::with_theme(&self.theme)
            .with_prompt(message.trim())
            .allow_empty_password(true)
            .interact()?)
    }

    fn choose(&mut self, message: &str, items: &[&str], default: usize) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(message.trim())
            .items(items)
            .default(default)
            .interact()?)
    }
}

/// Prompter for unattended runs: declines every question, answers empty
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn confirm(&mut self, _message: &str, _default: bool) -> Result<bool> {
        Ok(false)
    }

    fn input(&mut self, _message: &str) -> Result<String> {
        Ok(String::new())
    }

    fn secret(&mut self, _message: &str) -> Result<String> {
        Ok(String::new())
    }

    fn choose(&mut self, _message: &str, items: &[&str], _default: usize) -> Result<usize> {
        // The last choice is always the "do nothing" option
        Ok(items.len().saturating_sub(1))
    }
}

/// Wraps a prompter so a Ctrl-C seen by the signal handler ends the run
///
/// A blocking line read cannot be cancelled from another task, so the flag is
/// checked before each question and again once the answer comes back. An
/// answer typed after Ctrl-C is discarded.
pub struct Interruptible<'a> {
    inner: &'a mut dyn Prompter,
    interrupted: Arc<AtomicBool>,
}

impl<'a> Interruptible<'a> {
    pub fn new(inner: &'a mut dyn Prompter, interrupted: Arc<AtomicBool>) -> Self {
        Interruptible { inner, interrupted }
    }

    fn guard<T>(&mut self, ask: impl FnOnce(&mut dyn Prompter) -> Result<T>) -> Result<T> {
        if self.interrupted.load(Ordering::SeqCst) {
            return Err(Error::Interrupted);
        }
        let answer = ask(&mut *self.inner);
        if self.interrupted.load(Ordering::SeqCst) {
            return Err(Error::Interrupted);
        }
        answer
    }
}

impl Prompter for Interruptible<'_> {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        self.guard(|p| p.confirm(message, default))
    }

    fn input(&mut self, message: &str) -> Result<String> {
        self.guard(|p| p.input(message))
    }

    fn secret(&mut self, message: &str) -> Result<String> {
        self.guard(|p| p.secret(message))
    }

    fn choose(&mut self, message: &str, items: &[&str], default: usize) -> Result<usize> {
        self.guard(|p| p.choose(message, items, default))
    }
}
