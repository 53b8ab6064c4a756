//! Terminal adapters for the checkbox menu
//!
//! Only raw-mode enter/exit, drawing, and key decoding live here. The
//! crossterm implementation covers Unix and Windows consoles alike.

use std::io::{self, Write};
use std::sync::Once;

use crossterm::cursor::{Hide, MoveToColumn, MoveUp, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};

use super::state::MenuKey;

/// Raw-mode control and drawing
pub trait TerminalBackend {
    /// Disable echo and line buffering, hide the cursor
    fn enter_raw(&mut self) -> io::Result<()>;
    /// Undo everything `enter_raw` did
    fn leave_raw(&mut self) -> io::Result<()>;
    /// Replace the previously drawn frame with `lines`
    fn draw(&mut self, lines: &[String]) -> io::Result<()>;
}

/// Blocking source of decoded keys
pub trait KeySource {
    fn next_key(&mut self) -> io::Result<MenuKey>;
}

/// Holds raw mode for as long as it lives
///
/// Raw mode is released in `Drop`, so every exit from the menu loop
/// (confirm, quit, `?`, or unwinding) restores the terminal.
pub struct RawModeGuard<'a, B: TerminalBackend> {
    backend: &'a mut B,
}

impl<'a, B: TerminalBackend> RawModeGuard<'a, B> {
    pub fn acquire(backend: &'a mut B) -> io::Result<Self> {
        backend.enter_raw()?;
        Ok(RawModeGuard { backend })
    }

    pub fn draw(&mut self, lines: &[String]) -> io::Result<()> {
        self.backend.draw(lines)
    }
}

impl<B: TerminalBackend> Drop for RawModeGuard<'_, B> {
    fn drop(&mut self) {
        if let Err(e) = self.backend.leave_raw() {
            tracing::warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Restore the terminal before any panic message is printed
///
/// Release builds abort on panic, so `Drop` never runs there; the hook
/// covers that path. Installing it more than once is a no-op.
pub fn install_restore_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
    });
}

/// Best-effort return to cooked mode with a visible cursor
pub fn restore_terminal() {
    if terminal::is_raw_mode_enabled().unwrap_or(false) {
        let _ = terminal::disable_raw_mode();
    }
    let _ = execute!(io::stdout(), Show);
}

/// Leave raw mode, then show the cursor
///
/// Both steps always run. A failed cursor write (closed stdout) must not keep
/// the terminal in raw mode, so the raw-mode error is reported first.
fn release_terminal(
    disable_raw: impl FnOnce() -> io::Result<()>,
    show_cursor: impl FnOnce() -> io::Result<()>,
) -> io::Result<()> {
    let disabled = disable_raw();
    let shown = show_cursor();
    disabled.and(shown)
}

/// crossterm-backed terminal on stdout
#[derive(Default)]
pub struct CrosstermBackend {
    drawn_lines: u16,
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter_raw(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), Hide)?;
        self.drawn_lines = 0;
        Ok(())
    }

    fn leave_raw(&mut self) -> io::Result<()> {
        release_terminal(terminal::disable_raw_mode, || {
            let mut stdout = io::stdout();
            execute!(stdout, Show)?;
            writeln!(stdout)
        })
    }

    fn draw(&mut self, lines: &[String]) -> io::Result<()> {
        let mut stdout = io::stdout();
        if self.drawn_lines > 0 {
            queue!(stdout, MoveUp(self.drawn_lines))?;
        }
        queue!(stdout, MoveToColumn(0), Clear(ClearType::FromCursorDown))?;
        for line in lines {
            // Raw mode does not translate \n into \r\n
            write!(stdout, "{}\r\n", line)?;
        }
        stdout.flush()?;
        self.drawn_lines = lines.len() as u16;
        Ok(())
    }
}

/// crossterm key reader
///
/// crossterm already waits briefly after ESC to tell a lone Escape from an
/// arrow-key sequence, so keys arrive fully decoded.
#[derive(Default)]
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn next_key(&mut self) -> io::Result<MenuKey> {
        loop {
            if let Event::Key(key) = event::read()? {
                // Windows reports releases as well as presses
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                return Ok(decode_key(key));
            }
        }
    }
}

/// Map a crossterm key event onto a menu key
pub fn decode_key(key: KeyEvent) -> MenuKey {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') => MenuKey::Quit,
            _ => MenuKey::Other,
        };
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => MenuKey::Up,
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => MenuKey::Down,
        KeyCode::Char(' ') => MenuKey::Toggle,
        KeyCode::Char('a') | KeyCode::Char('A') => MenuKey::SelectAll,
        KeyCode::Char('n') | KeyCode::Char('N') => MenuKey::SelectNone,
        KeyCode::Enter => MenuKey::Confirm,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => MenuKey::Quit,
        _ => MenuKey::Other,
    }
}
