//! Checkbox menu state machine
//!
//! Pure and terminal-agnostic: keys go in, a step comes out.

use std::collections::BTreeSet;

/// A decoded keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Toggle,
    SelectAll,
    SelectNone,
    Confirm,
    Quit,
    Other,
}

/// What happened after applying one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuStep {
    /// Keep reading keys
    Continue,
    /// Enter was pressed; indices of the checked items in ascending order
    Confirmed(Vec<usize>),
    /// Quit was pressed
    Cancelled,
}

/// Cursor and checked items over a fixed-size list
#[derive(Debug, Clone)]
pub struct MenuState {
    len: usize,
    cursor: usize,
    selected: BTreeSet<usize>,
}

impl MenuState {
    pub fn new(len: usize) -> Self {
        MenuState {
            len,
            cursor: 0,
            selected: BTreeSet::new(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Apply one key
    pub fn apply(&mut self, key: MenuKey) -> MenuStep {
        if self.len == 0 {
            return match key {
                MenuKey::Confirm => MenuStep::Confirmed(Vec::new()),
                MenuKey::Quit => MenuStep::Cancelled,
                _ => MenuStep::Continue,
            };
        }

        match key {
            MenuKey::Up => self.cursor = (self.cursor + self.len - 1) % self.len,
            MenuKey::Down => self.cursor = (self.cursor + 1) % self.len,
            MenuKey::Toggle => {
                if !self.selected.remove(&self.cursor) {
                    self.selected.insert(self.cursor);
                }
            }
            MenuKey::SelectAll => self.selected = (0..self.len).collect(),
            MenuKey::SelectNone => self.selected.clear(),
            MenuKey::Confirm => return MenuStep::Confirmed(self.selected.iter().copied().collect()),
            MenuKey::Quit => return MenuStep::Cancelled,
            MenuKey::Other => {}
        }

        MenuStep::Continue
    }
}
