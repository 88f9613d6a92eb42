//! Command-palette state: open flag, keyboard selection, row menus.

use dioxus::prelude::{Key, Modifiers};
use shared_types::{SearchClickEvent, SearchResult};

/// Keyboard input the palette reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKey {
    /// Ctrl+K / Cmd+K.
    Toggle,
    /// `/` while no text field has focus.
    Slash,
    Down,
    Up,
    Enter,
    Escape,
}

impl PaletteKey {
    /// Classify a key by its DOM `key` name. `/` only counts when the user
    /// is not typing into some other field.
    pub fn classify(key: &str, command: bool, typing_elsewhere: bool) -> Option<Self> {
        match key {
            k if command && k.eq_ignore_ascii_case("k") => Some(PaletteKey::Toggle),
            "/" if !command && !typing_elsewhere => Some(PaletteKey::Slash),
            "ArrowDown" => Some(PaletteKey::Down),
            "ArrowUp" => Some(PaletteKey::Up),
            "Enter" => Some(PaletteKey::Enter),
            "Escape" => Some(PaletteKey::Escape),
            _ => None,
        }
    }

    pub fn from_event(key: &Key, modifiers: Modifiers, typing_elsewhere: bool) -> Option<Self> {
        let command = modifiers.contains(Modifiers::CONTROL) || modifiers.contains(Modifiers::META);
        Self::classify(&key.to_string(), command, typing_elsewhere)
    }
}

/// What selecting a result should do: record the click, then navigate.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub path: String,
    pub click: SearchClickEvent,
}

/// Outcome of a key press for the component to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteAction {
    Nothing,
    Opened,
    /// The palette closed; the owner must clear the query and results.
    Closed,
    Moved,
    Activate(Activation),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteController {
    open: bool,
    selected: usize,
    /// Id of the single row whose action menu is open.
    open_menu: Option<String>,
}

impl PaletteController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn open_menu(&self) -> Option<&str> {
        self.open_menu.as_deref()
    }

    pub fn open(&mut self) {
        self.open = true;
        self.selected = 0;
    }

    /// Close and forget selection and menus.
    pub fn close(&mut self) {
        self.open = false;
        self.selected = 0;
        self.open_menu = None;
    }

    /// Returns the new open state.
    pub fn toggle(&mut self) -> bool {
        if self.open {
            self.close();
        } else {
            self.open();
        }
        self.open
    }

    /// Call when the result list is replaced.
    pub fn results_changed(&mut self) {
        self.selected = 0;
        self.open_menu = None;
    }

    /// Call when a response lands: keeps the selection on a row that exists.
    pub fn clamp_selection(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn move_down(&mut self, len: usize) {
        self.selected = (self.selected + 1) % len.max(1);
    }

    pub fn move_up(&mut self, len: usize) {
        let len = len.max(1);
        self.selected = (self.selected + len - 1) % len;
    }

    /// Mouse hover selects the row under the pointer.
    pub fn hover(&mut self, index: usize) {
        self.selected = index;
    }

    /// Open `id`'s action menu, or close it if it is already the open one.
    pub fn toggle_menu(&mut self, id: &str) {
        if self.open_menu.as_deref() == Some(id) {
            self.open_menu = None;
        } else {
            self.open_menu = Some(id.to_string());
        }
    }

    pub fn close_menu(&mut self) {
        self.open_menu = None;
    }

    /// Build the activation for the result at `index` and close the palette.
    pub fn activate_at(
        &mut self,
        index: usize,
        results: &[SearchResult],
        query: &str,
        total_count: usize,
    ) -> Option<Activation> {
        let result = results.get(index)?;
        let activation = Activation {
            path: result.path.clone(),
            click: SearchClickEvent {
                query: query.trim().to_string(),
                result_type: result.result_type,
                result_id: result.id.clone(),
                total_results: i64::try_from(total_count).unwrap_or(i64::MAX),
            },
        };
        self.close();
        Some(activation)
    }

    /// Apply a key press. `results` is the flattened, category-ordered list
    /// currently on screen.
    pub fn handle_key(
        &mut self,
        key: PaletteKey,
        results: &[SearchResult],
        query: &str,
        total_count: usize,
    ) -> PaletteAction {
        match (key, self.open) {
            (PaletteKey::Toggle, _) => {
                if self.toggle() {
                    PaletteAction::Opened
                } else {
                    PaletteAction::Closed
                }
            }
            (PaletteKey::Slash, false) => {
                self.open();
                PaletteAction::Opened
            }
            (_, false) | (PaletteKey::Slash, true) => PaletteAction::Nothing,
            (PaletteKey::Escape, true) => {
                self.close();
                PaletteAction::Closed
            }
            (PaletteKey::Down, true) => {
                self.move_down(results.len());
                PaletteAction::Moved
            }
            (PaletteKey::Up, true) => {
                self.move_up(results.len());
                PaletteAction::Moved
            }
            (PaletteKey::Enter, true) => {
                match self.activate_at(self.selected, results, query, total_count) {
                    Some(activation) => PaletteAction::Activate(activation),
                    None => PaletteAction::Nothing,
                }
            }
        }
    }
}
