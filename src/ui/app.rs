use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;
use tui_widgets::popup::PopupState;

use crate::config::{Config, UiColors};
use crate::contact::{Contact, NameKey};
use crate::directory::Directory;

use super::draw;
use super::edit::{ContactDialog, DialogMode};

/// One visual row of the sectioned list: either a section header or a
/// contact row locating its record as (section, index).
#[derive(Debug, Clone)]
pub struct ListRow {
    pub text: String,
    pub detail: Option<String>,
    pub contact: Option<(usize, usize)>,
}

impl ListRow {
    pub fn selectable(&self) -> bool {
        self.contact.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFocus {
    Input,
    List,
}

#[derive(Debug, Clone)]
pub struct ConfirmModal {
    pub title: String,
    pub message: String,
    pub action: ConfirmAction,
}

/// Action to perform when the confirm modal is accepted
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    /// Delete every contact matching the identity pair
    DeleteContact(NameKey),
}

pub struct App<'a> {
    config: &'a Config,
    directory: Directory,
    pub search_input: Input,
    pub search_focus: SearchFocus,
    pub rows: Vec<ListRow>,
    pub selected_row: Option<usize>,
    pub dialog: Option<ContactDialog>,
    pub confirm_modal: Option<ConfirmModal>,
    pub modal_popup: PopupState,
    pub status: Option<String>,
}

impl<'a> App<'a> {
    pub fn new(directory: Directory, config: &'a Config) -> Self {
        let mut app = Self {
            config,
            directory,
            search_input: Input::default(),
            search_focus: SearchFocus::Input,
            rows: Vec::new(),
            selected_row: None,
            dialog: None,
            confirm_modal: None,
            modal_popup: PopupState::default(),
            status: None,
        };
        app.rebuild_rows();
        app.selected_row = app.first_selectable();
        app
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        B: ratatui::backend::Backend,
    {
        loop {
            draw::render(terminal, self)?;

            if event::poll(Duration::from_millis(250))? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key)? {
                            break;
                        }
                    }
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Ctrl+C always quits (hardcoded for safety)
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return Ok(true);
        }

        if self.confirm_modal.is_some() {
            self.handle_confirm_modal_key(key);
            return Ok(false);
        }

        if self.dialog.is_some() {
            self.handle_dialog_key(key);
            return Ok(false);
        }

        match self.search_focus {
            SearchFocus::Input => self.handle_search_input_key(key),
            SearchFocus::List => self.handle_list_key(key),
        }
    }

    fn handle_search_input_key(&mut self, key: KeyEvent) -> Result<bool> {
        let input_keys = &self.config.keys.search_input;

        // Cancel: move focus to the list (the query stays)
        if self.key_matches_any(&key, &input_keys.cancel) {
            self.search_focus = SearchFocus::List;
            return Ok(false);
        }

        // Confirm: open the selected contact
        if self.key_matches_any(&key, &input_keys.confirm) {
            self.open_dialog(DialogMode::Viewing);
            return Ok(false);
        }

        // Next/prev: navigate rows while typing
        if self.key_matches_any(&key, &input_keys.next) {
            self.move_selection(1);
            return Ok(false);
        }
        if self.key_matches_any(&key, &input_keys.prev) {
            self.move_selection(-1);
            return Ok(false);
        }

        // Pass other keys to the input widget
        if let Some(change) = self.search_input.handle_event(&Event::Key(key)) {
            if change.value {
                self.refresh();
            }
        }
        Ok(false)
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Result<bool> {
        let list_keys = &self.config.keys.list;
        let global = &self.config.keys.global;

        if self.key_matches_any(&key, &global.quit) {
            return Ok(true);
        }

        if self.key_matches_any(&key, &global.search)
            || self.key_matches_any(&key, &list_keys.cancel)
        {
            self.search_focus = SearchFocus::Input;
            return Ok(false);
        }

        if self.key_matches_any(&key, &list_keys.confirm) {
            self.open_dialog(DialogMode::Viewing);
            return Ok(false);
        }

        if self.key_matches_any(&key, &list_keys.next) {
            self.move_selection(1);
            return Ok(false);
        }
        if self.key_matches_any(&key, &list_keys.prev) {
            self.move_selection(-1);
            return Ok(false);
        }
        if self.key_matches_any(&key, &list_keys.page_down) {
            self.move_selection(5);
            return Ok(false);
        }
        if self.key_matches_any(&key, &list_keys.page_up) {
            self.move_selection(-5);
            return Ok(false);
        }

        if self.key_matches_any(&key, &list_keys.edit) {
            self.open_dialog(DialogMode::Editing);
            return Ok(false);
        }

        if self.key_matches_any(&key, &list_keys.delete) {
            self.request_delete();
            return Ok(false);
        }

        Ok(false)
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let dialog_keys = &self.config.keys.dialog;

        // Dismiss: drop both buffers, directory untouched
        if self.key_matches_any(&key, &dialog_keys.cancel) {
            self.dialog = None;
            return;
        }

        let mode = match self.dialog.as_ref() {
            Some(dialog) => dialog.mode(),
            None => return,
        };

        match mode {
            DialogMode::Viewing => {
                if self.key_matches_any(&key, &dialog_keys.edit) {
                    if let Some(dialog) = self.dialog.as_mut() {
                        dialog.begin_editing();
                    }
                    return;
                }
                if self.key_matches_any(&key, &dialog_keys.confirm) {
                    self.dialog = None;
                }
            }
            DialogMode::Editing => {
                if self.key_matches_any(&key, &dialog_keys.confirm) {
                    self.commit_dialog();
                    return;
                }
                if self.key_matches_any(&key, &dialog_keys.next) {
                    if let Some(dialog) = self.dialog.as_mut() {
                        dialog.focus_next();
                    }
                    return;
                }
                if self.key_matches_any(&key, &dialog_keys.prev) {
                    if let Some(dialog) = self.dialog.as_mut() {
                        dialog.focus_prev();
                    }
                    return;
                }
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.handle_key_event(key);
                }
            }
        }
    }

    fn handle_confirm_modal_key(&mut self, key: KeyEvent) {
        let confirm_keys = &self.config.keys.confirm;

        if self.key_matches_any(&key, &confirm_keys.cancel) {
            self.confirm_modal = None;
            return;
        }

        if self.key_matches_any(&key, &confirm_keys.confirm) {
            let Some(modal) = self.confirm_modal.take() else {
                return;
            };
            match modal.action {
                ConfirmAction::DeleteContact(key) => self.perform_delete(&key),
            }
        }
    }

    fn open_dialog(&mut self, mode: DialogMode) {
        let Some(contact) = self.selected_contact().cloned() else {
            self.set_status("No contact selected");
            return;
        };
        self.modal_popup = PopupState::default();
        self.dialog = Some(ContactDialog::open(&contact, mode));
    }

    fn commit_dialog(&mut self) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };
        let key = dialog.key();
        let numbers = dialog.edited().phone_numbers.clone();
        let affected = self.directory.update_phones(&key, &numbers);
        self.rebuild_rows();
        self.clamp_selection();
        match affected {
            0 => self.set_status("No matching contact"),
            1 => self.set_status("Contact updated"),
            n => self.set_status(format!("Updated {} contacts", n)),
        }
    }

    fn request_delete(&mut self) {
        let Some(contact) = self.selected_contact() else {
            self.set_status("No contact selected");
            return;
        };
        let name = contact.full_name();
        let key = contact.key();
        self.modal_popup = PopupState::default();
        self.confirm_modal = Some(ConfirmModal {
            title: "DELETE CONTACT".to_string(),
            message: format!("Delete {}?", name),
            action: ConfirmAction::DeleteContact(key),
        });
    }

    fn perform_delete(&mut self, key: &NameKey) {
        let removed = self.directory.delete(key);
        self.rebuild_rows();
        self.clamp_selection();
        match removed {
            0 => self.set_status("No matching contact"),
            1 => self.set_status("Contact deleted"),
            n => self.set_status(format!("Deleted {} contacts", n)),
        }
    }

    /// Re-derive the projection for the current query and rebuild the rows,
    /// keeping the selection on the same identity where possible.
    fn refresh(&mut self) {
        let previous_key = self.selected_contact().map(Contact::key);

        let query = self.search_input.value().to_string();
        self.directory.reproject(&query);
        self.rebuild_rows();

        self.selected_row = previous_key
            .and_then(|key| self.row_for_key(&key))
            .or_else(|| self.first_selectable());
    }

    fn rebuild_rows(&mut self) {
        self.rows.clear();
        for (section_idx, section) in self.directory.sections().iter().enumerate() {
            self.rows.push(ListRow {
                text: section.title.clone(),
                detail: None,
                contact: None,
            });
            for (item_idx, contact) in section.data.iter().enumerate() {
                self.rows.push(ListRow {
                    text: contact.full_name(),
                    detail: contact.primary_number().map(|n| n.to_string()),
                    contact: Some((section_idx, item_idx)),
                });
            }
        }
    }

    pub fn selected_contact(&self) -> Option<&Contact> {
        let row = self.selected_row?;
        let (section, index) = self.rows.get(row)?.contact?;
        self.directory.get(section, index)
    }

    pub fn contact_at(&self, row: &ListRow) -> Option<&Contact> {
        let (section, index) = row.contact?;
        self.directory.get(section, index)
    }

    fn first_selectable(&self) -> Option<usize> {
        self.rows.iter().position(ListRow::selectable)
    }

    fn row_for_key(&self, key: &NameKey) -> Option<usize> {
        self.rows.iter().position(|row| {
            self.contact_at(row)
                .map(|contact| key.matches(contact))
                .unwrap_or(false)
        })
    }

    fn move_selection(&mut self, delta: isize) {
        if delta == 0 || self.rows.is_empty() {
            return;
        }
        let Some(start) = self.selected_row else {
            self.selected_row = self.first_selectable();
            return;
        };

        let step: isize = if delta > 0 { 1 } else { -1 };
        let mut remaining = delta.abs();
        let mut current = start as isize;
        let mut landed = start;

        loop {
            current += step;
            if current < 0 || current >= self.rows.len() as isize {
                break;
            }
            if self.rows[current as usize].selectable() {
                landed = current as usize;
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }

        self.selected_row = Some(landed);
    }

    /// Put the selection back on a selectable row after rows changed.
    fn clamp_selection(&mut self) {
        let Some(row) = self.selected_row else {
            self.selected_row = self.first_selectable();
            return;
        };
        if self.rows.is_empty() {
            self.selected_row = None;
            return;
        }
        let row = row.min(self.rows.len() - 1);
        if self.rows[row].selectable() {
            self.selected_row = Some(row);
            return;
        }
        let forward = (row..self.rows.len()).find(|&i| self.rows[i].selectable());
        let backward = (0..row).rev().find(|&i| self.rows[i].selectable());
        self.selected_row = forward.or(backward);
    }

    fn set_status<S: Into<String>>(&mut self, message: S) {
        self.status = Some(message.into());
    }

    pub fn ui_colors(&self) -> &UiColors {
        &self.config.ui.colors
    }

    fn key_matches_any(&self, event: &KeyEvent, bindings: &[String]) -> bool {
        bindings.iter().any(|b| key_matches_single(event, b))
    }
}

/// Check if the key event matches a single binding string
fn key_matches_single(event: &KeyEvent, binding: &str) -> bool {
    let trimmed = binding.trim();
    if trimmed.is_empty() {
        return false;
    }

    // Disallow Ctrl/Alt/Super modifiers (we don't support them)
    let disallowed = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER;
    if event.modifiers.intersects(disallowed) {
        return false;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        // Special keys
        "enter" => matches!(event.code, KeyCode::Enter),
        "tab" => matches!(event.code, KeyCode::Tab),
        "backtab" | "shift+tab" => matches!(event.code, KeyCode::BackTab),
        "backspace" => matches!(event.code, KeyCode::Backspace),
        "esc" | "escape" => matches!(event.code, KeyCode::Esc),
        "space" => matches!(event.code, KeyCode::Char(' ')),
        "delete" => matches!(event.code, KeyCode::Delete),
        // Arrow keys
        "up" => matches!(event.code, KeyCode::Up),
        "down" => matches!(event.code, KeyCode::Down),
        "left" => matches!(event.code, KeyCode::Left),
        "right" => matches!(event.code, KeyCode::Right),
        // Page navigation
        "pageup" | "page_up" => matches!(event.code, KeyCode::PageUp),
        "pagedown" | "page_down" => matches!(event.code, KeyCode::PageDown),
        "home" => matches!(event.code, KeyCode::Home),
        "end" => matches!(event.code, KeyCode::End),
        // Single character - case-sensitive (m != M, since M requires Shift)
        _ => {
            let mut chars = trimmed.chars();
            if let (Some(first), None) = (chars.next(), chars.next()) {
                matches!(event.code, KeyCode::Char(c) if c == first)
            } else {
                false
            }
        }
    }
}
