use crossterm::event::{Event, KeyEvent};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::contact::{Contact, NameKey, PhoneNumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Viewing,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogField {
    FirstName,
    LastName,
    Phone,
}

impl DialogField {
    pub const ALL: [DialogField; 3] = [
        DialogField::FirstName,
        DialogField::LastName,
        DialogField::Phone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DialogField::FirstName => "FIRST NAME",
            DialogField::LastName => "LAST NAME",
            DialogField::Phone => "PHONE",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DialogField::FirstName => DialogField::LastName,
            DialogField::LastName => DialogField::Phone,
            DialogField::Phone => DialogField::FirstName,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            DialogField::FirstName => DialogField::Phone,
            DialogField::LastName => DialogField::FirstName,
            DialogField::Phone => DialogField::LastName,
        }
    }
}

/// The contact dialog: an identity anchor (`selected`, the contact as it was
/// opened) and a mutable draft (`edited`), plus one input per editable field.
///
/// Dismissing drops the whole value; committing hands `key()` and the draft's
/// phone numbers to the directory. Name edits live only in the draft.
pub struct ContactDialog {
    mode: DialogMode,
    selected: Contact,
    edited: Contact,
    field: DialogField,
    first_input: Input,
    last_input: Input,
    phone_input: Input,
}

impl ContactDialog {
    pub fn open(contact: &Contact, mode: DialogMode) -> Self {
        let phone = contact.primary_number().unwrap_or_default().to_string();
        Self {
            mode,
            selected: contact.clone(),
            edited: contact.clone(),
            field: DialogField::FirstName,
            first_input: Input::new(contact.first_name.clone()),
            last_input: Input::new(contact.last_name.clone()),
            phone_input: Input::new(phone),
        }
    }

    pub fn mode(&self) -> DialogMode {
        self.mode
    }

    pub fn field(&self) -> DialogField {
        self.field
    }

    /// Identity pair the dialog was opened with; the match key for commit.
    pub fn key(&self) -> NameKey {
        self.selected.key()
    }

    pub fn edited(&self) -> &Contact {
        &self.edited
    }

    pub fn begin_editing(&mut self) {
        self.mode = DialogMode::Editing;
    }

    pub fn focus_next(&mut self) {
        self.field = self.field.next();
    }

    pub fn focus_prev(&mut self) {
        self.field = self.field.prev();
    }

    pub fn field_value(&self, field: DialogField) -> &str {
        match field {
            DialogField::FirstName => self.first_input.value(),
            DialogField::LastName => self.last_input.value(),
            DialogField::Phone => self.phone_input.value(),
        }
    }

    pub fn visual_cursor(&self) -> usize {
        match self.field {
            DialogField::FirstName => self.first_input.visual_cursor(),
            DialogField::LastName => self.last_input.visual_cursor(),
            DialogField::Phone => self.phone_input.visual_cursor(),
        }
    }

    /// Route a key to the focused input. Only meaningful while editing.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if self.mode != DialogMode::Editing {
            return false;
        }
        let event = Event::Key(key);
        match self.field {
            DialogField::FirstName => {
                let response = self.first_input.handle_event(&event);
                if matches!(&response, Some(change) if change.value) {
                    self.edited.first_name = self.first_input.value().to_string();
                }
                response.is_some()
            }
            DialogField::LastName => {
                let response = self.last_input.handle_event(&event);
                if matches!(&response, Some(change) if change.value) {
                    self.edited.last_name = self.last_input.value().to_string();
                }
                response.is_some()
            }
            DialogField::Phone => {
                let response = self.phone_input.handle_event(&event);
                if matches!(&response, Some(change) if change.value) {
                    // A touched phone field replaces the whole list with one
                    // verbatim entry; an untouched draft keeps the copied list.
                    self.edited.phone_numbers =
                        vec![PhoneNumber::new(self.phone_input.value().to_string())];
                }
                response.is_some()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn contact() -> Contact {
        Contact::new("Aanya", "Sharma", &["9876543210", "1112223334"])
    }

    fn press(dialog: &mut ContactDialog, c: char) {
        dialog.handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }

    #[test]
    fn test_open_copies_both_buffers() {
        let dialog = ContactDialog::open(&contact(), DialogMode::Viewing);
        assert_eq!(dialog.mode(), DialogMode::Viewing);
        assert_eq!(dialog.key(), NameKey::new("Aanya", "Sharma"));
        assert_eq!(dialog.edited(), &contact());
        assert_eq!(dialog.field_value(DialogField::Phone), "9876543210");
    }

    #[test]
    fn test_viewing_ignores_typed_keys() {
        let mut dialog = ContactDialog::open(&contact(), DialogMode::Viewing);
        assert!(!dialog.handle_key_event(KeyEvent::new(
            KeyCode::Char('z'),
            KeyModifiers::NONE
        )));
        assert_eq!(dialog.edited(), &contact());
    }

    #[test]
    fn test_name_edits_stay_in_draft_and_keep_key() {
        let mut dialog = ContactDialog::open(&contact(), DialogMode::Editing);
        press(&mut dialog, 'x');
        assert_eq!(dialog.edited().first_name, "Aanyax");
        // the identity anchor is untouched
        assert_eq!(dialog.key(), NameKey::new("Aanya", "Sharma"));
    }

    #[test]
    fn test_phone_edit_collapses_to_single_entry() {
        let mut dialog = ContactDialog::open(&contact(), DialogMode::Editing);
        dialog.focus_next();
        dialog.focus_next();
        assert_eq!(dialog.field(), DialogField::Phone);
        press(&mut dialog, '5');
        assert_eq!(
            dialog.edited().phone_numbers,
            vec![PhoneNumber::new("98765432105")]
        );
    }

    #[test]
    fn test_untouched_phone_keeps_full_list() {
        let mut dialog = ContactDialog::open(&contact(), DialogMode::Editing);
        press(&mut dialog, 'x');
        assert_eq!(dialog.edited().phone_numbers.len(), 2);
    }

    #[test]
    fn test_field_cycle_wraps() {
        let mut dialog = ContactDialog::open(&contact(), DialogMode::Editing);
        assert_eq!(dialog.field(), DialogField::FirstName);
        dialog.focus_prev();
        assert_eq!(dialog.field(), DialogField::Phone);
        dialog.focus_next();
        assert_eq!(dialog.field(), DialogField::FirstName);
    }

    #[test]
    fn test_malformed_phone_accepted_verbatim() {
        let mut dialog = ContactDialog::open(&contact(), DialogMode::Editing);
        dialog.focus_prev();
        for c in "x!".chars() {
            press(&mut dialog, c);
        }
        assert_eq!(
            dialog.edited().phone_numbers,
            vec![PhoneNumber::new("9876543210x!")]
        );
    }
}
