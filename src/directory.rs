use crate::contact::{Contact, NameKey, PhoneNumber};
use crate::search;

/// Section title for contacts whose first name has no leading character.
pub const FALLBACK_SECTION: &str = "#";

/// A titled group of contacts sharing the same leading name character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub data: Vec<Contact>,
}

fn section_title(first_name: &str) -> String {
    match first_name.chars().next() {
        Some(c) => c.to_uppercase().collect(),
        None => FALLBACK_SECTION.to_string(),
    }
}

/// Derive the sectioned projection of a contact list for a query.
///
/// Filter keeps contacts whose normalized "<first> <last>" contains the
/// normalized query; an empty query keeps all. Surviving contacts are stable
/// sorted by normalized first name (ties keep their original relative order),
/// then grouped in a single pass: a new section starts whenever the uppercased
/// leading character of the first name changes.
pub fn project(contacts: &[Contact], query: &str) -> Vec<Section> {
    let normalized = search::normalize_query(query);
    let mut filtered: Vec<Contact> = match normalized.as_deref() {
        Some(q) => contacts
            .iter()
            .filter(|c| search::matches(c, q))
            .cloned()
            .collect(),
        None => contacts.to_vec(),
    };

    filtered.sort_by_cached_key(|c| search::normalize(&c.first_name));

    let mut sections: Vec<Section> = Vec::new();
    for contact in filtered {
        let title = section_title(&contact.first_name);
        match sections.last_mut() {
            Some(section) if section.title == title => section.data.push(contact),
            _ => sections.push(Section {
                title,
                data: vec![contact],
            }),
        }
    }
    sections
}

/// The directory state: the canonical contact list and the sectioned
/// projection currently on screen. All mutation goes through here.
#[derive(Debug, Clone)]
pub struct Directory {
    contacts: Vec<Contact>,
    sections: Vec<Section>,
}

impl Directory {
    pub fn new(contacts: Vec<Contact>) -> Self {
        let sections = project(&contacts, "");
        Self { contacts, sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn get(&self, section: usize, index: usize) -> Option<&Contact> {
        self.sections.get(section).and_then(|s| s.data.get(index))
    }

    /// Rebuild the projection from the canonical list.
    pub fn reproject(&mut self, query: &str) {
        self.sections = project(&self.contacts, query);
    }

    /// Replace the phone numbers of every contact matching the identity pair.
    ///
    /// Patches the section tree in place: sort order and section boundaries
    /// are not recomputed. Only phone numbers propagate; name fields are never
    /// written here. Returns the number of visible rows affected; zero matches
    /// is a no-op.
    pub fn update_phones(&mut self, key: &NameKey, numbers: &[PhoneNumber]) -> usize {
        let mut affected = 0;
        for section in &mut self.sections {
            for contact in &mut section.data {
                if key.matches(contact) {
                    contact.phone_numbers = numbers.to_vec();
                    affected += 1;
                }
            }
        }
        for contact in &mut self.contacts {
            if key.matches(contact) {
                contact.phone_numbers = numbers.to_vec();
            }
        }
        affected
    }

    /// Remove every contact matching the identity pair.
    ///
    /// Sections emptied by the removal keep their headers until the next
    /// reprojection. Returns the number of visible rows removed; zero matches
    /// is a no-op.
    pub fn delete(&mut self, key: &NameKey) -> usize {
        let mut removed = 0;
        for section in &mut self.sections {
            let before = section.data.len();
            section.data.retain(|c| !key.matches(c));
            removed += before - section.data.len();
        }
        self.contacts.retain(|c| !key.matches(c));
        removed
    }
}
