use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single phone number. The number is an opaque string; no parsing or
/// validation is applied anywhere in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub number: String,
}

impl PhoneNumber {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,
}

impl Contact {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, numbers: &[&str]) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone_numbers: numbers.iter().map(|n| PhoneNumber::new(*n)).collect(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn key(&self) -> NameKey {
        NameKey {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }

    pub fn primary_number(&self) -> Option<&str> {
        self.phone_numbers.first().map(|p| p.number.as_str())
    }
}

/// Identity pair used to locate contacts for edit and delete.
///
/// There is no stable unique identifier: every contact sharing the pair is
/// affected by an operation keyed on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameKey {
    pub first_name: String,
    pub last_name: String,
}

impl NameKey {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        contact.first_name == self.first_name && contact.last_name == self.last_name
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read contacts file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse contacts file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a seed file: a JSON array of contact records, in order.
pub fn load_seed(path: &Path) -> Result<Vec<Contact>, SeedError> {
    let raw = fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Built-in seed used when no contacts file is configured.
pub fn builtin_contacts() -> Vec<Contact> {
    vec![
        Contact::new("Aarav", "Patel", &["1234567890"]),
        Contact::new("Aanya", "Sharma", &["9876543210"]),
        Contact::new("Advait", "Kumar", &["5551234567"]),
        Contact::new("Ananya", "Singh", &["5559876543"]),
        Contact::new("Arjun", "Gupta", &["5554567890"]),
        Contact::new("Avni", "Verma", &["5557890123"]),
        Contact::new("Dhruv", "Joshi", &["5553210987"]),
        Contact::new("Diya", "Malhotra", &["5556543210"]),
        Contact::new("Ishaan", "Reddy", &["5550123456"]),
        Contact::new("Kavya", "Nair", &["5558901234"]),
        Contact::new("Krish", "Mehta", &["5552345678"]),
        Contact::new("Myra", "Iyer", &["5555678901"]),
        Contact::new("Neil", "Chopra", &["5551098765"]),
        Contact::new("Prisha", "Desai", &["5554321098"]),
        Contact::new("Reyansh", "Kapoor", &["5557654321"]),
        Contact::new("Riya", "Saxena", &["5550987654"]),
        Contact::new("Sai", "Bhat", &["5556789012"]),
        Contact::new("Tara", "Rao", &["5559012345"]),
        Contact::new("Vihaan", "Menon", &["5553456789"]),
        Contact::new("Zara", "Khan", &["5552109876"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_round_trip() {
        let json = r#"[
            {"first_name": "Aanya", "last_name": "Sharma", "phone_numbers": [{"number": "9876543210"}]},
            {"first_name": "Aarav", "last_name": "Patel", "phone_numbers": [{"number": "1234567890"}]}
        ]"#;
        let contacts: Vec<Contact> = serde_json::from_str(json).unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].full_name(), "Aanya Sharma");
        assert_eq!(contacts[0].primary_number(), Some("9876543210"));
    }

    #[test]
    fn test_seed_phone_numbers_default_empty() {
        let json = r#"[{"first_name": "Tara", "last_name": "Rao"}]"#;
        let contacts: Vec<Contact> = serde_json::from_str(json).unwrap();
        assert!(contacts[0].phone_numbers.is_empty());
        assert_eq!(contacts[0].primary_number(), None);
    }

    #[test]
    fn test_load_seed_missing_file() {
        let err = load_seed(Path::new("/nonexistent/contacts.json")).unwrap_err();
        assert!(matches!(err, SeedError::Read { .. }));
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_name_key_matches_exact_pair() {
        let contact = Contact::new("Aanya", "Sharma", &[]);
        assert!(NameKey::new("Aanya", "Sharma").matches(&contact));
        assert!(!NameKey::new("Aanya", "Patel").matches(&contact));
        assert!(!NameKey::new("aanya", "Sharma").matches(&contact));
    }

    #[test]
    fn test_builtin_contacts_shape() {
        let contacts = builtin_contacts();
        assert_eq!(contacts.len(), 20);
        assert!(contacts.iter().all(|c| !c.first_name.is_empty()));
        assert!(contacts.iter().all(|c| !c.phone_numbers.is_empty()));
    }
}
