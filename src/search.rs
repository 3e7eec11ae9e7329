use deunicode::deunicode;

use crate::contact::Contact;

/// Normalize a string for matching.
/// Applies transliteration (e.g., "José" -> "Jose") and lowercase.
pub fn normalize(s: &str) -> String {
    deunicode(s)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(normalize(trimmed))
    }
}

/// Substring match of a normalized query against "<first> <last>".
pub fn matches(contact: &Contact, normalized_query: &str) -> bool {
    normalize(&contact.full_name()).contains(normalized_query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("John Doe"), "john doe");
        assert_eq!(normalize("José García"), "jose garcia");
        assert_eq!(normalize("  Aanya   Sharma "), "aanya sharma");
        assert_eq!(normalize("Иван Петров"), "ivan petrov");
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query(""), None);
        assert_eq!(normalize_query("   "), None);
        assert_eq!(normalize_query(" Patel "), Some("patel".to_string()));
    }

    #[test]
    fn test_matches_full_name() {
        let contact = Contact::new("Aarav", "Patel", &["1234567890"]);
        assert!(matches(&contact, "patel"));
        assert!(matches(&contact, "aarav"));
        assert!(matches(&contact, "rav pat"));
        assert!(!matches(&contact, "sharma"));
    }

    #[test]
    fn test_matches_transliterated() {
        let contact = Contact::new("José", "García", &[]);
        assert!(matches(&contact, "jose"));
        assert!(matches(&contact, "garcia"));
    }
}
