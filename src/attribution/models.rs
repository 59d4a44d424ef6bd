//! Attribution metadata shipped alongside a search batch, and the flat contact
//! rows derived from it.

use serde::{Deserialize, Serialize};

/// One contributing recordset as described by the search attribution block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(rename = "uuid", alias = "source_uuid")]
    pub source_uuid: String,
    #[serde(rename = "name", alias = "source_name", default)]
    pub source_name: Option<String>,
    #[serde(rename = "url", alias = "source_url", default)]
    pub source_url: Option<String>,
    /// Contacts in the order the publisher listed them.
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

impl SourceMetadata {
    pub fn new(source_uuid: impl Into<String>) -> Self {
        Self {
            source_uuid: source_uuid.into(),
            source_name: None,
            source_url: None,
            contacts: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contacts.push(contact);
        self
    }
}

/// A person listed against a recordset.
///
/// Only contacts with an email survive flattening.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Contact {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    pub fn named(mut self, first: Option<&str>, last: Option<&str>) -> Self {
        self.first_name = first.map(str::to_string);
        self.last_name = last.map(str::to_string);
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Joins first and last name with one space, skipping blank parts.
    ///
    /// Returns `None` when neither part has content.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Trimmed email, or `None` when missing or blank.
    pub fn usable_email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    /// Trimmed role, or `None` when missing or blank.
    pub fn usable_role(&self) -> Option<&str> {
        non_blank(self.role.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// One retained (recordset, contact) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactRow {
    pub source_uuid: String,
    pub source_name: Option<String>,
    pub source_url: Option<String>,
    pub contact_name: Option<String>,
    pub contact_role: Option<String>,
    pub contact_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_both_parts() {
        let contact = Contact::with_email("a@x").named(Some("Ada"), Some("Lovelace"));
        assert_eq!(contact.display_name().as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn display_name_has_no_dangling_separator() {
        let first_only = Contact::with_email("a@x").named(Some("Ada "), None);
        assert_eq!(first_only.display_name().as_deref(), Some("Ada"));

        let last_only = Contact::with_email("a@x").named(None, Some("Lovelace"));
        assert_eq!(last_only.display_name().as_deref(), Some("Lovelace"));

        let blank_first = Contact::with_email("a@x").named(Some("  "), Some("Lovelace"));
        assert_eq!(blank_first.display_name().as_deref(), Some("Lovelace"));

        let nameless = Contact::with_email("a@x");
        assert_eq!(nameless.display_name(), None);
    }

    #[test]
    fn blank_email_is_not_usable() {
        assert_eq!(Contact::with_email("   ").usable_email(), None);
        assert_eq!(Contact::default().usable_email(), None);
        assert_eq!(Contact::with_email(" a@x ").usable_email(), Some("a@x"));
    }

    #[test]
    fn metadata_deserializes_from_search_attribution() {
        let json = r#"{
            "uuid": "rs-1",
            "name": "Herbarium",
            "url": "http://example.org/rs-1",
            "itemCount": 12,
            "contacts": [
                {"first_name": "Ada", "last_name": "Lovelace", "role": "curator", "email": "ada@x"},
                {"role": "manager"}
            ]
        }"#;
        let meta: SourceMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.source_uuid, "rs-1");
        assert_eq!(meta.source_name.as_deref(), Some("Herbarium"));
        assert_eq!(meta.contacts.len(), 2);
        assert_eq!(meta.contacts[1].email, None);
    }

    #[test]
    fn metadata_accepts_source_prefixed_keys() {
        let json = r#"{"source_uuid": "rs-2", "source_name": "Museum"}"#;
        let meta: SourceMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.source_uuid, "rs-2");
        assert_eq!(meta.source_name.as_deref(), Some("Museum"));
        assert!(meta.contacts.is_empty());
    }
}
