//! Expands nested attribution entries into one row per (recordset, contact).

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::models::{ContactRow, SourceMetadata};

/// Flattens attribution metadata into deduplicated contact rows.
///
/// Contacts without an email are dropped. Names are composed before
/// deduplication, so nameless duplicates collapse too. Rows keep the order in
/// which each recordset listed its contacts. Uuids are kept verbatim so they
/// join with record references as written. Entries with a blank uuid are
/// skipped; repeated entries for one uuid are merged into the first.
pub fn flatten_contacts(attribution: &[SourceMetadata]) -> Vec<ContactRow> {
    let mut rows: Vec<ContactRow> = Vec::new();
    let mut seen: HashSet<(String, Option<String>, Option<String>, String)> = HashSet::new();
    // uuid -> identity of the first entry seen
    let mut identities: HashMap<&str, (Option<&str>, Option<&str>)> = HashMap::new();
    let mut dropped_no_email = 0usize;
    let mut dropped_duplicate = 0usize;

    for meta in attribution {
        let uuid = meta.source_uuid.as_str();
        if uuid.trim().is_empty() {
            warn!(
                "[Flatten] Skipping attribution entry with blank uuid ({} contacts)",
                meta.contacts.len()
            );
            continue;
        }

        let (source_name, source_url) = match identities.get(uuid).copied() {
            Some(identity) => {
                warn!("[Flatten] Recordset {} listed more than once; merging contacts", uuid);
                identity
            }
            None => {
                let identity = (meta.source_name.as_deref(), meta.source_url.as_deref());
                identities.insert(uuid, identity);
                identity
            }
        };

        for contact in &meta.contacts {
            let Some(email) = contact.usable_email() else {
                dropped_no_email += 1;
                continue;
            };

            let row = ContactRow {
                source_uuid: uuid.to_string(),
                source_name: source_name.map(str::to_string),
                source_url: source_url.map(str::to_string),
                contact_name: contact.display_name(),
                contact_role: contact.usable_role().map(str::to_string),
                contact_email: email.to_string(),
            };

            let key = (
                row.source_uuid.clone(),
                row.contact_name.clone(),
                row.contact_role.clone(),
                row.contact_email.clone(),
            );
            if !seen.insert(key) {
                dropped_duplicate += 1;
                continue;
            }

            rows.push(row);
        }
    }

    debug!(
        rows = rows.len(),
        dropped_no_email, dropped_duplicate, "[Flatten] Contact rows ready"
    );

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::models::Contact;

    fn curator(email: &str) -> Contact {
        Contact::with_email(email).role("curator")
    }

    #[test]
    fn identical_contacts_collapse_to_one_row() {
        let attribution = vec![SourceMetadata::new("U1")
            .with_contact(curator("a@x"))
            .with_contact(curator("a@x"))];

        let rows = flatten_contacts(&attribution);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source_uuid, "U1");
        assert_eq!(rows[0].contact_role.as_deref(), Some("curator"));
        assert_eq!(rows[0].contact_email, "a@x");
        assert_eq!(rows[0].contact_name, None);
    }

    #[test]
    fn contacts_without_email_are_dropped() {
        let attribution = vec![SourceMetadata::new("U1")
            .with_contact(Contact::default().named(Some("No"), Some("Mail")))
            .with_contact(Contact::with_email("  "))
            .with_contact(Contact::with_email("b@x"))];

        let rows = flatten_contacts(&attribution);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].contact_email, "b@x");
    }

    #[test]
    fn same_contact_under_two_sources_is_kept_twice() {
        let attribution = vec![
            SourceMetadata::new("U1").with_contact(curator("a@x")),
            SourceMetadata::new("U2").with_contact(curator("a@x")),
        ];

        let rows = flatten_contacts(&attribution);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source_uuid, "U1");
        assert_eq!(rows[1].source_uuid, "U2");
    }

    #[test]
    fn differing_roles_are_distinct_contacts() {
        let attribution = vec![SourceMetadata::new("U1")
            .with_contact(curator("a@x"))
            .with_contact(Contact::with_email("a@x").role("manager"))];

        assert_eq!(flatten_contacts(&attribution).len(), 2);
    }

    #[test]
    fn listing_order_is_preserved() {
        let attribution = vec![SourceMetadata::new("U1")
            .with_name("Herbarium")
            .with_url("http://h.example")
            .with_contact(Contact::with_email("c@x").named(Some("Cy"), None))
            .with_contact(Contact::with_email("a@x").named(Some("Al"), Some("Bo")))
            .with_contact(Contact::with_email("c@x").named(Some("Cy"), None))
            .with_contact(Contact::with_email("b@x"))];

        let rows = flatten_contacts(&attribution);
        let emails: Vec<&str> = rows.iter().map(|r| r.contact_email.as_str()).collect();

        assert_eq!(emails, vec!["c@x", "a@x", "b@x"]);
        assert_eq!(rows[1].contact_name.as_deref(), Some("Al Bo"));
        assert!(rows
            .iter()
            .all(|r| r.source_name.as_deref() == Some("Herbarium")));
    }

    #[test]
    fn repeated_entries_merge_under_first_identity() {
        let attribution = vec![
            SourceMetadata::new("U1")
                .with_name("First")
                .with_contact(curator("a@x")),
            SourceMetadata::new("U1")
                .with_name("Second")
                .with_contact(curator("a@x"))
                .with_contact(curator("b@x")),
        ];

        let rows = flatten_contacts(&attribution);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.source_name.as_deref() == Some("First")));
    }

    #[test]
    fn blank_uuid_entries_are_skipped() {
        let attribution = vec![SourceMetadata::new(" ").with_contact(curator("a@x"))];
        assert!(flatten_contacts(&attribution).is_empty());
    }

    #[test]
    fn padded_uuid_is_kept_verbatim() {
        let attribution = vec![SourceMetadata::new("U1 ").with_contact(curator("a@x"))];

        let rows = flatten_contacts(&attribution);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source_uuid, "U1 ");
    }

    #[test]
    fn empty_attribution_yields_no_rows() {
        assert!(flatten_contacts(&[]).is_empty());
    }
}
