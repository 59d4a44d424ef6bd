//! Regroups flattened contact rows into one row per recordset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::models::ContactRow;

/// One numbered contact position within a recordset (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSlot {
    pub index: usize,
    pub name: Option<String>,
    pub role: Option<String>,
    pub email: String,
}

/// A recordset with its contacts pivoted into numbered slots.
///
/// The first `cap` contacts live in `contacts`; the rest spill into
/// `overflow`, still numbered consecutively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedSource {
    pub source_uuid: String,
    pub source_name: Option<String>,
    pub source_url: Option<String>,
    pub contacts: Vec<ContactSlot>,
    pub overflow: Vec<ContactSlot>,
}

impl AggregatedSource {
    /// A recordset row with no contact slots.
    pub fn without_contacts(
        source_uuid: impl Into<String>,
        source_name: Option<String>,
        source_url: Option<String>,
    ) -> Self {
        Self {
            source_uuid: source_uuid.into(),
            source_name,
            source_url,
            contacts: Vec::new(),
            overflow: Vec::new(),
        }
    }

    /// Total contacts, bounded and overflow together.
    pub fn contact_count(&self) -> usize {
        self.contacts.len() + self.overflow.len()
    }

    /// All slots in index order.
    pub fn slots(&self) -> impl Iterator<Item = &ContactSlot> {
        self.contacts.iter().chain(self.overflow.iter())
    }

    /// Slot at a 1-based index.
    pub fn slot(&self, index: usize) -> Option<&ContactSlot> {
        index.checked_sub(1).and_then(|i| self.slots().nth(i))
    }
}

/// Pivots contact rows into one [`AggregatedSource`] per recordset uuid.
///
/// Indices follow the incoming row order within each recordset. Output is
/// ordered by uuid. Recordsets that lost every contact during flattening do
/// not appear.
pub fn aggregate_contacts(rows: Vec<ContactRow>, cap: usize) -> Vec<AggregatedSource> {
    let mut groups: BTreeMap<String, AggregatedSource> = BTreeMap::new();

    for row in rows {
        let source = groups
            .entry(row.source_uuid.clone())
            .or_insert_with(|| {
                AggregatedSource::without_contacts(
                    row.source_uuid.clone(),
                    row.source_name.clone(),
                    row.source_url.clone(),
                )
            });

        let slot = ContactSlot {
            index: source.contact_count() + 1,
            name: row.contact_name,
            role: row.contact_role,
            email: row.contact_email,
        };

        if source.contacts.len() < cap {
            source.contacts.push(slot);
        } else {
            source.overflow.push(slot);
        }
    }

    groups.into_values().collect()
}
