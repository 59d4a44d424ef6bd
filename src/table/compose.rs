//! Joins aggregated recordset contacts with record counts and restricts the
//! result to recordsets actually present in the batch.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::schema::ColumnSchema;
use crate::attribution::{AggregatedSource, SourceMetadata};
use crate::batch::RecordTally;
use crate::config::ExportConfig;

// ─────────────────────────────────────────────────────────────────────────────
// Public Types
// ─────────────────────────────────────────────────────────────────────────────

/// One recordset in the final contact table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRow {
    pub source: AggregatedSource,
    pub record_tally: u64,
    /// True when the row was added without any emailed contact.
    pub undocumented: bool,
}

impl SourceRow {
    pub fn source_uuid(&self) -> &str {
        &self.source.source_uuid
    }
}

/// Contact table with one row per recordset in the batch, ordered by uuid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceTable {
    schema: ColumnSchema,
    rows: Vec<SourceRow>,
}

impl SourceTable {
    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[SourceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, source_uuid: &str) -> Option<&SourceRow> {
        self.rows.iter().find(|row| row.source_uuid() == source_uuid)
    }

    pub fn headers(&self) -> Vec<String> {
        self.schema.headers()
    }

    /// Every row rendered as text cells in schema order.
    pub fn cells(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows.iter().map(move |row| {
            self.schema
                .columns()
                .iter()
                .map(|column| column.cell(&row.source, row.record_tally))
                .collect()
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Composition
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the final [`SourceTable`].
///
/// Aggregated recordsets are left-joined with `tally` and then kept only when
/// the batch references them. With `include_undocumented_sources`, every
/// batch recordset that has no aggregated row is added without contacts,
/// borrowing its name and url from `attribution` when listed there.
pub fn compose_source_table(
    aggregated: Vec<AggregatedSource>,
    tally: &RecordTally,
    attribution: &[SourceMetadata],
    config: &ExportConfig,
) -> SourceTable {
    let mut rows: Vec<SourceRow> = Vec::with_capacity(tally.len());
    let mut covered: HashSet<String> = HashSet::new();
    let mut outside_batch = 0usize;

    for source in aggregated {
        let Some(&record_tally) = tally.get(&source.source_uuid) else {
            outside_batch += 1;
            continue;
        };
        covered.insert(source.source_uuid.clone());
        rows.push(SourceRow {
            source,
            record_tally,
            undocumented: false,
        });
    }

    if outside_batch > 0 {
        debug!(
            "[Compose] Dropped {} attributed recordsets with no records in this batch",
            outside_batch
        );
    }

    for (source_uuid, &record_tally) in tally {
        if covered.contains(source_uuid) {
            continue;
        }

        let listed = attribution
            .iter()
            .find(|meta| meta.source_uuid == *source_uuid);

        if !config.include_undocumented_sources {
            warn!(
                "[Compose] Omitting recordset {} ({} records): no attributed contacts",
                source_uuid, record_tally
            );
            continue;
        }

        match listed {
            Some(_) => warn!(
                "[Compose] Recordset {} ({} records) lists no contact with an email",
                source_uuid, record_tally
            ),
            None => warn!(
                "[Compose] Recordset {} ({} records) missing from attribution metadata",
                source_uuid, record_tally
            ),
        }

        rows.push(SourceRow {
            source: AggregatedSource::without_contacts(
                source_uuid.clone(),
                listed.and_then(|meta| meta.source_name.clone()),
                listed.and_then(|meta| meta.source_url.clone()),
            ),
            record_tally,
            undocumented: true,
        });
    }

    rows.sort_by(|a, b| a.source_uuid().cmp(b.source_uuid()));

    let width = rows
        .iter()
        .map(|row| row.source.contact_count())
        .max()
        .unwrap_or(0);
    let schema = ColumnSchema::new(config.contact_cap, width);

    info!(
        "[Compose] Source table has {} recordsets, {} columns",
        rows.len(),
        schema.len()
    );

    SourceTable { schema, rows }
}
