//! Partitions a batch into one export unit per SourceTable row.
//!
//! Planning is pure: it decides file names and row contents but touches no
//! file system. [`super::writer`] performs the I/O.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::batch::Record;
use crate::config::ExportConfig;
use crate::error::AppError;
use crate::table::SourceTable;

// ─────────────────────────────────────────────────────────────────────────────
// Public Types
// ─────────────────────────────────────────────────────────────────────────────

/// Everything needed to write one recordset's export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportUnit {
    pub source_uuid: String,
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A recordset whose export was rejected or failed to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFailure {
    pub source_uuid: String,
    pub reason: String,
}

impl ExportFailure {
    pub fn new(source_uuid: impl Into<String>, error: &AppError) -> Self {
        Self {
            source_uuid: source_uuid.into(),
            reason: error.to_string(),
        }
    }
}

/// Units ready to write plus the rows refused during planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportPlan {
    pub units: Vec<ExportUnit>,
    pub rejected: Vec<ExportFailure>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Planning
// ─────────────────────────────────────────────────────────────────────────────

/// Builds one [`ExportUnit`] per table row, in table order.
///
/// Every unit shares the same header: the source field followed by the
/// sorted union of field names across the whole batch. Rows whose uuid is
/// unusable as a file name, or whose file name collides with an earlier row
/// (case-folded when `case_insensitive_file_names` is set), are rejected
/// instead of written.
pub fn plan_exports(table: &SourceTable, records: &[Record], config: &ExportConfig) -> ExportPlan {
    let headers = export_headers(records, &config.source_field);

    let mut by_source: HashMap<&str, Vec<&Record>> = HashMap::new();
    for record in records {
        by_source
            .entry(record.source_reference.as_str())
            .or_default()
            .push(record);
    }

    let mut plan = ExportPlan::default();
    let mut claimed: HashMap<String, String> = HashMap::new();

    for row in table.rows() {
        let source_uuid = row.source_uuid();

        if let Err(e) = check_source_uuid(source_uuid) {
            warn!("[Export] Rejecting row: {}", e);
            plan.rejected.push(ExportFailure::new(source_uuid, &e));
            continue;
        }

        let file_name = config.export_file_name(source_uuid);
        let key = config.file_name_key(&file_name);
        if let Some(owner) = claimed.get(&key) {
            let e = AppError::DestinationCollision {
                file_name: file_name.clone(),
                claimed_by: owner.clone(),
            };
            warn!("[Export] Rejecting recordset {}: {}", source_uuid, e);
            plan.rejected.push(ExportFailure::new(source_uuid, &e));
            continue;
        }
        claimed.insert(key, source_uuid.to_string());

        let rows = by_source
            .get(source_uuid)
            .map(|matching| {
                matching
                    .iter()
                    .map(|record| record_cells(record, &headers[1..]))
                    .collect()
            })
            .unwrap_or_default();

        plan.units.push(ExportUnit {
            source_uuid: source_uuid.to_string(),
            file_name,
            headers: headers.clone(),
            rows,
        });
    }

    plan
}

/// Fails for uuids that would produce an empty, relative or nested file name.
pub fn check_source_uuid(source_uuid: &str) -> Result<(), AppError> {
    let trimmed = source_uuid.trim();
    let degenerate = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || source_uuid.contains(&['/', '\\', '\0'][..]);

    if degenerate {
        Err(AppError::DegenerateSourceUuid(source_uuid.to_string()))
    } else {
        Ok(())
    }
}

fn export_headers(records: &[Record], source_field: &str) -> Vec<String> {
    let fields: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.fields.keys().map(String::as_str))
        .filter(|key| *key != source_field)
        .collect();

    std::iter::once(source_field)
        .chain(fields)
        .map(str::to_string)
        .collect()
}

fn record_cells(record: &Record, fields: &[String]) -> Vec<String> {
    std::iter::once(record.source_reference.clone())
        .chain(fields.iter().map(|field| cell_text(record.fields.get(field))))
        .collect()
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
