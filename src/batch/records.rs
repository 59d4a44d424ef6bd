//! The paired search result: occurrence records plus their attribution block.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::attribution::SourceMetadata;
use crate::error::AppError;

// ─────────────────────────────────────────────────────────────────────────────
// Internal Wire Types
// ─────────────────────────────────────────────────────────────────────────────

/// Mirrors the JSON document a search client dump produces.
#[derive(Debug, Deserialize)]
struct WireSearchBatch {
    records: Vec<Map<String, Value>>,
    #[serde(default)]
    attribution: Option<Vec<SourceMetadata>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Public Types
// ─────────────────────────────────────────────────────────────────────────────

/// One specimen occurrence record.
///
/// `fields` holds every domain field except the recordset reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub source_reference: String,
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(source_reference: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            source_reference: source_reference.into(),
            fields,
        }
    }

    /// Splits the recordset reference out of a raw JSON record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MissingSourceReference` if `source_field` is absent
    /// or not a string.
    pub fn from_fields(
        index: usize,
        mut fields: Map<String, Value>,
        source_field: &str,
    ) -> Result<Self, AppError> {
        match fields.remove(source_field) {
            Some(Value::String(reference)) => Ok(Self::new(reference, fields)),
            _ => Err(AppError::MissingSourceReference {
                index,
                field: source_field.to_string(),
            }),
        }
    }

    /// Builder used mostly by tests and callers assembling batches by hand.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Records and the attribution metadata returned with them.
///
/// The attribution block describes every recordset matched by the original
/// query, so it may list recordsets that no record in `records` references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchBatch {
    pub records: Vec<Record>,
    pub attribution: Vec<SourceMetadata>,
}

impl SearchBatch {
    pub fn new(records: Vec<Record>, attribution: Vec<SourceMetadata>) -> Self {
        Self {
            records,
            attribution,
        }
    }

    /// Parses a `{"records": [...], "attribution": [...]}` document.
    ///
    /// A missing or null `attribution` key yields an empty attribution list.
    pub fn from_json_str(json: &str, source_field: &str) -> Result<Self, AppError> {
        let wire: WireSearchBatch = serde_json::from_str(json)?;

        let records = wire
            .records
            .into_iter()
            .enumerate()
            .map(|(index, fields)| Record::from_fields(index, fields, source_field))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(records, wire.attribution.unwrap_or_default()))
    }

    /// Reads and parses a batch document from disk.
    pub async fn load(path: impl AsRef<Path>, source_field: &str) -> Result<Self, AppError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let batch = Self::from_json_str(&json, source_field)?;

        info!(
            "[Batch] Loaded {} records and {} attribution entries from {}",
            batch.records.len(),
            batch.attribution.len(),
            path.display()
        );

        Ok(batch)
    }
}
