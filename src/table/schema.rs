//! Explicit column layout for the recordset contact table.

use serde::Serialize;

use crate::attribution::AggregatedSource;

/// A single SourceTable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Column {
    SourceUuid,
    SourceName,
    SourceUrl,
    RecordTally,
    ContactName(usize),
    ContactRole(usize),
    ContactEmail(usize),
}

impl Column {
    pub fn header(&self) -> String {
        match self {
            Column::SourceUuid => "source_uuid".to_string(),
            Column::SourceName => "source_name".to_string(),
            Column::SourceUrl => "source_url".to_string(),
            Column::RecordTally => "record_tally".to_string(),
            Column::ContactName(i) => format!("contact_name_{}", i),
            Column::ContactRole(i) => format!("contact_role_{}", i),
            Column::ContactEmail(i) => format!("contact_email_{}", i),
        }
    }

    /// Cell text for `source`; missing values render empty.
    pub fn cell(&self, source: &AggregatedSource, record_tally: u64) -> String {
        match self {
            Column::SourceUuid => source.source_uuid.clone(),
            Column::SourceName => source.source_name.clone().unwrap_or_default(),
            Column::SourceUrl => source.source_url.clone().unwrap_or_default(),
            Column::RecordTally => record_tally.to_string(),
            Column::ContactName(i) => source
                .slot(*i)
                .and_then(|s| s.name.clone())
                .unwrap_or_default(),
            Column::ContactRole(i) => source
                .slot(*i)
                .and_then(|s| s.role.clone())
                .unwrap_or_default(),
            Column::ContactEmail(i) => source
                .slot(*i)
                .map(|s| s.email.clone())
                .unwrap_or_default(),
        }
    }
}

/// Column order: identity, record tally, then contacts 1..=cap grouped per
/// index (name, role, email), then higher indices listed field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    columns: Vec<Column>,
}

impl ColumnSchema {
    /// Builds the layout for tables whose widest recordset has `width` contacts.
    pub fn new(cap: usize, width: usize) -> Self {
        let mut columns = vec![
            Column::SourceUuid,
            Column::SourceName,
            Column::SourceUrl,
            Column::RecordTally,
        ];

        let grouped = width.min(cap);
        for i in 1..=grouped {
            columns.push(Column::ContactName(i));
            columns.push(Column::ContactRole(i));
            columns.push(Column::ContactEmail(i));
        }

        let remainder = grouped + 1..=width;
        columns.extend(remainder.clone().map(Column::ContactName));
        columns.extend(remainder.clone().map(Column::ContactRole));
        columns.extend(remainder.map(Column::ContactEmail));

        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(Column::header).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
