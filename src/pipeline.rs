//! End-to-end run: batch in, contact table and per-recordset files out.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::attribution::{aggregate_contacts, flatten_contacts};
use crate::batch::{tally_records, SearchBatch};
use crate::config::ExportConfig;
use crate::error::AppError;
use crate::streaming::{plan_exports, write_exports, write_source_table, ExportReport};
use crate::table::{compose_source_table, SourceTable};

/// Result of [`resolve_and_export`].
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub table: SourceTable,
    pub report: ExportReport,
    pub summary_path: Option<PathBuf>,
}

/// Runs tally, flatten, aggregate and compose without any I/O.
pub fn resolve_source_table(
    batch: &SearchBatch,
    config: &ExportConfig,
) -> Result<SourceTable, AppError> {
    config.validate()?;

    let tally = tally_records(&batch.records);
    let rows = flatten_contacts(&batch.attribution);
    let aggregated = aggregate_contacts(rows, config.contact_cap);

    Ok(compose_source_table(
        aggregated,
        &tally,
        &batch.attribution,
        config,
    ))
}

/// Resolves the contact table and writes one export file per recordset into
/// `dest_dir`, plus the table itself when `summary_file` is set.
///
/// Rejected rows and per-file write failures are reported in
/// [`PipelineOutcome::report`]; they never abort the other recordsets.
pub async fn resolve_and_export(
    batch: &SearchBatch,
    dest_dir: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<PipelineOutcome, AppError> {
    let dest_dir = dest_dir.as_ref();
    let table = resolve_source_table(batch, config)?;
    let plan = plan_exports(&table, &batch.records, config);

    if let Some(summary) = &config.summary_file {
        let summary_key = config.file_name_key(summary);
        let clash = plan
            .units
            .iter()
            .any(|unit| config.file_name_key(&unit.file_name) == summary_key);
        if clash {
            return Err(AppError::InvalidConfig(format!(
                "summary file {} collides with an export file",
                summary
            )));
        }
    }

    info!(
        "[Pipeline] {} records across {} recordsets; {} exports planned, {} rejected",
        batch.records.len(),
        table.len(),
        plan.units.len(),
        plan.rejected.len()
    );

    let mut report = write_exports(plan.units, dest_dir, config).await?;
    let mut failed = plan.rejected;
    failed.append(&mut report.failed);
    report.failed = failed;

    let summary_path = match &config.summary_file {
        Some(name) => {
            let path = dest_dir.join(name);
            let table = table.clone();
            let delimiter = config.delimiter;
            let written = tokio::task::spawn_blocking(move || {
                write_source_table(&table, &path, delimiter)
            })
            .await
            .map_err(|e| AppError::Internal(format!("Summary task panicked: {}", e)))??;
            Some(written)
        }
        None => None,
    };

    Ok(PipelineOutcome {
        table,
        report,
        summary_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::{Contact, SourceMetadata};
    use crate::batch::Record;
    use serde_json::Map;
    use tempfile::TempDir;

    fn batch() -> SearchBatch {
        let records = vec![
            Record::new("U1", Map::new()).with_field("uuid", "r1"),
            Record::new("U1", Map::new()).with_field("uuid", "r2"),
            Record::new("U2", Map::new()).with_field("uuid", "r3"),
        ];
        let attribution = vec![
            SourceMetadata::new("U1")
                .with_name("Herbarium")
                .with_contact(Contact::with_email("a@x").role("curator")),
            SourceMetadata::new("U9").with_contact(Contact::with_email("z@x")),
        ];
        SearchBatch::new(records, attribution)
    }

    #[test]
    fn invalid_config_is_rejected_before_work() {
        let err = resolve_source_table(&batch(), &ExportConfig::default().contact_cap(0))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn writes_exports_and_summary() {
        let dir = TempDir::new().expect("Failed to create temp dir");

        let outcome = resolve_and_export(&batch(), dir.path(), &ExportConfig::default())
            .await
            .expect("Pipeline should succeed");

        assert_eq!(outcome.table.len(), 2);
        assert!(outcome.report.is_complete());
        assert!(dir.path().join("records_U1.csv").is_file());
        assert!(dir.path().join("records_U2.csv").is_file());
        assert!(!dir.path().join("records_U9.csv").exists());

        let summary = outcome.summary_path.expect("summary should be written");
        let content = std::fs::read_to_string(summary).expect("Failed to read summary");
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("source_uuid,source_name,source_url,record_tally,contact_name_1,contact_role_1,contact_email_1")
        );
        assert_eq!(lines.next(), Some("U1,Herbarium,,2,,curator,a@x"));
        assert_eq!(lines.next(), Some("U2,,,1,,,"));
    }

    #[tokio::test]
    async fn summary_can_be_skipped() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = ExportConfig::default().summary_file(None);

        let outcome = resolve_and_export(&batch(), dir.path(), &config)
            .await
            .expect("Pipeline should succeed");

        assert!(outcome.summary_path.is_none());
        assert!(!dir.path().join("contacts.csv").exists());
    }

    #[tokio::test]
    async fn summary_name_clash_is_config_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = ExportConfig::default().summary_file(Some("records_U1.csv".into()));

        let err = resolve_and_export(&batch(), dir.path(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }
}
