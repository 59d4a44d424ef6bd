//! File output for export units and the SourceTable summary.
//!
//! Each unit is written on tokio's blocking pool, at most
//! `max_concurrent_writes` at a time. A failure is recorded against its
//! recordset and the remaining units still run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::atomic_writer::AtomicCsvWriter;
use super::export::{ExportFailure, ExportUnit};
use crate::config::ExportConfig;
use crate::error::AppError;
use crate::table::SourceTable;

/// A successfully written export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenExport {
    pub source_uuid: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Outcome of writing every planned export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub written: Vec<WrittenExport>,
    pub failed: Vec<ExportFailure>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn rows_written(&self) -> usize {
        self.written.iter().map(|w| w.rows).sum()
    }
}

/// Writes a single unit to `path`. Returns the number of data rows.
pub fn write_export_unit(
    unit: &ExportUnit,
    path: &Path,
    delimiter: u8,
) -> Result<usize, AppError> {
    let mut writer = AtomicCsvWriter::new(path, delimiter)?;
    writer.write_header(&unit.headers)?;
    for row in &unit.rows {
        writer.write_row(row)?;
    }
    let rows = writer.rows_written();
    writer.finish()?;
    Ok(rows)
}

/// Writes every unit into `dest_dir`, creating the directory if needed.
///
/// The report lists written files and failures in unit order.
///
/// # Errors
///
/// Only setup failures (the destination directory cannot be created) are
/// returned as `Err`; per-unit failures land in [`ExportReport::failed`].
pub async fn write_exports(
    units: Vec<ExportUnit>,
    dest_dir: &Path,
    config: &ExportConfig,
) -> Result<ExportReport, AppError> {
    tokio::fs::create_dir_all(dest_dir).await?;

    let sem = Arc::new(Semaphore::new(config.max_concurrent_writes.max(1)));
    let delimiter = config.delimiter;

    let mut handles = Vec::with_capacity(units.len());
    for unit in units {
        let sem = sem.clone();
        let path = dest_dir.join(&unit.file_name);
        let source_uuid = unit.source_uuid.clone();

        let handle = tokio::spawn(async move {
            let _permit = sem
                .acquire_owned()
                .await
                .map_err(|e| AppError::Internal(format!("Write scheduler closed: {}", e)))?;

            let written = tokio::task::spawn_blocking(move || {
                write_export_unit(&unit, &path, delimiter).map(|rows| (path, rows))
            })
            .await
            .map_err(|e| AppError::Internal(format!("Export task panicked: {}", e)))??;
            Ok::<_, AppError>(written)
        });

        handles.push((source_uuid, handle));
    }

    let mut report = ExportReport::default();
    for (source_uuid, handle) in handles {
        let outcome = handle
            .await
            .map_err(|e| AppError::Internal(format!("Export task join error: {}", e)))
            .and_then(|result| result);

        match outcome {
            Ok((path, rows)) => {
                debug!(
                    "[Export] Wrote {} rows for {} to {}",
                    rows,
                    source_uuid,
                    path.display()
                );
                report.written.push(WrittenExport {
                    source_uuid,
                    path,
                    rows,
                });
            }
            Err(e) => {
                warn!("[Export] Failed to write recordset {}: {}", source_uuid, e);
                report.failed.push(ExportFailure::new(source_uuid, &e));
            }
        }
    }

    info!(
        "[Export] Wrote {} files ({} rows), {} failed",
        report.written.len(),
        report.rows_written(),
        report.failed.len()
    );

    Ok(report)
}

/// Writes the SourceTable as CSV in schema column order.
pub fn write_source_table(
    table: &SourceTable,
    path: &Path,
    delimiter: u8,
) -> Result<PathBuf, AppError> {
    let mut writer = AtomicCsvWriter::new(path, delimiter)?;
    writer.write_header(table.headers())?;
    for cells in table.cells() {
        writer.write_row(cells)?;
    }
    writer.finish()
}
