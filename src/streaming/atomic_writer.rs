//! Atomic CSV file writer with automatic cleanup on failure.
//!
//! Writes to a temporary file in the same directory as the destination,
//! then atomically replaces the destination on `finish()`. If dropped
//! before finishing, the temporary file is automatically cleaned up.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use tempfile::NamedTempFile;

use crate::error::AppError;

/// An atomic CSV writer used for every export file.
///
/// A half-written export never appears under its final name: the rows go
/// to a temporary sibling file that is persisted only by `finish()`.
pub struct AtomicCsvWriter {
    writer: Writer<BufWriter<NamedTempFile>>,
    final_path: PathBuf,
    rows_written: usize,
}

impl AtomicCsvWriter {
    /// Creates a writer targeting `final_path` with the given field delimiter.
    ///
    /// # Errors
    ///
    /// Returns `AppError::CsvWrite` if the parent directory cannot be
    /// determined or the temporary file cannot be created.
    pub fn new(final_path: impl AsRef<Path>, delimiter: u8) -> Result<Self, AppError> {
        let final_path = final_path.as_ref().to_path_buf();

        let parent_dir = final_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        if final_path.file_name().is_none() {
            return Err(AppError::CsvWrite(format!(
                "Not a file path: {}",
                final_path.display()
            )));
        }

        let temp_file = NamedTempFile::new_in(parent_dir)
            .map_err(|e| AppError::CsvWrite(format!("Failed to create temporary file: {}", e)))?;

        let writer = WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(BufWriter::new(temp_file));

        Ok(Self {
            writer,
            final_path,
            rows_written: 0,
        })
    }

    /// Writes the header row. Not counted in `rows_written`.
    pub fn write_header<I, T>(&mut self, header: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(header)?;
        Ok(())
    }

    /// Writes one data row.
    pub fn write_row<I, T>(&mut self, row: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(row)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Data rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flushes all buffers and atomically persists the file to the final path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::CsvWrite` if flushing or persisting fails. The
    /// temporary file is removed on error.
    pub fn finish(self) -> Result<PathBuf, AppError> {
        let buf_writer = self.writer.into_inner().map_err(|e| {
            AppError::CsvWrite(format!("Failed to flush CSV writer: {}", e.error()))
        })?;

        let named_temp = buf_writer
            .into_inner()
            .map_err(|e| AppError::CsvWrite(format!("Failed to flush buffer: {}", e.error())))?;

        named_temp.persist(&self.final_path).map_err(|e| {
            AppError::CsvWrite(format!(
                "Failed to persist file to {}: {}",
                self.final_path.display(),
                e.error
            ))
        })?;

        Ok(self.final_path)
    }
}
