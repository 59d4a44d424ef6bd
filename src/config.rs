//! Run configuration for contact resolution and per-recordset export.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Number of contact slots grouped at the front of the contact columns.
pub const DEFAULT_CONTACT_CAP: usize = 10;

/// Record field that carries the contributing recordset uuid.
pub const DEFAULT_SOURCE_FIELD: &str = "recordset";

/// Default number of export files written at the same time.
pub const DEFAULT_MAX_CONCURRENT_WRITES: usize = 4;

// ─────────────────────────────────────────────────────────────────────────────
// ExportConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for one resolve-and-export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Contact slots kept in the bounded prefix; later contacts overflow.
    pub contact_cap: usize,
    /// Record field holding the recordset uuid.
    pub source_field: String,
    /// Export file name prefix (`records_<uuid>.csv`).
    pub file_prefix: String,
    /// Export file extension, without the dot.
    pub file_extension: String,
    /// Field delimiter for every CSV written.
    pub delimiter: u8,
    /// Add contact-less rows for batch recordsets that have no contacts.
    pub include_undocumented_sources: bool,
    /// Upper bound on export files written concurrently.
    pub max_concurrent_writes: usize,
    /// File name for the SourceTable CSV, or `None` to skip it.
    pub summary_file: Option<String>,
    /// Treat export file names differing only by case as colliding. Enable
    /// when the destination file system folds case.
    pub case_insensitive_file_names: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            contact_cap: DEFAULT_CONTACT_CAP,
            source_field: DEFAULT_SOURCE_FIELD.to_string(),
            file_prefix: "records_".to_string(),
            file_extension: "csv".to_string(),
            delimiter: b',',
            include_undocumented_sources: true,
            max_concurrent_writes: DEFAULT_MAX_CONCURRENT_WRITES,
            summary_file: Some("contacts.csv".to_string()),
            case_insensitive_file_names: false,
        }
    }
}

impl ExportConfig {
    /// Sets the bounded contact slot count.
    pub fn contact_cap(mut self, cap: usize) -> Self {
        self.contact_cap = cap;
        self
    }

    /// Sets the record field holding the recordset uuid.
    pub fn source_field(mut self, field: impl Into<String>) -> Self {
        self.source_field = field.into();
        self
    }

    /// Sets the export file name prefix.
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Sets the CSV delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Toggles contact-less rows for undocumented recordsets.
    pub fn include_undocumented_sources(mut self, include: bool) -> Self {
        self.include_undocumented_sources = include;
        self
    }

    /// Sets the concurrent write limit.
    pub fn max_concurrent_writes(mut self, max: usize) -> Self {
        self.max_concurrent_writes = max;
        self
    }

    /// Sets or clears the SourceTable CSV file name.
    pub fn summary_file(mut self, name: Option<String>) -> Self {
        self.summary_file = name;
        self
    }

    /// Toggles case-folded file name collision checks.
    pub fn case_insensitive_file_names(mut self, fold: bool) -> Self {
        self.case_insensitive_file_names = fold;
        self
    }

    /// Builds the export file name for a recordset uuid.
    pub fn export_file_name(&self, source_uuid: &str) -> String {
        format!("{}{}.{}", self.file_prefix, source_uuid, self.file_extension)
    }

    /// Key under which a file name is claimed in the destination directory.
    pub fn file_name_key(&self, file_name: &str) -> String {
        if self.case_insensitive_file_names {
            file_name.to_lowercase()
        } else {
            file_name.to_string()
        }
    }

    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.contact_cap == 0 {
            return Err(AppError::InvalidConfig(
                "contact_cap must be greater than 0".into(),
            ));
        }
        if self.max_concurrent_writes == 0 {
            return Err(AppError::InvalidConfig(
                "max_concurrent_writes must be greater than 0".into(),
            ));
        }
        if self.source_field.trim().is_empty() {
            return Err(AppError::InvalidConfig("source_field is empty".into()));
        }
        if self.file_extension.is_empty() || self.file_extension.contains(&['/', '\\'][..]) {
            return Err(AppError::InvalidConfig(format!(
                "file_extension {:?} is not usable",
                self.file_extension
            )));
        }
        if self.file_prefix.contains(&['/', '\\'][..]) {
            return Err(AppError::InvalidConfig(format!(
                "file_prefix {:?} contains a path separator",
                self.file_prefix
            )));
        }
        if let Some(summary) = &self.summary_file {
            if summary.trim().is_empty() || summary.contains(&['/', '\\'][..]) {
                return Err(AppError::InvalidConfig(format!(
                    "summary_file {:?} must be a plain file name",
                    summary
                )));
            }
        }
        if matches!(self.delimiter, b'"' | b'\n' | b'\r') {
            return Err(AppError::InvalidConfig(
                "delimiter cannot be a quote or line break".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_export_conventions() {
        let config = ExportConfig::default();
        assert_eq!(config.contact_cap, 10);
        assert_eq!(config.source_field, "recordset");
        assert_eq!(config.export_file_name("abc-123"), "records_abc-123.csv");
        assert!(config.include_undocumented_sources);
        assert!(!config.case_insensitive_file_names);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn setters_chain() {
        let config = ExportConfig::default()
            .contact_cap(3)
            .file_prefix("rs_")
            .delimiter(b'\t')
            .include_undocumented_sources(false)
            .summary_file(None);
        assert_eq!(config.contact_cap, 3);
        assert_eq!(config.export_file_name("u1"), "rs_u1.csv");
        assert_eq!(config.delimiter, b'\t');
        assert!(!config.include_undocumented_sources);
        assert!(config.summary_file.is_none());
    }

    #[test]
    fn file_name_key_folds_case_only_when_enabled() {
        let exact = ExportConfig::default();
        assert_ne!(
            exact.file_name_key("records_ABC.csv"),
            exact.file_name_key("records_abc.csv")
        );

        let folded = ExportConfig::default().case_insensitive_file_names(true);
        assert_eq!(
            folded.file_name_key("records_ABC.csv"),
            folded.file_name_key("records_abc.csv")
        );
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(ExportConfig::default().contact_cap(0).validate().is_err());
        assert!(ExportConfig::default()
            .max_concurrent_writes(0)
            .validate()
            .is_err());
        assert!(ExportConfig::default().source_field(" ").validate().is_err());
        assert!(ExportConfig::default().file_prefix("a/b").validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ExportConfig =
            serde_json::from_str(r#"{"contact_cap": 2, "file_prefix": "x_"}"#).unwrap();
        assert_eq!(config.contact_cap, 2);
        assert_eq!(config.file_prefix, "x_");
        assert_eq!(config.file_extension, "csv");
        assert_eq!(config.max_concurrent_writes, DEFAULT_MAX_CONCURRENT_WRITES);
    }
}
