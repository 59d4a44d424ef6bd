use thiserror::Error;

/// Application-wide error type.
///
/// Per-source export failures never surface here; they are collected into
/// [`crate::streaming::ExportReport`] so one bad recordset cannot abort a batch.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Input ─────────────────────────────────────────────────────────────────
    #[error("Invalid search batch: {0}")]
    InvalidBatch(String),

    #[error("Record {index} has no '{field}' value")]
    MissingSourceReference { index: usize, field: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Export ────────────────────────────────────────────────────────────────
    #[error("Recordset uuid {0:?} cannot be used as a file name")]
    DegenerateSourceUuid(String),

    #[error("Export file {file_name} already claimed by recordset {claimed_by}")]
    DestinationCollision {
        file_name: String,
        claimed_by: String,
    },

    #[error("CSV write error: {0}")]
    CsvWrite(String),

    // ── File system ───────────────────────────────────────────────────────────
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ── Generic fallback ──────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidBatch(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::CsvWrite(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = AppError::MissingSourceReference {
            index: 4,
            field: "recordset".into(),
        };
        assert_eq!(err.to_string(), "Record 4 has no 'recordset' value");

        let err = AppError::DestinationCollision {
            file_name: "records_a.csv".into(),
            claimed_by: "a".into(),
        };
        assert!(err.to_string().contains("records_a.csv"));
        assert!(err.to_string().contains("claimed by recordset a"));
    }

    #[test]
    fn degenerate_uuid_is_debug_quoted() {
        let err = AppError::DegenerateSourceUuid("  ".into());
        assert_eq!(
            err.to_string(),
            "Recordset uuid \"  \" cannot be used as a file name"
        );
    }

    #[test]
    fn json_errors_become_invalid_batch() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::InvalidBatch(_)));
    }

    #[test]
    fn io_errors_convert_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }
}
