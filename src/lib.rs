pub mod attribution;
pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod streaming;
pub mod table;

pub use attribution::{AggregatedSource, Contact, ContactRow, ContactSlot, SourceMetadata};
pub use batch::{Record, RecordTally, SearchBatch};
pub use config::ExportConfig;
pub use error::AppError;
pub use pipeline::{resolve_and_export, resolve_source_table, PipelineOutcome};
pub use streaming::{ExportFailure, ExportReport, ExportUnit, WrittenExport};
pub use table::{SourceRow, SourceTable};
