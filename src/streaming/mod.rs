//! Per-recordset export: pure planning plus atomic CSV output.
//!
//! [`plan_exports`] splits a batch into export units without touching the
//! file system; [`write_exports`] writes them, isolating failures per
//! recordset.

mod atomic_writer;
mod export;
mod writer;

pub use atomic_writer::AtomicCsvWriter;
pub use export::{check_source_uuid, plan_exports, ExportFailure, ExportPlan, ExportUnit};
pub use writer::{write_export_unit, write_exports, write_source_table, ExportReport, WrittenExport};
