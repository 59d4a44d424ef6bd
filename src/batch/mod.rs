//! Search batch input and per-recordset record counts.

mod records;
mod tally;

pub use records::{Record, SearchBatch};
pub use tally::{tally_records, RecordTally};
