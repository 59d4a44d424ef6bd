//! The per-recordset contact table: column layout and composition.

mod compose;
mod schema;

pub use compose::{compose_source_table, SourceRow, SourceTable};
pub use schema::{Column, ColumnSchema};
