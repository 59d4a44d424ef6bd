//! Recordset attribution: parsing, flattening and per-recordset contact pivot.

mod aggregate;
mod flatten;
mod models;

pub use aggregate::{aggregate_contacts, AggregatedSource, ContactSlot};
pub use flatten::flatten_contacts;
pub use models::{Contact, ContactRow, SourceMetadata};
