use std::collections::BTreeMap;

use super::records::Record;

/// Record count per recordset reference.
pub type RecordTally = BTreeMap<String, u64>;

/// Counts records per `source_reference`. An empty batch gives an empty map.
pub fn tally_records(records: &[Record]) -> RecordTally {
    let mut tally = RecordTally::new();
    for record in records {
        *tally.entry(record.source_reference.clone()).or_insert(0) += 1;
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn record(source: &str) -> Record {
        Record::new(source, Map::new())
    }

    #[test]
    fn counts_per_reference() {
        let records = vec![record("U1"), record("U3"), record("U1"), record("U1")];
        let tally = tally_records(&records);

        assert_eq!(tally.len(), 2);
        assert_eq!(tally["U1"], 3);
        assert_eq!(tally["U3"], 1);
    }

    #[test]
    fn empty_batch_empty_tally() {
        assert!(tally_records(&[]).is_empty());
    }
}
