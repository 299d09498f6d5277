//! Property tests over the public collection API.

use minibase_core::{Collection, Record, RecordId, Value};
use proptest::prelude::*;
use std::collections::BTreeMap;
use tempfile::tempdir;

fn field_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1_000_000i32..1_000_000).prop_map(|n| Value::Float(f64::from(n) + 0.5)),
        "[a-z]{0,12}".prop_map(Value::String),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn inserts_get_consecutive_ids(n in 0usize..200) {
        let collection = Collection::new("props");
        let ids: Vec<RecordId> = (0..n).map(|_| collection.insert_record(Record::new())).collect();
        let expected: Vec<RecordId> = (1..=n as u64).map(RecordId::new).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn flushed_fields_round_trip(
        fields in proptest::collection::btree_map("[a-z]{1,8}", field_value(), 0..8),
    ) {
        let temp = tempdir().unwrap();
        let writer = Collection::new("props");
        writer.set_directory(temp.path());
        let id = writer.insert_record(Record::from_fields(fields.clone()));
        writer.flush_records().unwrap();

        let reader = Collection::new("props");
        reader.set_directory(temp.path());
        let loaded = reader.get_record_by_id(id).unwrap();
        let expected: BTreeMap<String, Value> = fields;
        prop_assert_eq!(loaded.fields(), &expected);
    }
}
