//! Update command implementation.

use super::{parse_fields, Target};
use minibase_core::{Record, RecordId};
use tracing::info;

/// Runs the update command.
///
/// Without `replace`, the given fields are set on the existing record and
/// its other fields are kept.
pub fn run(
    target: &Target,
    id: u64,
    fields: &[String],
    replace: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = RecordId::new(id);
    let fields = parse_fields(fields)?;
    let collection = target.open()?;

    let record = if replace {
        Record::from_fields(fields)
    } else {
        let mut record = collection.get_record_by_id(id)?;
        for (name, value) in fields {
            record.add_field(name, value);
        }
        record
    };

    collection.update_record(id, record)?;
    collection.flush_records()?;

    info!(%id, collection = %target.name, replace, "updated record");
    Ok(())
}
