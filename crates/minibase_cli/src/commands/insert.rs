//! Insert command implementation.

use super::{parse_fields, Target};
use minibase_core::Record;
use tracing::info;

/// Runs the insert command.
pub fn run(target: &Target, fields: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let record = Record::from_fields(parse_fields(fields)?);
    let collection = target.open()?;

    let id = collection.insert_record(record);
    collection.flush_records()?;

    info!(%id, collection = %target.name, "inserted record");
    println!("{id}");
    Ok(())
}
