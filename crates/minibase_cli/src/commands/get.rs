//! Get command implementation.

use super::Target;
use minibase_core::RecordId;

/// Runs the get command.
pub fn run(target: &Target, id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let collection = target.open()?;
    let record = collection.get_record_by_id(RecordId::new(id))?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
