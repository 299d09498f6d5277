//! Delete command implementation.

use super::Target;
use minibase_core::RecordId;
use tracing::info;

/// Runs the delete command.
pub fn run(target: &Target, id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let id = RecordId::new(id);
    let collection = target.open()?;
    collection.delete_record(id)?;

    info!(%id, collection = %target.name, "deleted record");
    Ok(())
}
