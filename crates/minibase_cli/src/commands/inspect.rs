//! Inspect command implementation.

use super::Target;
use serde::Serialize;

/// Collection inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Collection storage path.
    pub path: String,
    /// Identifiers per chunk file.
    pub chunk_size: u64,
    /// Identifier the next insert would receive.
    pub next_id: u64,
    /// Total records across all chunks.
    pub record_count: usize,
    /// Per-chunk statistics.
    pub chunks: Vec<ChunkStats>,
}

/// Statistics for a single chunk file.
#[derive(Debug, Serialize)]
pub struct ChunkStats {
    /// File name.
    pub file: String,
    /// Number of records in the file.
    pub records: usize,
}

/// Runs the inspect command.
pub fn run(target: &Target, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let collection = target.open()?;
    let path = collection.storage_path();
    if !path.is_dir() {
        return Err(format!("No collection found at {}", path.display()).into());
    }

    let chunks: Vec<ChunkStats> = collection
        .chunk_summaries()?
        .into_iter()
        .map(|summary| ChunkStats {
            file: summary.range.file_name(),
            records: summary.records,
        })
        .collect();

    let result = InspectResult {
        path: path.display().to_string(),
        chunk_size: collection.config().chunk_size,
        next_id: collection.next_id().as_u64(),
        record_count: chunks.iter().map(|c| c.records).sum(),
        chunks,
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("Collection: {}", result.path);
    println!("Chunk size: {}", result.chunk_size);
    println!("Next ID:    {}", result.next_id);
    println!("Records:    {}", result.record_count);
    println!();
    println!("Chunks ({}):", result.chunks.len());
    for chunk in &result.chunks {
        println!("  {:<24} {:>6} records", chunk.file, chunk.records);
    }
}
