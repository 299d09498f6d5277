//! minibase CLI
//!
//! Command-line access to minibase collections.
//!
//! # Commands
//!
//! - `insert` - Add a record and flush it
//! - `get` - Print a record as JSON
//! - `update` - Change fields of a record and flush it
//! - `delete` - Remove a record from its chunk file
//! - `inspect` - List chunk files and record counts

mod commands;

use clap::{Parser, Subcommand};
use minibase_core::{Config, DEFAULT_CHUNK_SIZE};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// minibase command-line tools.
#[derive(Parser)]
#[command(name = "minibase")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory that holds the collection directory
    #[arg(global = true, short, long, default_value = ".")]
    dir: PathBuf,

    /// Collection name
    #[arg(global = true, short, long, default_value = "minibase")]
    collection: String,

    /// Identifiers per chunk file
    #[arg(global = true, long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: u64,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert a record built from name=value fields
    Insert {
        /// Fields as name=value; values are parsed as JSON, else taken as text
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Print a record
    Get {
        /// Record identifier
        id: u64,
    },

    /// Set fields on an existing record
    Update {
        /// Record identifier
        id: u64,

        /// Fields as name=value
        #[arg(required = true)]
        fields: Vec<String>,

        /// Drop fields that are not given instead of keeping them
        #[arg(short, long)]
        replace: bool,
    },

    /// Delete a record
    Delete {
        /// Record identifier
        id: u64,
    },

    /// List chunk files
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let target = commands::Target {
        dir: cli.dir,
        name: cli.collection,
        config: Config::new().chunk_size(cli.chunk_size),
    };

    match cli.command {
        Commands::Insert { fields } => commands::insert::run(&target, &fields)?,
        Commands::Get { id } => commands::get::run(&target, id)?,
        Commands::Update {
            id,
            fields,
            replace,
        } => commands::update::run(&target, id, &fields, replace)?,
        Commands::Delete { id } => commands::delete::run(&target, id)?,
        Commands::Inspect { format } => commands::inspect::run(&target, &format)?,
        Commands::Version => {
            println!("minibase CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("minibase core v{}", minibase_core::VERSION);
        }
    }

    Ok(())
}
