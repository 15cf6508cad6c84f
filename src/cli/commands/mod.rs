//! Command implementations for the gradebook ingest CLI
//!
//! Each subcommand lives in its own module:
//! - `ingest`: run upload files through the pipeline into the JSON store
//! - `template`: write a blank upload template
//! - `inspect`: summarize the store's contents

pub mod ingest;
pub mod inspect;
pub mod shared;
pub mod template;

// Re-export the main types for easy access
pub use shared::RunStats;

use crate::Result;
use crate::cli::args::{Args, Commands};

/// Dispatch to the selected subcommand
///
/// Without a subcommand there is nothing to run; `main` prints help first.
pub fn run(args: Args) -> Result<RunStats> {
    match args.command {
        Some(Commands::Ingest(ingest_args)) => ingest::run_ingest(ingest_args),
        Some(Commands::Template(template_args)) => template::run_template(template_args),
        Some(Commands::Inspect(inspect_args)) => inspect::run_inspect(inspect_args),
        None => Ok(RunStats::default()),
    }
}
