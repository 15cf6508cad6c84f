use clap::Parser;
use gradebook_ingest::cli::{args::Args, commands};
use std::process;

/// Exit code when at least one input file was rejected
const EXIT_FILES_REJECTED: i32 = 2;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(stats) if stats.is_clean() => process::exit(0),
        Ok(stats) => {
            eprintln!(
                "{} of {} files were rejected",
                stats.files_rejected,
                stats.files_rejected + stats.files_processed
            );
            process::exit(EXIT_FILES_REJECTED);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Gradebook Ingest - Gradebook Upload Reconciliation");
    println!("==================================================");
    println!();
    println!("Reconcile teacher gradebook spreadsheets (template layout or Google");
    println!("Classroom exports) into a persistent store of students, assignments");
    println!("and grades, with a report of every change, skip and conflict.");
    println!();
    println!("USAGE:");
    println!("    gradebook-ingest <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    ingest      Ingest one or more gradebook files into the store");
    println!("    template    Write a blank upload template");
    println!("    inspect     Show what the store currently holds");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Ingest a period's gradebook, tagging new assignments:");
    println!("    gradebook-ingest ingest period1.csv --tag \"Term 1\"");
    println!();
    println!("    # Preview several uploads without saving:");
    println!("    gradebook-ingest ingest 'uploads/*.csv' --dry-run --format json");
    println!();
    println!("    # Write a template with named assignment columns:");
    println!("    gradebook-ingest template grades.csv -a \"Quiz 1\" -a \"Essay\"");
    println!();
    println!("    # Summarize the store:");
    println!("    gradebook-ingest inspect --detailed");
    println!();
    println!("EXIT STATUS:");
    println!("    0  every file was ingested");
    println!("    1  the run failed (configuration or storage error)");
    println!("    2  at least one file was rejected");
}
