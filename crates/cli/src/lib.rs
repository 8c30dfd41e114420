pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "surfacefit",
    about = "SurfaceFit operator CLI",
    long_about = "Prepare the SurfaceFit catalog database, build the semantic index, inspect configuration, and run suitability checks.",
    after_help = "Examples:\n  surfacefit migrate\n  surfacefit seed\n  surfacefit build-index\n  surfacefit check 100002 bathroom_floor\n  surfacefit doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog and verify it")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, database connectivity, and semantic index presence")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Embed every catalog product and write the semantic index file")]
    BuildIndex,
    #[command(about = "Run the suitability rules for one product and use case")]
    Check {
        #[arg(help = "Product id, e.g. 100002")]
        product_id: String,
        #[arg(help = "Use case, e.g. bathroom_floor or shower_wall")]
        use_case: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::BuildIndex => commands::build_index::run(),
        Command::Check { product_id, use_case } => commands::check::run(&product_id, &use_case),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
