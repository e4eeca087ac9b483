//! `ptoolkit`: review and label prompts extracted from log exports.

mod resources;
mod shell;

use clap::{Parser, Subcommand};
use ptoolkit_core::{extract, Config};
use resources::Resources;
use shell::{run_cataloger, CatalogerArgs};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ptoolkit", about = "Prompt review toolkit", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Page through prompts and label them, resuming previous progress
    Cataloger {
        /// Source table (defaults to the last one used)
        #[arg(short, long)]
        source: Option<PathBuf>,
        /// Target label table (defaults to the last one used)
        #[arg(short, long)]
        target: Option<PathBuf>,
        /// Interface language
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// Dataset preparation commands
    #[command(subcommand)]
    Data(DataCommands),
}

#[derive(Subcommand)]
enum DataCommands {
    /// Convert a raw JSON log export into a source table
    EsToCsv {
        input: PathBuf,
        output: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ptoolkit=info,ptoolkit_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: Cli, config: &Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Cataloger {
            source,
            target,
            lang,
        } => {
            let resources = Resources::builtin();
            let args = CatalogerArgs {
                source,
                target,
                lang,
            };
            run_cataloger(config, &resources, args, io::stdin().lock(), io::stdout().lock())
        }
        Commands::Data(DataCommands::EsToCsv { input, output }) => {
            let summary = extract::json_to_csv(&input, &output)?;
            println!(
                "Wrote {} prompts to {} ({} invalid, {} duplicate skipped)",
                summary.written,
                output.display(),
                summary.skipped_invalid,
                summary.skipped_duplicate
            );
            Ok(())
        }
    }
}

fn run_and_report<F, E>(runner: F) -> i32
where
    F: FnOnce() -> Result<(), E>,
    E: std::fmt::Display,
{
    match runner() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("ptoolkit error: {:#}", err);
            1
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env();
    let exit_code = run_and_report(|| run(cli, &config));
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
