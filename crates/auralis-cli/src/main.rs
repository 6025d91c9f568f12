//! Auralis CLI - inspect presets, plan and simulate audio graphs offline.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "auralis")]
#[command(author, version, about = "Auralis audio graph engine CLI", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List factory processing presets
    Presets(commands::presets::PresetsArgs),

    /// Print the planned topology for a settings snapshot
    Plan(commands::plan::PlanArgs),

    /// Run a session frame by frame against the offline backend
    Simulate(commands::simulate::SimulateArgs),

    /// Export the generated reverb impulse as WAV
    Impulse(commands::impulse::ImpulseArgs),
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(fallback)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Impulse(args) => commands::impulse::run(args),
    }
}
