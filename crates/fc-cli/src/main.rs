//! CLI frontend for the flat check engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "flatcheck",
    about = "Flat checks: work out the DC, roll, reroll",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log state transitions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the flat check an origin needs against its targets
    Dc {
        /// Origin conditions, comma-separated (e.g. dazzled)
        #[arg(short, long, default_value = "")]
        origin: String,

        /// Conditions of one targeted token, comma-separated; repeat per target
        #[arg(short, long = "target", required = true)]
        targets: Vec<String>,
    },

    /// Populate a chat message with flat checks, roll them, and optionally reroll
    Message(commands::message::MessageArgs),

    /// Print the effective configuration as JSON
    Config,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Dc { origin, targets } => commands::dc::run(&origin, &targets),
        Commands::Message(args) => commands::message::run(&args, &config),
        Commands::Config => commands::config::run(&config),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
