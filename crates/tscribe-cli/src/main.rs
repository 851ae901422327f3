use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use tscribe_cli::{generate, load_config};

#[derive(Parser)]
#[command(name = "tscribe")]
#[command(about = "Compile reflected class graphs into TypeScript declarations", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate TypeScript from a source graph
    Generate {
        /// Input source graph (JSON format)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Config file with [compiler] and [output] tables
        #[arg(short, long, env = "TSCRIBE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Check a config file without compiling anything
    Validate {
        /// Config file to check
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // RUST_LOG still wins when set
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.debug)
        .init();

    match cli.command {
        Commands::Generate {
            input,
            output,
            config,
        } => handle_generate(input, output, config),
        Commands::Validate { config } => {
            load_config(Some(&config))?;
            info!("Config {:?} is valid", config);
            Ok(())
        }
    }
}

fn handle_generate(input: PathBuf, output: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let report = generate(&input, &output, &config)?;

    info!("Emitted {} declaration(s)", report.declarations);
    if !report.diagnostics.is_empty() {
        warn!("{}", report.diagnostics.format_summary());
    }
    Ok(())
}
