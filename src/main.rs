use clap::{Parser, Subcommand};
use rand::RngCore;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use tidelands::cli::commands;
use tidelands::config::SimulationConfig;

#[derive(Parser)]
#[command(name = "tidelands")]
#[command(about = "A real-time hex-tile ecosystem simulation engine")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new world and write its first save
    Generate {
        /// World seed; random when omitted
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Run the simulation from the latest save
    Run {
        /// Path to a specific save file to load
        #[arg(short, long)]
        world: Option<String>,
    },

    /// Inspect world or tile state from the latest save
    Inspect {
        /// Tile x coordinate
        #[arg(long)]
        x: Option<i32>,

        /// Tile z coordinate
        #[arg(long)]
        z: Option<i32>,

        /// Show world-level summary
        #[arg(long)]
        world: bool,
    },

    /// Manage world saves
    Saves {
        #[command(subcommand)]
        action: SaveAction,
    },
}

#[derive(Subcommand)]
enum SaveAction {
    /// List available saves
    List {
        /// Save directory; defaults to the configured one
        #[arg(short, long)]
        dir: Option<String>,
    },
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: &str) -> SimulationConfig {
    match SimulationConfig::from_file(Path::new(path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(&cli.config);
    init_tracing(&config.log_level);

    match cli.command {
        Commands::Generate { seed } => {
            let seed = seed.unwrap_or_else(|| rand::thread_rng().next_u64());
            if let Err(e) = commands::generate(&config, seed) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Run { world } => {
            if let Err(e) = commands::run_simulation(&config, world.as_deref()).await {
                eprintln!("Simulation error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Inspect { x, z, world } => {
            let tile = match (x, z) {
                (Some(x), Some(z)) => Some((x, z)),
                (None, None) => None,
                _ => {
                    eprintln!("Error: --x and --z must be given together");
                    std::process::exit(1);
                }
            };
            if let Err(e) = commands::inspect(&config, tile, world) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Saves { action } => match action {
            SaveAction::List { dir } => {
                let dir = dir.unwrap_or_else(|| config.save_directory.clone());
                if let Err(e) = commands::list_saves(Path::new(&dir)) {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        },
    }
}
