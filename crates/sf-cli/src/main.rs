//! CLI frontend for the Swarmfall simulation kernel.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sf",
    about = "Swarmfall: run and inspect tower-defense levels headlessly",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a level from a manifest without a window
    Simulate {
        /// Level manifest (JSON)
        manifest: PathBuf,

        /// Index of the level to start on
        #[arg(short, long, default_value = "0")]
        level: usize,

        /// Number of frames to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,

        /// Seconds per frame
        #[arg(long, default_value = "0.0166667")]
        dt: f32,

        /// RNG seed for deterministic simulation
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Spend inventory every frame on placeable tiles, round-robin
        #[arg(short, long)]
        auto_place: bool,

        /// JSON file overriding simulation defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show all events (not just summary)
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decode a map image and show what it contains
    Inspect {
        /// Map image (PNG)
        map: PathBuf,

        /// Tile edge length in pixels
        #[arg(long, default_value = "60")]
        tile_size: f32,
    },

    /// List the levels of a manifest
    Levels {
        /// Level manifest (JSON)
        manifest: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            manifest,
            level,
            ticks,
            dt,
            seed,
            auto_place,
            config,
            verbose,
        } => commands::simulate::run(&commands::simulate::Options {
            manifest,
            level,
            ticks,
            dt,
            seed,
            auto_place,
            config,
            verbose,
        }),
        Commands::Inspect { map, tile_size } => commands::inspect::run(&map, tile_size),
        Commands::Levels { manifest } => commands::levels::run(&manifest),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
