//! CLI frontend for the Wayfarer navigation engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "wf",
    about = "Wayfarer: rooms, exits and parties on the move",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new world directory with a template world file
    Init {
        /// Name of the world to create
        name: String,
    },

    /// Validate a world file and report dangling references
    Check {
        /// Path to the world file
        file: PathBuf,
    },

    /// List authored rooms and procedural regions
    Rooms {
        /// Path to the world file
        file: PathBuf,

        /// Only show this region
        #[arg(short, long)]
        region: Option<String>,
    },

    /// Move an actor through a world, one step at a time
    ///
    /// Steps are exit names, or one of: sneak:EXIT, open:EXIT, close:EXIT,
    /// lock:EXIT, unlock:EXIT, @LOCATION (teleport), portal:LOCATION,
    /// search, wait[:TICKS].
    Walk {
        /// Path to the world file
        file: PathBuf,

        /// Name of the actor to move
        #[arg(short, long)]
        actor: String,

        /// Steps to take, in order
        #[arg(required = true)]
        steps: Vec<String>,

        /// RNG seed for deterministic rolls
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Show the full narration log
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { name } => commands::init::run(&name),
        Commands::Check { file } => commands::check::run(&file),
        Commands::Rooms { file, region } => commands::rooms::run(&file, region.as_deref()),
        Commands::Walk {
            file,
            actor,
            steps,
            seed,
            verbose,
        } => commands::walk::run(&file, &actor, &steps, seed, verbose),
    };

    if let Err(e) = result {
        eprintln!("{:?}", miette::miette!("{e}"));
        process::exit(1);
    }
}
