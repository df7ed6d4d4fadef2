//! Skirmish CLI - Command-line interface for running and checking Skirmish matches.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use std::process::ExitCode;

/// Skirmish - A deterministic two-team robot match engine
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single match between two built-in strategies
    Run {
        #[command(flatten)]
        match_args: cli::MatchArgs,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save the match log to file
        #[arg(long)]
        save: Option<std::path::PathBuf>,

        /// Suppress the match banner
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run many seeded matches in parallel and aggregate the results
    Series {
        #[command(flatten)]
        match_args: cli::MatchArgs,

        /// Number of matches to play
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Number of parallel threads (default: number of CPUs)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(long, default_value = "true")]
        progress: bool,
    },

    /// Validate a map file against the competition rules
    Validate {
        /// Map file (JSON)
        #[arg(required = true)]
        map: std::path::PathBuf,
    },

    /// Write a generated symmetric map to a file
    SampleMap {
        /// Output file
        #[arg(short, long, default_value = "sample_map.json")]
        output: std::path::PathBuf,

        /// Generator seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Map width
        #[arg(long, default_value = "30")]
        width: i32,

        /// Map height
        #[arg(long, default_value = "30")]
        height: i32,

        /// Round limit stored in the map
        #[arg(short, long, default_value = "2000")]
        rounds: u32,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));
    // A second init only happens in tests; keep the first logger
    let _ = builder.try_init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Run {
            match_args,
            format,
            save,
            quiet,
        } => cli::run::execute(&match_args, format, save, quiet),

        Commands::Series {
            match_args,
            games,
            threads,
            format,
            progress,
        } => cli::series::execute(&match_args, games, threads, format, progress),

        Commands::Validate { map } => cli::validate::execute(&map),

        Commands::SampleMap {
            output,
            seed,
            width,
            height,
            rounds,
        } => cli::sample_map::execute(&output, seed, width, height, rounds),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
