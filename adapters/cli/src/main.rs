#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Geocoin experience.

mod config;
mod save;
mod session;
mod wander;

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::session::Session;

/// Entry point for the Geocoin command-line interface.
fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        error!("geocoin session failed: {error:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.mode {
        Mode::Play(args) => {
            let settings = config::load(&args.config)?;
            let mut session = Session::start(settings, args.save)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            session.run(stdin.lock(), &mut stdout.lock())
        }
        Mode::Wander(args) => {
            let settings = config::load(&args.session.config)?;
            let mut session = Session::start(settings, args.session.save.clone())?;
            let report = wander::run(&mut session, args.steps, args.seed);
            let saved = session.flush_save()?;

            println!(
                "Wandered {} step(s), revealing {} cache(s) and pocketing {} coin(s).",
                report.steps, report.revealed, report.collected
            );
            println!("The walk ended in cell {}.", report.final_cell);
            if saved {
                println!("Session saved to {}.", args.session.save.display());
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Location-anchored coin collecting, played from the terminal.
#[derive(Debug, Parser)]
#[command(name = "geocoin", version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Starts an interactive session.
    Play(SessionArgs),
    /// Walks the player automatically and reports what was found.
    Wander(WanderArgs),
}

#[derive(Debug, Args)]
struct SessionArgs {
    /// Path to the world configuration file.
    #[arg(long, value_name = "PATH", default_value = "geocoin.toml")]
    config: PathBuf,
    /// Path to the save slot file.
    #[arg(long, value_name = "PATH", default_value = "geocoin-save.txt")]
    save: PathBuf,
}

#[derive(Debug, Args)]
struct WanderArgs {
    #[command(flatten)]
    session: SessionArgs,
    /// Number of steps to walk before stopping.
    #[arg(long, default_value_t = 64)]
    steps: u32,
    /// Seed feeding the walk's direction draws.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}
