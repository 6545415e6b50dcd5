#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for playing Grid Conquest in a terminal.

mod config;
mod render;
mod session;
mod share;

use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use grid_conquest_core::GameStatus;
use grid_conquest_persistence::{FileStore, MemoryStore, Persistence};
use grid_conquest_world::query;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Overrides, Settings},
    session::Session,
};

/// Turn-based grid conquest against a heuristic opponent.
#[derive(Debug, Parser)]
#[command(name = "grid-conquest", version, about)]
struct Cli {
    /// Rules file in TOML format.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for map generation and combat fortune.
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Board side length for newly generated matches.
    #[arg(long, global = true)]
    size: Option<u32>,
    /// Directory holding the save slot.
    #[arg(long, global = true, value_name = "DIR")]
    save_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Play interactively, resuming the saved match if there is one.
    Play,
    /// Let the opponent heuristic play both sides without touching the save slot.
    Simulate {
        /// Maximum number of rounds to play.
        #[arg(long, default_value_t = 50)]
        turns: u32,
    },
    /// Print a share code for the saved match.
    Export,
    /// Replace the saved match with the one in a share code.
    Import {
        /// Share code produced by `export`.
        code: String,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let settings = Settings::load(
        cli.config.as_deref(),
        Overrides {
            size: cli.size,
            seed: cli.seed,
            save_dir: cli.save_dir,
        },
    )?;

    match cli.command.unwrap_or(Mode::Play) {
        Mode::Play => play(&settings),
        Mode::Simulate { turns } => simulate(&settings, turns),
        Mode::Export => export(&settings),
        Mode::Import { code } => import(&settings, &code),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn file_persistence(settings: &Settings) -> Persistence<FileStore> {
    Persistence::new(FileStore::new(&settings.save_dir), &settings.rules)
}

fn play(settings: &Settings) -> Result<()> {
    let mut session = Session::start(settings.rules, settings.chance(), file_persistence(settings))?;
    let stdin = io::stdin();
    let mut stdout = BufWriter::new(io::stdout());
    session::run_interactive(&mut session, stdin.lock(), &mut stdout)?;
    stdout.flush()?;

    tracing::info!(
        slot = %session.persistence().store().slot_path().display(),
        turn = query::turn_number(session.game()),
        "leaving the match"
    );
    Ok(())
}

fn simulate(settings: &Settings, turns: u32) -> Result<()> {
    let persistence = Persistence::new(MemoryStore::default(), &settings.rules);
    let mut session = Session::start(settings.rules, settings.chance(), persistence)?;
    let outcome = session::simulate(&mut session, turns);

    println!("{}", render::render_board(session.game()));
    println!("rounds played: {}", outcome.rounds);
    println!("final status: {}", outcome_name(outcome.status));
    Ok(())
}

fn outcome_name(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Playing => "still playing",
        GameStatus::PlayerVictory => "player victory",
        GameStatus::AiVictory => "opponent victory",
        GameStatus::PlayerMajority => "player majority",
        GameStatus::AiMajority => "opponent majority",
    }
}

fn export(settings: &Settings) -> Result<()> {
    let persistence = file_persistence(settings);
    let Some(snapshot) = persistence.load_or_fresh() else {
        bail!(
            "no saved match in {}",
            persistence.store().directory().display()
        );
    };
    println!("{}", share::encode_share_code(&snapshot)?);
    Ok(())
}

fn import(settings: &Settings, code: &str) -> Result<()> {
    let snapshot = share::decode_share_code(code, settings.rules.starting_resources)
        .context("could not import the share code")?;
    let mut session = Session::start(settings.rules, settings.chance(), file_persistence(settings))?;
    for event in session.import(snapshot) {
        if let Some(text) = render::describe_event(&event) {
            println!("{text}");
        }
    }
    println!("{}", render::render_board(session.game()));
    Ok(())
}
