//! Simon Says simulator for the desktop.
//!
//! Runs the same game core as the firmware. Pads and the power button are
//! typed on stdin, LEDs, tones and game events are printed, and the store
//! lives in a directory of JSON files.

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]

mod board;
mod commands;
mod file_blobs;
mod sim;
mod timing;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;

use crate::commands::Command;
use crate::file_blobs::FileBlobs;
use crate::sim::{Flow, Simulator};
use crate::timing::TICK;

#[derive(Debug, Parser)]
#[command(name = "simulator")]
#[command(about = "Play Simon Says in the terminal", long_about = None)]
struct Cli {
    /// Directory holding players, history, scores and settings
    #[arg(short, long, default_value = "simon-data")]
    data_dir: PathBuf,

    /// Seed for sequences and player ids (default: from the clock)
    #[arg(short, long)]
    seed: Option<u32>,

    /// Log level written to stderr (`RUST_LOG` overrides it)
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

/// Forward stdin lines to the game loop.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init()
        .context("failed to install logger")?;

    let start = Instant::now();
    let now_ms = || start.elapsed().as_millis() as u32;

    let seed = cli.seed.unwrap_or_else(clock_seed);
    log::debug!("[GAME] Seed {seed}");
    let mut sim = Simulator::new(FileBlobs::new(&cli.data_dir), seed, now_ms());
    println!("Simon Says simulator, type 'help' for commands");

    let lines = spawn_stdin_reader();
    let mut next_tick = Instant::now();
    loop {
        loop {
            let line = match lines.try_recv() {
                Ok(line) => line,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            };
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    // Usage errors and `help` output, formatted by clap
                    let _ = e.print();
                    continue;
                }
            };
            match sim.execute(command, now_ms()) {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) => println!("error: {e:#}"),
            }
        }

        sim.tick(now_ms());

        next_tick += TICK;
        if let Some(wait) = next_tick.checked_duration_since(Instant::now()) {
            thread::sleep(wait);
        } else {
            next_tick = Instant::now();
        }
    }
}
