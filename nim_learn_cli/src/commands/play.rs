use crate::{
    commands::common::{Format, GameArgs, write_event},
    io::FileOrStdout,
};
use anyhow::{Context, Result};
use clap::{self, Parser};
use nim_learn::{memory::MoveMemory, stats::Stats};
use serde::Serialize;
use std::io::Write;

/// Play rounds against the opponent, printing every turn and the memory after each round
#[derive(Parser, Debug)]
pub struct Args {
    #[command(flatten)]
    game: GameArgs,

    /// Number of rounds to play
    #[arg(long, default_value_t = 20)]
    rounds: usize,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Path to write the trace to, `-` for stdout
    #[arg(long, default_value = "-")]
    out_file: FileOrStdout,
}

#[derive(Serialize)]
#[serde(tag = "event", rename = "summary")]
struct Summary<'a> {
    stats: &'a Stats,
    memory: &'a MoveMemory,
}

pub fn run(args: Args) -> Result<()> {
    let mut game = args.game.game()?;
    let mut out = args
        .out_file
        .create()
        .context("Could not create/open output file")?;

    let mut written = Ok(());
    game.play(args.rounds, |event| {
        if written.is_ok() {
            written = write_event(&mut out, args.format, event);
        }
    });
    written?;

    match args.format {
        Format::Text => writeln!(out, "{}", game.stats())?,
        Format::Json => writeln!(
            out,
            "{}",
            serde_json::ser::to_string(&Summary {
                stats: game.stats(),
                memory: game.memory(),
            })?
        )?,
    }
    out.flush()?;

    args.game.save_memory(game.memory())
}
