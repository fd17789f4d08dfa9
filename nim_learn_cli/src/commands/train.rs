use crate::{
    commands::common::{Format, GameArgs},
    io::FileOrStdout,
};
use anyhow::{Context, Result};
use clap::{self, Parser};
use log::warn;
use nim_learn::{
    memory::{MoveMemory, PileDiff},
    rules::Rules,
    stats::{Convergence, Stats},
};
use serde::Serialize;
use std::{io::Write, num::NonZeroUsize};

/// Train without printing turns until memory stops changing, then compare it with the
/// solved game
#[derive(Parser, Debug)]
pub struct Args {
    #[command(flatten)]
    game: GameArgs,

    /// Stop after that many rounds even if memory still changes
    #[arg(long, default_value_t = 10_000)]
    max_rounds: usize,

    /// Consider memory stable after that many rounds without change
    #[arg(long, default_value = "200")]
    patience: NonZeroUsize,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Path to write the report to, `-` for stdout
    #[arg(long, default_value = "-")]
    out_file: FileOrStdout,
}

#[derive(Serialize)]
struct Report<'a> {
    rules: &'a Rules,
    convergence: Convergence,
    stats: &'a Stats,
    memory: &'a MoveMemory,
    solution: &'a MoveMemory,
    disagreements: Vec<PileDiff>,
}

pub fn run(args: Args) -> Result<()> {
    let mut game = args.game.game()?;
    let convergence = game.train(args.max_rounds, args.patience);
    if !convergence.stable {
        warn!(
            "Memory still changing after {} rounds, consider raising --max-rounds",
            convergence.rounds
        );
    }

    let solution = game.rules().solution();
    let disagreements = game.memory().diff(&solution);

    let mut out = args
        .out_file
        .create()
        .context("Could not create/open output file")?;
    match args.format {
        Format::Text => {
            writeln!(out, "{}: {}", game.rules(), convergence)?;
            writeln!(out, "{}", game.stats())?;
            writeln!(out, "Learned memory:\n{}", game.memory().table(0, None))?;
            if disagreements.is_empty() {
                writeln!(out, "Memory matches the solved game")?;
            } else {
                writeln!(out, "Differences from the solved game (learned vs solved):")?;
                for diff in &disagreements {
                    writeln!(out, "  {}", diff)?;
                }
            }
        }
        Format::Json => {
            let report = Report {
                rules: game.rules(),
                convergence,
                stats: game.stats(),
                memory: game.memory(),
                solution: &solution,
                disagreements,
            };
            writeln!(out, "{}", serde_json::ser::to_string(&report)?)?;
        }
    }
    out.flush()?;

    args.game.save_memory(game.memory())
}
