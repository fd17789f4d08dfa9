use crate::commands::common::{Format, RulesArgs};
use anyhow::Result;
use clap::{self, Parser};
use itertools::Itertools;
use serde::Serialize;

/// Print the Grundy value and winning moves of every pile size
#[derive(Parser, Debug)]
pub struct Args {
    #[command(flatten)]
    rules: RulesArgs,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Serialize)]
struct Row<'a> {
    pile: u32,
    grundy: u32,
    winning_moves: &'a [u32],
}

pub fn run(args: Args) -> Result<()> {
    let rules = args.rules.rules()?;
    let values = rules.grundy_values();
    let solution = rules.solution();
    let width = rules.coins().to_string().len();

    for (pile, winning_moves) in solution.piles() {
        let grundy = values[pile as usize];
        match args.format {
            Format::Text => {
                let moves = if winning_moves.is_empty() {
                    "lost".to_owned()
                } else {
                    winning_moves.iter().join(", ")
                };
                println!(
                    "{:>width$}  {:>4}  {}",
                    pile,
                    grundy.to_string(),
                    moves,
                    width = width
                );
            }
            Format::Json => {
                let row = Row {
                    pile,
                    grundy: grundy.value(),
                    winning_moves,
                };
                println!("{}", serde_json::ser::to_string(&row)?);
            }
        }
    }

    Ok(())
}
