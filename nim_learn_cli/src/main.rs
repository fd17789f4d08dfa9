use crate::commands::*;
use anyhow::Result;
use clap::{self, Parser, Subcommand};

mod commands;
mod io;
mod logging;

#[derive(Subcommand, Debug)]
enum Command {
    Play(play::Args),
    Train(train::Args),
    Solve(solve::Args),
}

#[derive(Parser)]
struct Args {
    /// Print debug messages, like every forgotten move, to stderr
    #[arg(long, global = true)]
    verbose: bool,

    /// Also write debug messages to this file
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose, args.log_file.as_deref())?;
    match args.command {
        Command::Play(args) => play::run(args),
        Command::Train(args) => train::run(args),
        Command::Solve(args) => solve::run(args),
    }
}
