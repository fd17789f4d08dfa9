use anyhow::{Context, Result};
use clap::{self, ValueEnum};
use log::info;
use nim_learn::{
    event::Event,
    game::{Game, Player},
    memory::MoveMemory,
    opponent::{Opponent, PerfectOpponent, RandomOpponent},
    rules::Rules,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
};

#[derive(clap::Args, Debug, Clone, Copy)]
pub struct RulesArgs {
    /// Coins on the table at the start of every round
    #[arg(long, default_value_t = 5)]
    coins: u32,

    /// Maximum number of coins a player may take per turn
    #[arg(long, default_value_t = 2)]
    max_take: u32,
}

impl RulesArgs {
    pub fn rules(&self) -> Result<Rules> {
        Rules::new(self.coins, self.max_take).context("Invalid game parameters")
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OpponentKind {
    /// Pick uniformly among legal moves
    Random,

    /// Take a winning move when there is one
    Perfect,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Format {
    /// Human readable commentary
    Text,

    /// One JSON object per line
    Json,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GameArgs {
    #[command(flatten)]
    rules: RulesArgs,

    /// Seed of the random number generator. Fresh entropy is used if not given
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = OpponentKind::Random)]
    opponent: OpponentKind,

    /// Let the computer start the first round. Starting player alternates every round
    #[arg(long)]
    computer_starts: bool,

    /// Continue learning from memory saved in this file
    #[arg(long, default_value = None)]
    memory_load_file: Option<String>,

    /// Save memory to this file after the last round
    #[arg(long, default_value = None)]
    memory_save_file: Option<String>,
}

pub enum AnyOpponent {
    Random(RandomOpponent),
    Perfect(PerfectOpponent),
}

impl Opponent for AnyOpponent {
    fn choose<R>(&mut self, rules: &Rules, pile: u32, rng: &mut R) -> u32
    where
        R: Rng + ?Sized,
    {
        match self {
            AnyOpponent::Random(opponent) => opponent.choose(rules, pile, rng),
            AnyOpponent::Perfect(opponent) => opponent.choose(rules, pile, rng),
        }
    }
}

pub type CliGame = Game<AnyOpponent, StdRng>;

impl GameArgs {
    pub fn game(&self) -> Result<CliGame> {
        let rules = self.rules.rules()?;

        let opponent = match self.opponent {
            OpponentKind::Random => AnyOpponent::Random(RandomOpponent),
            OpponentKind::Perfect => AnyOpponent::Perfect(PerfectOpponent::new(&rules)),
        };

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let game = if let Some(memory_file) = &self.memory_load_file {
            let f = BufReader::new(File::open(memory_file).context("Could not open memory file")?);
            let memory: MoveMemory =
                serde_json::de::from_reader(f).context("Could not parse memory file")?;
            info!(
                "Loaded {} remembered moves from {}",
                memory.move_count(),
                memory_file
            );
            Game::with_memory(rules, memory, opponent, rng)
                .context("Saved memory does not fit the game")?
        } else {
            Game::new(rules, opponent, rng)
        };

        let starter = if self.computer_starts {
            Player::Computer
        } else {
            Player::Opponent
        };
        Ok(game.first_starter(starter))
    }

    pub fn save_memory(&self, memory: &MoveMemory) -> Result<()> {
        let Some(memory_file) = &self.memory_save_file else {
            return Ok(());
        };

        let mut output = BufWriter::new(
            File::create(memory_file).context("Could not create/open memory file")?,
        );
        writeln!(
            output,
            "{}",
            serde_json::ser::to_string(memory).context("Could not serialize memory")?
        )?;
        output.flush()?;
        info!("Saved memory to {}", memory_file);
        Ok(())
    }
}

pub fn write_event(out: &mut impl Write, format: Format, event: &Event<'_>) -> Result<()> {
    match format {
        Format::Text => {
            writeln!(out, "{event}")?;
            if let Event::RoundFinished { .. } = event {
                writeln!(out)?;
            }
        }
        Format::Json => writeln!(out, "{}", serde_json::ser::to_string(event)?)?,
    }
    Ok(())
}
