//! Trace of a game as it is played

use std::fmt::{self, Display};

use crate::{
    game::{LastMove, Outcome, Player, Turn},
    memory::MoveMemory,
};

/// Step of a game reported to the observer of [`Game::play_round`](crate::game::Game::play_round)
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum Event<'a> {
    /// Full pile is back on the table
    RoundStarted {
        /// Round number, counted from zero
        round: usize,

        /// Player making the first move
        starter: Player,

        /// Coins on the table
        pile: u32,
    },

    /// Somebody moved or the computer gave up
    Turn {
        /// Round number, counted from zero
        round: usize,

        /// What happened
        turn: Turn,

        /// Memory after the turn
        memory: &'a MoveMemory,

        /// Computer move not yet consumed
        last_move: Option<LastMove>,
    },

    /// Round has ended
    RoundFinished {
        /// Round number, counted from zero
        round: usize,

        /// How the round ended
        outcome: Outcome,

        /// Memory at the end of the round
        memory: &'a MoveMemory,

        /// Computer move not yet consumed, present if the computer won
        last_move: Option<LastMove>,
    },
}

fn forgotten(f: &mut fmt::Formatter<'_>, pruned: Option<LastMove>) -> fmt::Result {
    match pruned {
        Some(last) => write!(
            f,
            "\nForgetting to take {} from {} coin(s)",
            last.take, last.pile
        ),
        None => Ok(()),
    }
}

impl Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Event::RoundStarted {
                round,
                starter,
                pile,
            } => write!(
                f,
                "+++ Round {}: {} starts with {} coin(s) +++",
                round + 1,
                starter,
                pile
            ),
            Event::Turn {
                turn,
                memory,
                last_move,
                ..
            } => match turn {
                Turn::Took {
                    player: Player::Computer,
                    take,
                    remaining,
                } => write!(
                    f,
                    "Computer takes {} coin(s), {} left. Memory now:\n{}",
                    take,
                    remaining,
                    memory.table(remaining, last_move)
                ),
                Turn::Took {
                    player: Player::Opponent,
                    take,
                    remaining,
                } => write!(f, "Opponent takes {} coin(s), {} left", take, remaining),
                Turn::Won {
                    player,
                    take,
                    pruned,
                } => {
                    write!(f, "{} takes {} coin(s) and wins!", player, take)?;
                    forgotten(f, pruned)
                }
                Turn::Forfeited { pile, pruned } => {
                    write!(f, "Computer gives up on {} coin(s)", pile)?;
                    forgotten(f, pruned)
                }
            },
            Event::RoundFinished {
                round,
                outcome,
                memory,
                last_move,
            } => write!(
                f,
                "Memory after round {} ({}):\n{}",
                round + 1,
                outcome,
                memory.table(0, last_move)
            ),
        }
    }
}
