//! Tallies of finished rounds

use std::fmt::{self, Display};

use crate::game::{Outcome, Turn};

/// Counts of round outcomes and forgotten moves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    /// Finished rounds
    pub rounds: usize,

    /// Rounds where the computer took the last coin
    pub computer_wins: usize,

    /// Rounds where the opponent took the last coin
    pub opponent_wins: usize,

    /// Rounds the computer gave up
    pub forfeits: usize,

    /// Moves removed from memory
    pub pruned_moves: usize,
}

impl Stats {
    /// Account for a played turn
    pub fn record(&mut self, turn: &Turn) {
        if turn.pruned().is_some() {
            self.pruned_moves += 1;
        }

        if let Some(outcome) = turn.outcome() {
            self.rounds += 1;
            match outcome {
                Outcome::ComputerWon => self.computer_wins += 1,
                Outcome::OpponentWon => self.opponent_wins += 1,
                Outcome::ComputerForfeited => self.forfeits += 1,
            }
        }
    }

    /// Fraction of rounds won by the computer, zero before the first round
    pub fn computer_win_rate(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.computer_wins as f64 / self.rounds as f64
        }
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rounds: {}, computer wins: {} ({:.1}%), opponent wins: {}, forfeits: {}, forgotten moves: {}",
            self.rounds,
            self.computer_wins,
            self.computer_win_rate() * 100.0,
            self.opponent_wins,
            self.forfeits,
            self.pruned_moves
        )
    }
}

/// Result of [`Game::train`](crate::game::Game::train)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Convergence {
    /// Rounds played during training
    pub rounds: usize,

    /// Whether memory stopped changing before the round limit
    pub stable: bool,

    /// Total rounds played by the game when memory last changed, if it changed at all
    pub last_change: Option<usize>,
}

impl Display for Convergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stable {
            write!(f, "memory stable after {} rounds", self.rounds)?;
        } else {
            write!(f, "memory still changing after {} rounds", self.rounds)?;
        }
        match self.last_change {
            Some(round) => write!(f, ", last change in round {}", round),
            None => write!(f, ", never changed"),
        }
    }
}
