//! Rules of the coin-removal game and its theoretical solution
//!
//! The game is the subtraction game on `{1, ..., max_take}` started from a pile of
//! [`coins`](Rules::coins): players alternate removing coins and whoever takes the last one
//! wins.

use std::{
    error::Error,
    fmt::{self, Display},
    ops::RangeInclusive,
};

use crate::{display, memory::MoveMemory, numeric::nimber::Nimber};

/// Reasons why a pair of parameters does not describe a playable game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesError {
    /// Pile must start with at least one coin
    NoCoins,

    /// Players must be allowed to take at least one coin per turn
    ZeroMaxTake,

    /// Per-turn cap larger than the whole pile
    MaxTakeAboveCoins {
        /// Starting pile size
        coins: u32,

        /// Requested per-turn cap
        max_take: u32,
    },
}

impl Display for RulesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulesError::NoCoins => write!(f, "pile must start with at least one coin"),
            RulesError::ZeroMaxTake => write!(f, "players must be allowed to take at least one coin"),
            RulesError::MaxTakeAboveCoins { coins, max_take } => write!(
                f,
                "cannot allow taking {} coins per turn from a pile of {}",
                max_take, coins
            ),
        }
    }
}

impl Error for RulesError {}

/// Validated game parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rules {
    // Invariant: 1 <= max_take <= coins
    coins: u32,
    max_take: u32,
}

impl Display for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TakeAway")?;
        display::parens(f, |f| write!(f, "{}, 1..={}", self.coins, self.max_take))
    }
}

impl Rules {
    /// Create rules for a pile of `coins` where at most `max_take` coins may be taken per turn
    ///
    /// # Errors
    /// - `coins` is zero
    /// - `max_take` is zero or larger than `coins`
    pub const fn new(coins: u32, max_take: u32) -> Result<Self, RulesError> {
        if coins == 0 {
            return Err(RulesError::NoCoins);
        }
        if max_take == 0 {
            return Err(RulesError::ZeroMaxTake);
        }
        if max_take > coins {
            return Err(RulesError::MaxTakeAboveCoins { coins, max_take });
        }
        Ok(Self { coins, max_take })
    }

    /// Number of coins on the table at the start of every round
    #[inline]
    pub const fn coins(&self) -> u32 {
        self.coins
    }

    /// Maximum number of coins a player may take in one turn
    #[inline]
    pub const fn max_take(&self) -> u32 {
        self.max_take
    }

    /// Moves available on a pile. Empty range if the pile is empty.
    #[inline]
    pub fn legal_moves(&self, pile: u32) -> RangeInclusive<u32> {
        1..=self.max_take.min(pile)
    }

    /// Check if taking `take` coins from `pile` is allowed
    #[inline]
    pub fn is_legal(&self, pile: u32, take: u32) -> bool {
        self.legal_moves(pile).contains(&take)
    }

    /// Get the infinite Grundy sequence of the game, starting from the empty pile
    #[inline]
    pub fn grundy_sequence(&self) -> GrundySequence {
        GrundySequence {
            max_take: self.max_take,
            previous: vec![Nimber::new(0); self.max_take as usize],
            current: 0,
        }
    }

    /// Grundy values of every pile from empty to full, indexed by pile size
    pub fn grundy_values(&self) -> Vec<Nimber> {
        self.grundy_sequence()
            .take(self.coins as usize + 1)
            .collect()
    }

    /// Moves from `pile` that leave the opponent in a lost position
    pub fn winning_moves(&self, pile: u32) -> Vec<u32> {
        let values = self
            .grundy_sequence()
            .take(pile as usize + 1)
            .collect::<Vec<_>>();
        Self::winning_moves_in(&values, self.legal_moves(pile), pile)
    }

    /// Memory of a player that knows the game perfectly: every pile maps to its winning
    /// moves, lost piles map to nothing.
    pub fn solution(&self) -> MoveMemory {
        let values = self.grundy_values();
        MoveMemory::from_moves(
            (1..=self.coins)
                .map(|pile| Self::winning_moves_in(&values, self.legal_moves(pile), pile))
                .collect(),
        )
    }

    fn winning_moves_in(values: &[Nimber], moves: RangeInclusive<u32>, pile: u32) -> Vec<u32> {
        moves
            .filter(|take| values[(pile - take) as usize].is_zero())
            .collect()
    }
}

/// Grundy sequence of the game iterator using Grundy scale method.
#[derive(Debug, Clone)]
pub struct GrundySequence {
    max_take: u32,

    /// Ring buffer of the last `max_take` values
    previous: Vec<Nimber>,

    /// Current pile size to compute nim value for
    current: u32,
}

impl Iterator for GrundySequence {
    type Item = Nimber;

    fn next(&mut self) -> Option<Self::Item> {
        let period_len = self.previous.len() as u32;

        let mut for_mex = Vec::with_capacity(self.max_take as usize);
        for take in 1..=self.max_take.min(self.current) {
            let j = (self.current - take) % period_len;
            for_mex.push(self.previous[j as usize]);
        }
        let mex = Nimber::mex(for_mex);

        self.previous[(self.current % period_len) as usize] = mex;
        self.current += 1;

        Some(mex)
    }
}
