//! Coin-removal game with a computer player that learns by elimination.
//!
//! Two players take turns removing between one and [`max_take`](rules::Rules::max_take)
//! coins from a shared pile, whoever takes the last coin wins. The computer keeps a
//! [`MoveMemory`](memory::MoveMemory) of moves not yet proven to lose and forgets a move
//! as soon as it is followed by a loss. Over many [rounds](game::Game::play_round) the
//! memory shrinks towards the [winning strategy](rules::Rules::solution) of the underlying
//! subtraction game.

#![warn(missing_docs)]

pub mod event;
pub mod game;
pub mod memory;
pub mod numeric;
pub mod opponent;
pub mod rules;
pub mod stats;

mod display;
