//! Rounds and games between the learning computer and an opponent
//!
//! A round is a small state machine: the computer and the opponent alternate turns until
//! somebody takes the last coin or the computer runs out of remembered moves and gives up.
//! The transition functions below take the [`GameState`] and the [`MoveMemory`] explicitly
//! so every step can be driven by hand. [`Game`] strings them together with a random source.

use std::{fmt::Display, num::NonZeroUsize};

use log::{debug, trace};
use rand::{Rng, seq::IndexedRandom};

use crate::{
    event::Event,
    memory::{MemoryError, MoveMemory},
    opponent::Opponent,
    rules::Rules,
    stats::{Convergence, Stats},
};

/// Side of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[allow(missing_docs)]
pub enum Player {
    Computer,
    Opponent,
}

impl Player {
    /// Opposite player
    #[inline(always)]
    #[must_use]
    pub const fn opposite(self) -> Player {
        match self {
            Player::Computer => Player::Opponent,
            Player::Opponent => Player::Computer,
        }
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::Computer => write!(f, "Computer"),
            Player::Opponent => write!(f, "Opponent"),
        }
    }
}

/// Move made by the computer, kept until it is proven bad or the round ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LastMove {
    /// Pile size before the move
    pub pile: u32,

    /// Number of coins taken
    pub take: u32,
}

/// Everything that describes a round in progress, apart from the memory
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GameState {
    pile: u32,
    to_move: Player,
    round_over: bool,
    last_move: Option<LastMove>,
}

impl GameState {
    /// State at the start of a round
    pub const fn new(rules: &Rules, starter: Player) -> Self {
        Self {
            pile: rules.coins(),
            to_move: starter,
            round_over: false,
            last_move: None,
        }
    }

    /// Put the full pile back on the table and forget the last move
    pub fn reset(&mut self, rules: &Rules, starter: Player) {
        *self = Self::new(rules, starter);
    }

    /// Coins left on the table
    #[inline]
    pub const fn pile(&self) -> u32 {
        self.pile
    }

    /// Player whose turn it is
    #[inline]
    pub const fn to_move(&self) -> Player {
        self.to_move
    }

    /// Check if the round has ended by a win or a forfeit
    #[inline]
    pub const fn is_round_over(&self) -> bool {
        self.round_over
    }

    /// Move the computer made most recently in this round, if not consumed yet
    #[inline]
    pub const fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Outcome {
    /// Computer took the last coin
    ComputerWon,

    /// Opponent took the last coin
    OpponentWon,

    /// Computer had no remembered move left and gave up
    ComputerForfeited,
}

impl Outcome {
    /// Player that won the round
    pub const fn winner(self) -> Player {
        match self {
            Outcome::ComputerWon => Player::Computer,
            Outcome::OpponentWon | Outcome::ComputerForfeited => Player::Opponent,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::ComputerWon => write!(f, "computer won"),
            Outcome::OpponentWon => write!(f, "opponent won"),
            Outcome::ComputerForfeited => write!(f, "computer gave up"),
        }
    }
}

/// What happened in a single turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Turn {
    /// Player took some coins and the round goes on
    Took {
        /// Player that moved
        player: Player,

        /// Coins taken
        take: u32,

        /// Coins left on the table
        remaining: u32,
    },

    /// Player took the last coin
    Won {
        /// Player that moved
        player: Player,

        /// Coins taken
        take: u32,

        /// Computer move forgotten because of this win
        pruned: Option<LastMove>,
    },

    /// Computer had nothing left to try on this pile
    Forfeited {
        /// Pile the computer gave up on
        pile: u32,

        /// Computer move forgotten because it led here
        pruned: Option<LastMove>,
    },
}

impl Turn {
    /// Outcome of the round if this turn ended it
    pub const fn outcome(&self) -> Option<Outcome> {
        match self {
            Turn::Took { .. } => None,
            Turn::Won {
                player: Player::Computer,
                ..
            } => Some(Outcome::ComputerWon),
            Turn::Won {
                player: Player::Opponent,
                ..
            } => Some(Outcome::OpponentWon),
            Turn::Forfeited { .. } => Some(Outcome::ComputerForfeited),
        }
    }

    /// Move that was removed from memory during this turn
    pub const fn pruned(&self) -> Option<LastMove> {
        match self {
            Turn::Took { .. } => None,
            Turn::Won { pruned, .. } | Turn::Forfeited { pruned, .. } => *pruned,
        }
    }
}

/// Consume the last computer move and forget it. Returns the move if it was remembered.
fn forget_last_move(state: &mut GameState, memory: &mut MoveMemory) -> Option<LastMove> {
    let last = state.last_move.take()?;
    if memory.remove(last.pile, last.take) {
        debug!(
            "Forgetting move {} on pile {}, {} moves left there",
            last.take,
            last.pile,
            memory.moves(last.pile).len()
        );
        Some(last)
    } else {
        None
    }
}

/// Computer takes `take` coins. The move must be remembered for the current pile.
///
/// A winning move is never forgotten, the record stays in the state until the next round.
pub fn play_computer_move(state: &mut GameState, memory: &MoveMemory, take: u32) -> Turn {
    debug_assert!(!state.round_over && state.to_move == Player::Computer);
    debug_assert!(
        memory.contains(state.pile, take),
        "computer move {take} on pile {} is not remembered",
        state.pile
    );

    state.last_move = Some(LastMove {
        pile: state.pile,
        take,
    });
    state.pile -= take;

    if state.pile == 0 {
        state.round_over = true;
        Turn::Won {
            player: Player::Computer,
            take,
            pruned: None,
        }
    } else {
        state.to_move = Player::Opponent;
        Turn::Took {
            player: Player::Computer,
            take,
            remaining: state.pile,
        }
    }
}

/// Computer gives up the round, forgetting the move that brought it here
pub fn computer_forfeit(state: &mut GameState, memory: &mut MoveMemory) -> Turn {
    debug_assert!(!state.round_over && state.to_move == Player::Computer);

    let pruned = forget_last_move(state, memory);
    state.round_over = true;
    Turn::Forfeited {
        pile: state.pile,
        pruned,
    }
}

/// Computer picks uniformly among its remembered moves, or forfeits if there are none
pub fn computer_turn<R>(state: &mut GameState, memory: &mut MoveMemory, rng: &mut R) -> Turn
where
    R: Rng + ?Sized,
{
    match memory.moves(state.pile).choose(rng).copied() {
        Some(take) => play_computer_move(state, memory, take),
        None => computer_forfeit(state, memory),
    }
}

/// Opponent takes `take` coins. Taking the last one proves the computer's last move bad.
pub fn play_opponent_move(state: &mut GameState, memory: &mut MoveMemory, take: u32) -> Turn {
    debug_assert!(!state.round_over && state.to_move == Player::Opponent);
    debug_assert!((1..=state.pile).contains(&take));

    state.pile -= take;

    if state.pile == 0 {
        let pruned = forget_last_move(state, memory);
        state.round_over = true;
        Turn::Won {
            player: Player::Opponent,
            take,
            pruned,
        }
    } else {
        state.to_move = Player::Computer;
        Turn::Took {
            player: Player::Opponent,
            take,
            remaining: state.pile,
        }
    }
}

/// Let the opponent choose a move and play it
pub fn opponent_turn<O, R>(
    state: &mut GameState,
    memory: &mut MoveMemory,
    rules: &Rules,
    opponent: &mut O,
    rng: &mut R,
) -> Turn
where
    O: Opponent + ?Sized,
    R: Rng + ?Sized,
{
    let take = opponent.choose(rules, state.pile, rng);
    debug_assert!(
        rules.is_legal(state.pile, take),
        "opponent took {take} from pile {}",
        state.pile
    );
    play_opponent_move(state, memory, take)
}

/// Sequence of rounds sharing one memory
#[derive(Debug, Clone)]
pub struct Game<O, R> {
    rules: Rules,
    memory: MoveMemory,
    state: GameState,
    opponent: O,
    rng: R,
    first_starter: Player,
    rounds_played: usize,
    stats: Stats,
}

impl<O, R> Game<O, R>
where
    O: Opponent,
    R: Rng,
{
    /// Start a new game with fresh memory. The opponent starts the first round.
    pub fn new(rules: Rules, opponent: O, rng: R) -> Self {
        let memory = MoveMemory::new(&rules);
        Self::with_memory_unchecked(rules, memory, opponent, rng)
    }

    /// Continue learning from a previously saved memory
    ///
    /// # Errors
    /// - Memory does not fit the rules
    pub fn with_memory(
        rules: Rules,
        memory: MoveMemory,
        opponent: O,
        rng: R,
    ) -> Result<Self, MemoryError> {
        memory.validate(&rules)?;
        Ok(Self::with_memory_unchecked(rules, memory, opponent, rng))
    }

    fn with_memory_unchecked(rules: Rules, memory: MoveMemory, opponent: O, rng: R) -> Self {
        let first_starter = Player::Opponent;
        Self {
            state: GameState::new(&rules, first_starter),
            rules,
            memory,
            opponent,
            rng,
            first_starter,
            rounds_played: 0,
            stats: Stats::default(),
        }
    }

    /// Choose who starts the first round, later rounds alternate from there
    #[must_use]
    pub fn first_starter(mut self, player: Player) -> Self {
        self.first_starter = player;
        if self.rounds_played == 0 {
            self.state.reset(&self.rules, player);
        }
        self
    }

    /// Rules of the game
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Current memory of the computer
    pub const fn memory(&self) -> &MoveMemory {
        &self.memory
    }

    /// State of the current or last finished round
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Tallies over all rounds played so far
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Number of finished rounds
    pub const fn rounds_played(&self) -> usize {
        self.rounds_played
    }

    /// Give up the game and keep what the computer has learned
    pub fn into_memory(self) -> MoveMemory {
        self.memory
    }

    /// Player starting the given round, counted from zero
    pub const fn starter_of(&self, round: usize) -> Player {
        if round % 2 == 0 {
            self.first_starter
        } else {
            self.first_starter.opposite()
        }
    }

    /// Play one turn of the current round
    pub fn play_turn(&mut self) -> Turn {
        debug_assert!(!self.state.round_over);
        let turn = match self.state.to_move {
            Player::Computer => computer_turn(&mut self.state, &mut self.memory, &mut self.rng),
            Player::Opponent => opponent_turn(
                &mut self.state,
                &mut self.memory,
                &self.rules,
                &mut self.opponent,
                &mut self.rng,
            ),
        };
        trace!("Round {}: {:?}", self.rounds_played, turn);
        self.stats.record(&turn);
        turn
    }

    /// Play a full round, reporting every step to `observe`
    pub fn play_round<F>(&mut self, mut observe: F) -> Outcome
    where
        F: FnMut(&Event<'_>),
    {
        let round = self.rounds_played;
        let starter = self.starter_of(round);
        self.state.reset(&self.rules, starter);
        observe(&Event::RoundStarted {
            round,
            starter,
            pile: self.state.pile,
        });

        let outcome = loop {
            let turn = self.play_turn();
            observe(&Event::Turn {
                round,
                turn,
                memory: &self.memory,
                last_move: self.state.last_move,
            });
            if let Some(outcome) = turn.outcome() {
                break outcome;
            }
        };

        self.rounds_played += 1;
        observe(&Event::RoundFinished {
            round,
            outcome,
            memory: &self.memory,
            last_move: self.state.last_move,
        });
        outcome
    }

    /// Play a number of rounds, reporting every step to `observe`
    pub fn play<F>(&mut self, rounds: usize, mut observe: F)
    where
        F: FnMut(&Event<'_>),
    {
        for _ in 0..rounds {
            self.play_round(&mut observe);
        }
    }

    /// Play until the memory has not changed for `patience` rounds in a row, or until
    /// `max_rounds` rounds were played.
    pub fn train(&mut self, max_rounds: usize, patience: NonZeroUsize) -> Convergence {
        let mut unchanged = 0;
        let mut last_change = None;

        for played in 1..=max_rounds {
            let before = self.memory.move_count();
            self.play_round(|_| {});

            // Memory only ever shrinks, so the size tells whether it changed
            if self.memory.move_count() == before {
                unchanged += 1;
            } else {
                unchanged = 0;
                last_change = Some(self.rounds_played);
            }

            if unchanged >= patience.get() {
                debug!(
                    "Memory stable for {} rounds after {} rounds",
                    unchanged, played
                );
                return Convergence {
                    rounds: played,
                    stable: true,
                    last_change,
                };
            }
        }

        Convergence {
            rounds: max_rounds,
            stable: false,
            last_change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opponent::RandomOpponent;
    use quickcheck::QuickCheck;
    use rand::{SeedableRng, rngs::StdRng};

    fn five_two() -> Rules {
        Rules::new(5, 2).unwrap()
    }

    #[test]
    fn single_coin_goes_to_first_mover() {
        let rules = Rules::new(1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        for starter in [Player::Computer, Player::Opponent] {
            let mut memory = MoveMemory::new(&rules);
            let mut state = GameState::new(&rules, starter);
            let turn = match starter {
                Player::Computer => computer_turn(&mut state, &mut memory, &mut rng),
                Player::Opponent => opponent_turn(
                    &mut state,
                    &mut memory,
                    &rules,
                    &mut RandomOpponent,
                    &mut rng,
                ),
            };
            assert_eq!(
                turn,
                Turn::Won {
                    player: starter,
                    take: 1,
                    pruned: None
                }
            );
            assert!(state.is_round_over());
            assert_eq!(state.pile(), 0);
            assert_eq!(memory.to_string(), "{1: [1]}");
        }
    }

    #[test]
    fn computer_win_keeps_memory() {
        let rules = five_two();
        let mut memory = MoveMemory::new(&rules);
        let fresh = memory.clone();
        let mut state = GameState::new(&rules, Player::Computer);

        assert_eq!(
            play_computer_move(&mut state, &memory, 2),
            Turn::Took {
                player: Player::Computer,
                take: 2,
                remaining: 3
            }
        );
        assert_eq!(state.to_move(), Player::Opponent);
        assert_eq!(
            play_opponent_move(&mut state, &mut memory, 2),
            Turn::Took {
                player: Player::Opponent,
                take: 2,
                remaining: 1
            }
        );
        assert_eq!(state.to_move(), Player::Computer);
        assert_eq!(
            play_computer_move(&mut state, &memory, 1),
            Turn::Won {
                player: Player::Computer,
                take: 1,
                pruned: None
            }
        );

        assert!(state.is_round_over());
        assert_eq!(memory, fresh);
        assert_eq!(state.last_move(), Some(LastMove { pile: 1, take: 1 }));

        state.reset(&rules, Player::Opponent);
        assert_eq!(state.last_move(), None);
        assert_eq!(state.pile(), 5);
    }

    #[test]
    fn opponent_win_forgets_last_computer_move() {
        let rules = five_two();
        let mut memory = MoveMemory::new(&rules);
        let mut state = GameState::new(&rules, Player::Computer);

        play_computer_move(&mut state, &memory, 1);
        play_opponent_move(&mut state, &mut memory, 1);
        play_computer_move(&mut state, &memory, 1);
        let turn = play_opponent_move(&mut state, &mut memory, 2);

        assert_eq!(
            turn,
            Turn::Won {
                player: Player::Opponent,
                take: 2,
                pruned: Some(LastMove { pile: 3, take: 1 })
            }
        );
        assert_eq!(turn.outcome(), Some(Outcome::OpponentWon));
        assert_eq!(state.last_move(), None);
        assert_eq!(memory.moves(3), &[2]);
        assert_eq!(memory.moves(5), &[1, 2]);
    }

    #[test]
    fn opponent_win_without_computer_move_forgets_nothing() {
        let rules = Rules::new(2, 2).unwrap();
        let mut memory = MoveMemory::new(&rules);
        let mut state = GameState::new(&rules, Player::Opponent);

        let turn = play_opponent_move(&mut state, &mut memory, 2);
        assert_eq!(turn.pruned(), None);
        assert_eq!(memory, MoveMemory::new(&rules));
    }

    #[test]
    fn exhausted_pile_forfeits_and_forgets_move_leading_there() {
        let rules = five_two();
        let mut memory = MoveMemory::new(&rules);
        memory.remove(3, 1);
        memory.remove(3, 2);
        let mut rng = StdRng::seed_from_u64(3);

        let mut state = GameState::new(&rules, Player::Computer);
        play_computer_move(&mut state, &memory, 1);
        play_opponent_move(&mut state, &mut memory, 1);
        let turn = computer_turn(&mut state, &mut memory, &mut rng);

        assert_eq!(
            turn,
            Turn::Forfeited {
                pile: 3,
                pruned: Some(LastMove { pile: 5, take: 1 })
            }
        );
        assert!(state.is_round_over());
        assert_eq!(state.pile(), 3);
        assert_eq!(state.last_move(), None);
        assert_eq!(memory.moves(5), &[2]);
    }

    #[test]
    fn forfeit_without_record_keeps_memory() {
        let rules = five_two();
        let mut memory = MoveMemory::new(&rules);
        memory.remove(3, 1);
        memory.remove(3, 2);
        let before = memory.clone();
        let mut rng = StdRng::seed_from_u64(4);

        let mut state = GameState::new(&rules, Player::Opponent);
        play_opponent_move(&mut state, &mut memory, 2);
        let turn = computer_turn(&mut state, &mut memory, &mut rng);

        assert_eq!(turn, Turn::Forfeited { pile: 3, pruned: None });
        assert_eq!(memory, before);
    }

    #[test]
    fn starters_alternate() {
        let game = Game::new(five_two(), RandomOpponent, StdRng::seed_from_u64(0));
        assert_eq!(game.starter_of(0), Player::Opponent);
        assert_eq!(game.starter_of(1), Player::Computer);
        assert_eq!(game.starter_of(2), Player::Opponent);

        let game = game.first_starter(Player::Computer);
        assert_eq!(game.state().to_move(), Player::Computer);
        assert_eq!(game.starter_of(0), Player::Computer);
        assert_eq!(game.starter_of(1), Player::Opponent);
    }

    #[test]
    fn round_reports_start_turns_and_finish() {
        let mut game = Game::new(five_two(), RandomOpponent, StdRng::seed_from_u64(9));
        let mut events = Vec::new();
        let outcome = game.play_round(|event| events.push(event.to_string()));

        assert_eq!(game.rounds_played(), 1);
        assert!(events[0].starts_with("+++ Round 1: Opponent starts with 5 coin(s) +++"));
        assert!(events.last().unwrap().starts_with("Memory after round 1"));
        assert!(events.len() >= 3);
        assert_eq!(game.stats().rounds, 1);
        assert!(game.state().is_round_over());
        assert_eq!(outcome.winner() == Player::Computer, game.stats().computer_wins == 1);
    }

    #[test]
    fn with_memory_validates_table() {
        let rules = five_two();
        let foreign = MoveMemory::new(&Rules::new(4, 2).unwrap());
        assert!(
            Game::with_memory(rules, foreign, RandomOpponent, StdRng::seed_from_u64(0)).is_err()
        );

        let mut learned = MoveMemory::new(&rules);
        learned.remove(2, 1);
        let game = Game::with_memory(
            rules,
            learned.clone(),
            RandomOpponent,
            StdRng::seed_from_u64(0),
        )
        .unwrap();
        assert_eq!(game.memory(), &learned);
    }

    fn arbitrary_rules(coins: u8, max_take: u8) -> Rules {
        let coins = 1 + u32::from(coins) % 12;
        let max_take = 1 + u32::from(max_take) % coins;
        Rules::new(coins, max_take).unwrap()
    }

    #[test]
    fn rounds_are_legal_and_short() {
        let mut qc = QuickCheck::new();
        let test = |coins: u8, max_take: u8, seed: u64| {
            let rules = arbitrary_rules(coins, max_take);
            let mut game = Game::new(rules, RandomOpponent, StdRng::seed_from_u64(seed));

            for _ in 0..20 {
                let mut pile = rules.coins();
                let mut turns = 0;
                game.play_round(|event| {
                    if let Event::Turn { turn, .. } = event {
                        turns += 1;
                        match *turn {
                            Turn::Took { take, remaining, .. } => {
                                assert!(rules.is_legal(pile, take));
                                assert_eq!(remaining, pile - take);
                                pile = remaining;
                            }
                            Turn::Won { take, .. } => {
                                assert!(rules.is_legal(pile, take));
                                assert_eq!(pile, take);
                                pile = 0;
                            }
                            Turn::Forfeited { pile: at, .. } => assert_eq!(at, pile),
                        }
                    }
                });
                assert!(turns <= rules.coins() as usize);
            }
        };
        qc.quickcheck(test as fn(u8, u8, u64));
    }

    #[test]
    fn memory_only_shrinks_and_keeps_winning_moves() {
        let mut qc = QuickCheck::new();
        let test = |coins: u8, max_take: u8, seed: u64| {
            let rules = arbitrary_rules(coins, max_take);
            let solution = rules.solution();
            let mut game = Game::new(rules, RandomOpponent, StdRng::seed_from_u64(seed));

            let mut previous = game.memory().clone();
            for _ in 0..50 {
                game.play_round(|_| {});
                assert!(game.memory().is_subset_of(&previous));
                assert!(solution.is_subset_of(game.memory()));
                previous = game.memory().clone();
            }
        };
        qc.quickcheck(test as fn(u8, u8, u64));
    }
}
