//! Players the computer learns against

use rand::{Rng, seq::IndexedRandom};

use crate::{memory::MoveMemory, rules::Rules};

/// Strategy of the computer's opponent
pub trait Opponent {
    /// Choose how many coins to take from a non-empty pile. Must return a legal move.
    fn choose<R>(&mut self, rules: &Rules, pile: u32, rng: &mut R) -> u32
    where
        R: Rng + ?Sized;
}

/// Opponent that picks uniformly among all legal moves
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOpponent;

impl Opponent for RandomOpponent {
    fn choose<R>(&mut self, rules: &Rules, pile: u32, rng: &mut R) -> u32
    where
        R: Rng + ?Sized,
    {
        rng.random_range(rules.legal_moves(pile))
    }
}

/// Opponent that takes a winning move whenever there is one and plays randomly on lost piles
#[derive(Debug, Clone)]
pub struct PerfectOpponent {
    solution: MoveMemory,
}

impl PerfectOpponent {
    /// Solve the game once up front
    pub fn new(rules: &Rules) -> Self {
        Self {
            solution: rules.solution(),
        }
    }
}

impl Opponent for PerfectOpponent {
    fn choose<R>(&mut self, rules: &Rules, pile: u32, rng: &mut R) -> u32
    where
        R: Rng + ?Sized,
    {
        match self.solution.moves(pile).choose(rng) {
            Some(&take) => take,
            None => RandomOpponent.choose(rules, pile, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn random_opponent_plays_every_legal_move() {
        let rules = Rules::new(5, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let take = RandomOpponent.choose(&rules, 5, &mut rng);
            assert!(rules.is_legal(5, take));
            seen[take as usize] = true;
        }
        assert_eq!(seen, [false, true, true, true]);

        for _ in 0..20 {
            assert_eq!(RandomOpponent.choose(&rules, 1, &mut rng), 1);
        }
    }

    #[test]
    fn perfect_opponent_takes_winning_moves() {
        let rules = Rules::new(10, 2).unwrap();
        let mut opponent = PerfectOpponent::new(&rules);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..20 {
            assert_eq!(opponent.choose(&rules, 10, &mut rng), 1);
            assert_eq!(opponent.choose(&rules, 8, &mut rng), 2);
            let take = opponent.choose(&rules, 9, &mut rng);
            assert!(rules.is_legal(9, take));
        }
    }
}
