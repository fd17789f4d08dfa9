//! Per-pile memory of moves that have not been proven to lose yet

use std::{
    error::Error,
    fmt::{self, Display},
};

use itertools::Itertools;

use crate::{display, game::LastMove, rules::Rules};

/// Reasons why a stored memory table cannot be used with a given set of rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// Table does not have one entry per pile size
    PileCount {
        /// Number of piles the rules need
        expected: u32,

        /// Number of piles in the table
        found: u32,
    },

    /// Remembered move is not allowed on its pile
    IllegalMove {
        /// Pile size the move is remembered for
        pile: u32,

        /// Number of coins the move takes
        take: u32,
    },

    /// Moves of a pile are not strictly ascending
    Unordered {
        /// Offending pile size
        pile: u32,
    },
}

impl Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::PileCount { expected, found } => write!(
                f,
                "memory has {} pile sizes but the game needs {}",
                found, expected
            ),
            MemoryError::IllegalMove { pile, take } => {
                write!(f, "taking {} coins from {} is not a legal move", take, pile)
            }
            MemoryError::Unordered { pile } => {
                write!(f, "moves for pile {} are not strictly ascending", pile)
            }
        }
    }
}

impl Error for MemoryError {}

/// Moves the computer still considers viable, per pile size
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MoveMemory {
    // Invariant: entry `i` holds the moves for pile `i + 1`, strictly ascending
    moves: Vec<Vec<u32>>,
}

impl Display for MoveMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display::braces(f, |f| {
            for (idx, (pile, moves)) in self.piles().enumerate() {
                if idx != 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: ", pile)?;
                display::move_list(f, moves)?;
            }
            Ok(())
        })
    }
}

impl MoveMemory {
    /// Fresh memory where every legal move of every pile is still viable
    pub fn new(rules: &Rules) -> Self {
        Self::from_moves(
            (1..=rules.coins())
                .map(|pile| rules.legal_moves(pile).collect())
                .collect(),
        )
    }

    pub(crate) const fn from_moves(moves: Vec<Vec<u32>>) -> Self {
        Self { moves }
    }

    /// Check that the table fits the rules, used for memory loaded from outside
    ///
    /// # Errors
    /// - Table size differs from the number of coins
    /// - Some remembered move is illegal or out of order
    pub fn validate(&self, rules: &Rules) -> Result<(), MemoryError> {
        if self.coins() != rules.coins() {
            return Err(MemoryError::PileCount {
                expected: rules.coins(),
                found: self.coins(),
            });
        }

        for (pile, moves) in self.piles() {
            if let Some(&take) = moves.iter().find(|&&take| !rules.is_legal(pile, take)) {
                return Err(MemoryError::IllegalMove { pile, take });
            }
            if moves.iter().tuple_windows().any(|(a, b)| a >= b) {
                return Err(MemoryError::Unordered { pile });
            }
        }

        Ok(())
    }

    /// Largest pile size tracked
    #[inline]
    pub fn coins(&self) -> u32 {
        self.moves.len() as u32
    }

    /// Remembered moves for a pile, ascending. Empty for piles outside the table.
    pub fn moves(&self, pile: u32) -> &[u32] {
        pile.checked_sub(1)
            .and_then(|idx| self.moves.get(idx as usize))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Check if a move is still considered viable
    #[inline]
    pub fn contains(&self, pile: u32, take: u32) -> bool {
        self.moves(pile).binary_search(&take).is_ok()
    }

    /// Check if the computer has no viable move left on a pile
    #[inline]
    pub fn is_exhausted(&self, pile: u32) -> bool {
        self.moves(pile).is_empty()
    }

    /// Forget a move. Returns `false` if it was not remembered.
    pub fn remove(&mut self, pile: u32, take: u32) -> bool {
        let Some(moves) = pile
            .checked_sub(1)
            .and_then(|idx| self.moves.get_mut(idx as usize))
        else {
            return false;
        };

        match moves.binary_search(&take) {
            Ok(i) => {
                moves.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    /// Iterate over pile sizes with their remembered moves, smallest pile first
    pub fn piles(&self) -> impl Iterator<Item = (u32, &[u32])> {
        self.moves
            .iter()
            .enumerate()
            .map(|(idx, moves)| (idx as u32 + 1, moves.as_slice()))
    }

    /// Total number of remembered moves across all piles
    pub fn move_count(&self) -> usize {
        self.moves.iter().map(Vec::len).sum()
    }

    /// Check if every move remembered here is also remembered by `other`
    pub fn is_subset_of(&self, other: &MoveMemory) -> bool {
        self.piles()
            .all(|(pile, moves)| moves.iter().all(|&take| other.contains(pile, take)))
    }

    /// Piles on which two memories of the same game disagree
    ///
    /// Panics if the memories track a different number of piles.
    pub fn diff(&self, other: &MoveMemory) -> Vec<PileDiff> {
        self.moves
            .iter()
            .zip_eq(other.moves.iter())
            .enumerate()
            .filter(|(_, (ours, theirs))| ours != theirs)
            .map(|(idx, (ours, theirs))| PileDiff {
                pile: idx as u32 + 1,
                ours: ours.clone(),
                theirs: theirs.clone(),
            })
            .collect()
    }

    /// Multiline view of the memory with the current pile and last move highlighted
    pub const fn table(&self, pile: u32, last_move: Option<LastMove>) -> MemoryTable<'_> {
        MemoryTable {
            memory: self,
            pile,
            last_move,
        }
    }
}

/// Pile on which two memories disagree, see [`MoveMemory::diff`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PileDiff {
    /// Pile size
    pub pile: u32,

    /// Moves remembered by the memory `diff` was called on
    pub ours: Vec<u32>,

    /// Moves remembered by the other memory
    pub theirs: Vec<u32>,
}

impl Display for PileDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.pile)?;
        display::move_list(f, &self.ours)?;
        write!(f, " vs ")?;
        display::move_list(f, &self.theirs)
    }
}

/// Table rendering of [`MoveMemory`], one pile per line
#[derive(Debug, Clone, Copy)]
pub struct MemoryTable<'a> {
    memory: &'a MoveMemory,
    pile: u32,
    last_move: Option<LastMove>,
}

impl Display for MemoryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.memory.coins().to_string().len();
        for (idx, (pile, moves)) in self.memory.piles().enumerate() {
            if idx != 0 {
                writeln!(f)?;
            }
            let marker = if pile == self.pile { '*' } else { ' ' };
            write!(f, "{} {:>width$} coin(s): ", marker, pile, width = width)?;
            display::move_list(f, moves)?;
            if let Some(last) = self.last_move.filter(|last| last.pile == pile) {
                write!(f, "  took {}", last.take)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_two() -> Rules {
        Rules::new(5, 2).unwrap()
    }

    #[test]
    fn fresh_memory_remembers_all_legal_moves() {
        let memory = MoveMemory::new(&five_two());
        assert_eq!(memory.to_string(), "{1: [1], 2: [1, 2], 3: [1, 2], 4: [1, 2], 5: [1, 2]}");
        assert_eq!(memory.coins(), 5);
        assert_eq!(memory.move_count(), 9);

        let memory = MoveMemory::new(&Rules::new(1, 1).unwrap());
        assert_eq!(memory.to_string(), "{1: [1]}");
    }

    #[test]
    fn out_of_table_piles_have_no_moves() {
        let memory = MoveMemory::new(&five_two());
        assert!(memory.moves(0).is_empty());
        assert!(memory.moves(6).is_empty());
        assert!(memory.is_exhausted(0));
        assert!(!memory.contains(6, 1));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut memory = MoveMemory::new(&five_two());
        assert!(memory.remove(4, 2));
        assert!(!memory.remove(4, 2));
        assert_eq!(memory.moves(4), &[1]);
        assert!(memory.remove(4, 1));
        assert!(memory.is_exhausted(4));
        assert!(!memory.remove(0, 1));
        assert!(!memory.remove(9, 1));
        assert_eq!(memory.move_count(), 7);
    }

    #[test]
    fn solution_is_subset_of_fresh_memory() {
        let rules = five_two();
        let memory = MoveMemory::new(&rules);
        let solution = rules.solution();
        assert!(solution.is_subset_of(&memory));
        assert!(!memory.is_subset_of(&solution));
    }

    #[test]
    fn diff_lists_disagreeing_piles() {
        let rules = five_two();
        let mut memory = MoveMemory::new(&rules);
        memory.remove(2, 1);
        memory.remove(3, 1);
        memory.remove(3, 2);

        let diff = memory.diff(&rules.solution());
        assert_eq!(
            diff.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["4: [1, 2] vs [1]", "5: [1, 2] vs [2]"]
        );
    }

    #[test]
    fn validate_rejects_foreign_tables() {
        let rules = five_two();
        assert_eq!(MoveMemory::new(&rules).validate(&rules), Ok(()));

        let small = MoveMemory::new(&Rules::new(3, 2).unwrap());
        assert_eq!(
            small.validate(&rules),
            Err(MemoryError::PileCount {
                expected: 5,
                found: 3
            })
        );

        let wide = MoveMemory::new(&Rules::new(5, 3).unwrap());
        assert_eq!(
            wide.validate(&rules),
            Err(MemoryError::IllegalMove { pile: 3, take: 3 })
        );

        let unordered = MoveMemory::from_moves(vec![vec![1], vec![2, 1], vec![], vec![], vec![]]);
        assert_eq!(
            unordered.validate(&rules),
            Err(MemoryError::Unordered { pile: 2 })
        );
    }

    #[test]
    fn table_marks_pile_and_last_move() {
        let memory = MoveMemory::new(&Rules::new(3, 2).unwrap());
        let table = memory.table(1, Some(LastMove { pile: 3, take: 2 }));
        assert_eq!(
            table.to_string(),
            "* 1 coin(s): [1]\n  2 coin(s): [1, 2]\n  3 coin(s): [1, 2]  took 2"
        );
    }
}
