//! Constraint sentences: "exactly `count` of these `cells` are mines".

use crate::error::{EngineError, Result};
use crate::types::Cell;
use std::collections::BTreeSet;
use std::fmt;

/// A logical statement about the board.
///
/// `cells` holds only cells whose status was unknown when the sentence was
/// formed or last simplified; `count` never exceeds `cells.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sentence {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Sentence {
    /// Build a sentence, rejecting more mines than cells.
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Result<Self> {
        let cells: BTreeSet<Cell> = cells.into_iter().collect();
        if count > cells.len() {
            return Err(EngineError::contradiction(format!(
                "{} mines claimed among {} cells",
                count,
                cells.len()
            )));
        }
        Ok(Self { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// No cells left: the sentence says nothing.
    pub fn is_vacuous(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells, when every one of them must be a mine.
    pub fn known_mines(&self) -> BTreeSet<Cell> {
        if self.count > 0 && self.count == self.cells.len() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// All cells, when none of them can be a mine.
    pub fn known_safes(&self) -> BTreeSet<Cell> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Drop `cell` as a known mine. Returns whether the sentence changed.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count == 0 {
            return Err(EngineError::contradiction(format!(
                "{cell} is a mine but {} allows none",
                self
            )));
        }
        self.cells.remove(&cell);
        self.count -= 1;
        Ok(true)
    }

    /// Drop `cell` as known safe. Returns whether the sentence changed.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count == self.cells.len() {
            return Err(EngineError::contradiction(format!(
                "{cell} is safe but {} needs every cell to be a mine",
                self
            )));
        }
        self.cells.remove(&cell);
        Ok(true)
    }

    /// Strict, non-empty subset of `other`'s cells.
    pub fn is_strict_subset_of(&self, other: &Sentence) -> bool {
        !self.cells.is_empty()
            && self.cells.len() < other.cells.len()
            && self.cells.is_subset(&other.cells)
    }

    /// Subset inference: `self − sub`, where `sub` is a strict subset of `self`.
    pub fn subtract(&self, sub: &Sentence) -> Result<Sentence> {
        debug_assert!(sub.is_strict_subset_of(self));
        let count = self.count.checked_sub(sub.count).ok_or_else(|| {
            EngineError::contradiction(format!("{sub} has more mines than its superset {}", self))
        })?;
        Sentence::new(self.cells.difference(&sub.cells).copied(), count)
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{cell}")?;
        }
        write!(f, "}} = {}", self.count)
    }
}
