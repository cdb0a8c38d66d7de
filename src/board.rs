//! The board the agent plays against: mine placement, neighbor counts and
//! flag bookkeeping.
//!
//! The engine never reads this directly; a driving loop (see
//! [`crate::session`]) relays revealed counts between the two.

use crate::error::{EngineError, Result};
use crate::rng::AgentRng;
use crate::types::{BoardSize, Cell, NeighborCache};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// A Minesweeper board with hidden mines.
#[derive(Debug, Clone)]
pub struct Minefield {
    size: BoardSize,
    neighbors: NeighborCache,
    /// Row-major, one flag per cell.
    mines: Vec<bool>,
    mine_count: usize,
    flagged: BTreeSet<Cell>,
}

impl Minefield {
    /// Place `mine_count` mines uniformly at random.
    ///
    /// At least one cell must stay mine-free.
    #[instrument(skip(rng))]
    pub fn new(size: BoardSize, mine_count: usize, rng: &mut AgentRng) -> Result<Self> {
        size.validate()?;
        if mine_count >= size.len() {
            return Err(EngineError::invalid_input(format!(
                "{mine_count} mines do not fit on a {}x{} board",
                size.rows, size.cols
            )));
        }

        let mut mines = vec![false; size.len()];
        let mut placed = 0;
        while placed < mine_count {
            let idx = rng.below(size.len());
            if !mines[idx] {
                mines[idx] = true;
                placed += 1;
            }
        }
        debug!(placed, "mines placed");

        Ok(Self {
            size,
            neighbors: NeighborCache::new(size),
            mines,
            mine_count,
            flagged: BTreeSet::new(),
        })
    }

    /// Board with mines at exactly the given cells.
    pub fn from_mines(size: BoardSize, cells: impl IntoIterator<Item = Cell>) -> Result<Self> {
        size.validate()?;
        let mut mines = vec![false; size.len()];
        for cell in cells {
            if !size.contains(cell) {
                return Err(EngineError::invalid_input(format!("mine {cell} is off the board")));
            }
            mines[size.index(cell)] = true;
        }
        let mine_count = mines.iter().filter(|&&m| m).count();

        Ok(Self {
            size,
            neighbors: NeighborCache::new(size),
            mines,
            mine_count,
            flagged: BTreeSet::new(),
        })
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    #[inline(always)]
    pub fn is_mine(&self, cell: Cell) -> bool {
        self.size.contains(cell) && self.mines[self.size.index(cell)]
    }

    /// Mines among the 8 cells around `cell`, not counting `cell` itself.
    pub fn nearby_mines(&self, cell: Cell) -> Result<usize> {
        if !self.size.contains(cell) {
            return Err(EngineError::invalid_input(format!(
                "{cell} is outside the {}x{} board",
                self.size.rows, self.size.cols
            )));
        }
        Ok(self
            .neighbors
            .get(cell)
            .iter()
            .filter(|&&n| self.mines[self.size.index(n)])
            .count())
    }

    /// Mark `cell` as believed to hold a mine.
    pub fn flag(&mut self, cell: Cell) {
        if self.size.contains(cell) {
            self.flagged.insert(cell);
        }
    }

    pub fn flagged(&self) -> &BTreeSet<Cell> {
        &self.flagged
    }

    /// True once exactly the mined cells are flagged.
    pub fn won(&self) -> bool {
        self.flagged.len() == self.mine_count && self.flagged.iter().all(|&c| self.is_mine(c))
    }

    /// Text picture of the layout: `X` for mines.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let rule = format!("{}-\n", "--".repeat(self.size.cols));
        for row in 0..self.size.rows {
            out.push_str(&rule);
            for col in 0..self.size.cols {
                out.push_str(if self.is_mine(Cell::new(row, col)) { "|X" } else { "| " });
            }
            out.push_str("|\n");
        }
        out.push_str(&rule);
        out
    }
}
