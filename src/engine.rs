//! Knowledge engine: the agent's constraint base, fixed-point inference and
//! move selection.
//!
//! Each revealed cell contributes one sentence over its undetermined
//! neighbors. Inference then repeats three rules until nothing changes:
//! - direct extraction (a sentence whose count is 0 or equal to its size)
//! - propagation of every proven mine / safe cell into all sentences
//! - subset inference (`B ⊃ A` yields `B − A` with `count_B − count_A`)

use crate::error::{EngineError, Result};
use crate::rng::AgentRng;
use crate::sentence::Sentence;
use crate::types::{BoardSize, Cell, NeighborCache};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, instrument, trace};

/// Largest neighbor count any cell can report.
pub const MAX_NEIGHBOR_MINES: usize = 8;

/// Construction parameters for a [`KnowledgeEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub rows: usize,
    pub cols: usize,
    /// Seed for fallback guesses. `None` draws from system entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl AgentConfig {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols, seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn size(&self) -> BoardSize {
        BoardSize::new(self.rows, self.cols)
    }
}

/// A move chosen by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    /// Proven free of mines.
    Safe(Cell),
    /// No safe cell was known; picked among the cells not known to be mines.
    Guess(Cell),
}

impl Move {
    pub fn cell(self) -> Cell {
        match self {
            Move::Safe(cell) | Move::Guess(cell) => cell,
        }
    }

    pub fn is_guess(self) -> bool {
        matches!(self, Move::Guess(_))
    }
}

/// Everything the agent knows. Cloned to stage an update.
#[derive(Debug, Clone, Default)]
struct KnowledgeBase {
    moves_made: BTreeSet<Cell>,
    mines: BTreeSet<Cell>,
    safes: BTreeSet<Cell>,
    knowledge: Vec<Sentence>,
}

impl KnowledgeBase {
    /// Record `cell` as a mine everywhere. Returns whether it was new.
    fn mark_mine(&mut self, cell: Cell) -> Result<bool> {
        if self.safes.contains(&cell) {
            return Err(EngineError::contradiction(format!(
                "{cell} is proven both safe and a mine"
            )));
        }
        if !self.mines.insert(cell) {
            return Ok(false);
        }
        debug!(%cell, "proved mine");
        for sentence in &mut self.knowledge {
            sentence.mark_mine(cell)?;
        }
        self.prune();
        Ok(true)
    }

    /// Record `cell` as safe everywhere. Returns whether it was new.
    fn mark_safe(&mut self, cell: Cell) -> Result<bool> {
        if self.mines.contains(&cell) {
            return Err(EngineError::contradiction(format!(
                "{cell} is proven both a mine and safe"
            )));
        }
        if !self.safes.insert(cell) {
            return Ok(false);
        }
        debug!(%cell, "proved safe");
        for sentence in &mut self.knowledge {
            sentence.mark_safe(cell)?;
        }
        self.prune();
        Ok(true)
    }

    /// Drop vacuous sentences and the duplicates that marking can create.
    fn prune(&mut self) {
        let mut seen = HashSet::with_capacity(self.knowledge.len());
        self.knowledge
            .retain(|sentence| !sentence.is_vacuous() && seen.insert(sentence.clone()));
    }

    /// Add a sentence unless it is vacuous or already known.
    fn add_sentence(&mut self, sentence: Sentence) -> bool {
        if sentence.is_vacuous() || self.knowledge.contains(&sentence) {
            return false;
        }
        debug!(%sentence, "new sentence");
        self.knowledge.push(sentence);
        true
    }

    /// Fold a revealed cell and its neighbor count into the base.
    fn absorb(&mut self, cell: Cell, neighbor_mines: usize, neighbors: &[Cell]) -> Result<()> {
        self.moves_made.insert(cell);
        self.mark_safe(cell)?;

        let known_mines = neighbors.iter().filter(|&n| self.mines.contains(n)).count();
        let remaining = neighbor_mines.checked_sub(known_mines).ok_or_else(|| {
            EngineError::contradiction(format!(
                "{cell} reports {neighbor_mines} mines but {known_mines} neighbors are known mines"
            ))
        })?;
        let undetermined = neighbors
            .iter()
            .filter(|&n| !self.mines.contains(n) && !self.safes.contains(n))
            .copied();
        let sentence = Sentence::new(undetermined, remaining)?;
        self.add_sentence(sentence);

        self.infer()?;
        Ok(())
    }

    /// Run inference until a full pass changes nothing.
    /// Returns whether anything was learned.
    fn infer(&mut self) -> Result<bool> {
        let mut learned = false;
        let mut passes = 0usize;

        loop {
            passes += 1;
            let mut changed = false;

            // Direct extraction, then propagation.
            let mut new_mines = BTreeSet::new();
            let mut new_safes = BTreeSet::new();
            for sentence in &self.knowledge {
                new_mines.extend(sentence.known_mines());
                new_safes.extend(sentence.known_safes());
            }
            for cell in new_mines {
                changed |= self.mark_mine(cell)?;
            }
            for cell in new_safes {
                changed |= self.mark_safe(cell)?;
            }

            // Subset inference over every ordered pair.
            let mut derived = Vec::new();
            for (i, sub) in self.knowledge.iter().enumerate() {
                for (j, sup) in self.knowledge.iter().enumerate() {
                    if i != j && sub.is_strict_subset_of(sup) {
                        derived.push(sup.subtract(sub)?);
                    }
                }
            }
            for sentence in derived {
                changed |= self.add_sentence(sentence);
            }

            if !changed {
                break;
            }
            learned = true;
        }

        trace!(passes, sentences = self.knowledge.len(), "inference reached fixed point");
        Ok(learned)
    }

    fn is_consistent(&self) -> bool {
        self.mines.is_disjoint(&self.safes)
            && self.moves_made.is_subset(&self.safes)
            && self.knowledge.iter().all(|sentence| {
                !sentence.is_vacuous()
                    && sentence.count() <= sentence.cells().len()
                    && sentence
                        .cells()
                        .iter()
                        .all(|c| !self.mines.contains(c) && !self.safes.contains(c))
            })
    }
}

/// The Minesweeper agent.
///
/// Created once per game; all evidence enters through
/// [`record_revealed`](Self::record_revealed), which leaves the base fully
/// inferred before returning.
#[derive(Debug, Clone)]
pub struct KnowledgeEngine {
    size: BoardSize,
    neighbors: NeighborCache,
    rng: AgentRng,
    kb: KnowledgeBase,
}

impl KnowledgeEngine {
    #[instrument]
    pub fn new(config: AgentConfig) -> Result<Self> {
        let size = config.size();
        size.validate()?;
        Ok(Self {
            size,
            neighbors: NeighborCache::new(size),
            rng: AgentRng::from_optional_seed(config.seed),
            kb: KnowledgeBase::default(),
        })
    }

    /// Record that `cell` was revealed with `neighbor_mines` mines around it,
    /// then infer to a fixed point.
    ///
    /// The update is atomic: on error the engine is left unchanged.
    #[instrument(skip(self))]
    pub fn record_revealed(&mut self, cell: Cell, neighbor_mines: usize) -> Result<()> {
        if !self.size.contains(cell) {
            return Err(EngineError::invalid_input(format!(
                "{cell} is outside the {}x{} board",
                self.size.rows, self.size.cols
            )));
        }
        if self.kb.moves_made.contains(&cell) {
            return Err(EngineError::invalid_input(format!("{cell} was already revealed")));
        }
        let neighbors = self.neighbors.get(cell);
        if neighbor_mines > MAX_NEIGHBOR_MINES || neighbor_mines > neighbors.len() {
            return Err(EngineError::invalid_input(format!(
                "{cell} has {} neighbors and cannot report {neighbor_mines} mines",
                neighbors.len()
            )));
        }

        let mut staged = self.kb.clone();
        staged.absorb(cell, neighbor_mines, neighbors)?;
        debug_assert!(staged.is_consistent());
        self.kb = staged;
        Ok(())
    }

    /// Re-run inference. On an already inferred base this changes nothing
    /// and returns `Ok(false)`.
    #[instrument(skip(self))]
    pub fn infer(&mut self) -> Result<bool> {
        let mut staged = self.kb.clone();
        let learned = staged.infer()?;
        self.kb = staged;
        Ok(learned)
    }

    /// A proven-safe cell not yet revealed, lowest row-major first.
    pub fn safe_move(&self) -> Option<Cell> {
        self.kb.safes.difference(&self.kb.moves_made).next().copied()
    }

    /// A uniformly random cell neither revealed nor known to be a mine.
    #[instrument(skip(self))]
    pub fn fallback_move(&mut self) -> Option<Cell> {
        let candidates: Vec<Cell> = self
            .size
            .cells()
            .filter(|c| !self.kb.moves_made.contains(c) && !self.kb.mines.contains(c))
            .collect();
        let choice = self.rng.pick(&candidates);
        debug!(candidates = candidates.len(), ?choice, "fallback move");
        choice
    }

    /// Safe move if one is known, otherwise a fallback guess.
    pub fn next_move(&mut self) -> Option<Move> {
        match self.safe_move() {
            Some(cell) => Some(Move::Safe(cell)),
            None => self.fallback_move().map(Move::Guess),
        }
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.kb.mines
    }

    pub fn safes(&self) -> &BTreeSet<Cell> {
        &self.kb.safes
    }

    pub fn moves_made(&self) -> &BTreeSet<Cell> {
        &self.kb.moves_made
    }

    pub fn knowledge(&self) -> &[Sentence] {
        &self.kb.knowledge
    }

    /// Checks the invariants inference must maintain: no cell both mine and
    /// safe, revealed cells safe, every sentence non-vacuous, within its
    /// count bound, and free of already determined cells.
    pub fn is_consistent(&self) -> bool {
        self.kb.is_consistent()
    }
}
