//! Driving loop: pairs one [`Minefield`] with one [`KnowledgeEngine`] and
//! relays revealed counts from the board to the agent.

use crate::board::Minefield;
use crate::engine::{AgentConfig, KnowledgeEngine};
use crate::error::{EngineError, Result};
use crate::types::Cell;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// What happened during one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// A mine-free cell was opened.
    Revealed {
        cell: Cell,
        count: usize,
        guessed: bool,
    },
    /// The opened cell held a mine; the game is over.
    Exploded(Cell),
    /// No cell is left to open.
    Finished,
}

/// How a played-out game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Won,
    Lost(Cell),
    /// Nothing left to open but the flags do not match the mines.
    Stalled,
}

/// One game between the agent and a board.
#[derive(Debug, Clone)]
pub struct Session {
    field: Minefield,
    engine: KnowledgeEngine,
    exploded: Option<Cell>,
}

impl Session {
    /// Start a game; `seed` drives the agent's guesses.
    pub fn new(field: Minefield, seed: Option<u64>) -> Result<Self> {
        let size = field.size();
        let config = AgentConfig {
            rows: size.rows,
            cols: size.cols,
            seed,
        };
        Ok(Self {
            engine: KnowledgeEngine::new(config)?,
            field,
            exploded: None,
        })
    }

    pub fn engine(&self) -> &KnowledgeEngine {
        &self.engine
    }

    pub fn field(&self) -> &Minefield {
        &self.field
    }

    pub fn exploded(&self) -> Option<Cell> {
        self.exploded
    }

    /// Open `cell` on the board and tell the agent what it showed.
    #[instrument(skip(self))]
    pub fn reveal(&mut self, cell: Cell) -> Result<StepOutcome> {
        self.reveal_move(cell, false)
    }

    /// Let the agent pick a cell and open it.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if let Some(cell) = self.exploded {
            return Ok(StepOutcome::Exploded(cell));
        }
        match self.engine.next_move() {
            Some(mv) => self.reveal_move(mv.cell(), mv.is_guess()),
            None => Ok(StepOutcome::Finished),
        }
    }

    /// Step until the game ends.
    #[instrument(skip(self))]
    pub fn play_out(&mut self) -> Result<GameResult> {
        loop {
            match self.step()? {
                StepOutcome::Revealed { .. } => {}
                StepOutcome::Exploded(cell) => {
                    info!(%cell, "agent hit a mine");
                    return Ok(GameResult::Lost(cell));
                }
                StepOutcome::Finished => {
                    let result = if self.field.won() {
                        GameResult::Won
                    } else {
                        GameResult::Stalled
                    };
                    info!(?result, moves = self.engine.moves_made().len(), "game over");
                    return Ok(result);
                }
            }
        }
    }

    fn reveal_move(&mut self, cell: Cell, guessed: bool) -> Result<StepOutcome> {
        let size = self.field.size();
        if !size.contains(cell) {
            return Err(EngineError::invalid_input(format!(
                "{cell} is outside the {}x{} board",
                size.rows, size.cols
            )));
        }
        if self.field.is_mine(cell) {
            self.exploded = Some(cell);
            return Ok(StepOutcome::Exploded(cell));
        }
        let count = self.field.nearby_mines(cell)?;
        self.engine.record_revealed(cell, count)?;
        for &mine in self.engine.mines() {
            self.field.flag(mine);
        }
        debug!(%cell, count, guessed, "revealed");
        Ok(StepOutcome::Revealed { cell, count, guessed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::AgentRng;
    use crate::types::BoardSize;
    use proptest::prelude::*;

    #[test]
    fn test_single_mine_board_is_won() {
        let field = Minefield::from_mines(BoardSize::new(3, 3), [Cell::new(0, 0)]).unwrap();
        let mut session = Session::new(field, Some(1)).unwrap();

        let first = session.reveal(Cell::new(2, 2)).unwrap();
        assert_eq!(
            first,
            StepOutcome::Revealed { cell: Cell::new(2, 2), count: 0, guessed: false }
        );
        assert_eq!(session.play_out().unwrap(), GameResult::Won);
        assert!(session.engine().mines().contains(&Cell::new(0, 0)));
        assert_eq!(session.engine().moves_made().len(), 8);
    }

    #[test]
    fn test_revealing_a_mine_loses() {
        let field = Minefield::from_mines(BoardSize::new(2, 2), [Cell::new(0, 0)]).unwrap();
        let mut session = Session::new(field, Some(1)).unwrap();
        assert_eq!(session.reveal(Cell::new(0, 0)).unwrap(), StepOutcome::Exploded(Cell::new(0, 0)));
        assert_eq!(session.step().unwrap(), StepOutcome::Exploded(Cell::new(0, 0)));
        assert_eq!(session.play_out().unwrap(), GameResult::Lost(Cell::new(0, 0)));
    }

    #[test]
    fn test_mine_free_board_is_won_from_any_start() {
        let field = Minefield::from_mines(BoardSize::new(4, 5), []).unwrap();
        let mut session = Session::new(field, Some(9)).unwrap();
        assert_eq!(session.play_out().unwrap(), GameResult::Won);
        assert_eq!(session.engine().moves_made().len(), 20);
    }

    #[test]
    fn test_repeated_reveal_is_an_error() {
        let field = Minefield::from_mines(BoardSize::new(2, 2), []).unwrap();
        let mut session = Session::new(field, Some(1)).unwrap();
        session.reveal(Cell::new(0, 0)).unwrap();
        assert!(session.reveal(Cell::new(0, 0)).is_err());
    }

    #[test]
    fn test_reveal_off_board_is_an_error() {
        let field = Minefield::from_mines(BoardSize::new(3, 3), []).unwrap();
        let mut session = Session::new(field, Some(1)).unwrap();

        let err = session.reveal(Cell::new(5, 5)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
        let err = session.reveal(Cell::new(0, 5)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
        assert!(session.engine().moves_made().is_empty());
        assert_eq!(session.exploded(), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Play random boards to the end, checking the agent's knowledge
        /// against the true layout after every turn.
        #[test]
        fn prop_knowledge_is_sound_and_monotonic(
            rows in 1usize..7,
            cols in 1usize..7,
            density in 0usize..40,
            board_seed in any::<u64>(),
            agent_seed in any::<u64>(),
        ) {
            let size = BoardSize::new(rows, cols);
            let mine_count = (size.len() * density / 100).min(size.len() - 1);
            let mut rng = AgentRng::from_seed(board_seed);
            let field = Minefield::new(size, mine_count, &mut rng).unwrap();
            let mut session = Session::new(field, Some(agent_seed)).unwrap();

            let mut prev = session.engine().clone();
            loop {
                let safe_before = session.engine().safe_move();
                let outcome = session.step().unwrap();
                let engine = session.engine();

                prop_assert!(engine.is_consistent());
                prop_assert!(engine.mines().is_disjoint(engine.safes()));
                for sentence in engine.knowledge() {
                    prop_assert!(sentence.count() <= sentence.cells().len());
                    prop_assert_eq!(sentence.known_mines(), sentence.known_mines());
                }
                for &mine in engine.mines() {
                    prop_assert!(session.field().is_mine(mine));
                }
                for &safe in engine.safes() {
                    prop_assert!(!session.field().is_mine(safe));
                }
                prop_assert!(prev.mines().is_subset(engine.mines()));
                prop_assert!(prev.safes().is_subset(engine.safes()));
                prop_assert!(prev.moves_made().is_subset(engine.moves_made()));

                match outcome {
                    StepOutcome::Revealed { cell, guessed, .. } => {
                        if let Some(safe) = safe_before {
                            prop_assert!(!guessed);
                            prop_assert_eq!(cell, safe);
                        }
                    }
                    StepOutcome::Exploded(_) => {
                        // Only a guess can hit a mine.
                        prop_assert!(safe_before.is_none());
                        break;
                    }
                    StepOutcome::Finished => {
                        prop_assert!(session.field().won());
                        break;
                    }
                }

                let mut settled = engine.clone();
                prop_assert!(!settled.infer().unwrap());
                prev = engine.clone();
            }
        }
    }
}
