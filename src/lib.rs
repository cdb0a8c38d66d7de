//! Knowledge-based Minesweeper agent.
//!
//! The agent keeps constraint sentences of the form "exactly `count` of these
//! cells are mines", infers mines and safe cells to a fixed point after every
//! revealed cell, and picks its next move safe-first.
//!
//! On `wasm32` the agent is also exported to JavaScript via wasm-bindgen.
//! Cells cross the boundary as `{ row, col }` objects.

pub mod board;
pub mod engine;
pub mod error;
pub mod rng;
pub mod sentence;
pub mod session;
pub mod types;

pub use board::Minefield;
pub use engine::{AgentConfig, KnowledgeEngine, Move};
pub use error::{EngineError, Result};
pub use sentence::Sentence;
pub use session::{GameResult, Session, StepOutcome};
pub use types::{BoardSize, Cell};

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use crate::engine::{AgentConfig, KnowledgeEngine};
    use crate::error::EngineError;
    use crate::rng::AgentRng;
    use crate::types::{BoardSize, Cell};
    use crate::{GameResult, Minefield, Session};
    use serde::Serialize;
    use std::collections::BTreeSet;
    use wasm_bindgen::prelude::*;

    fn engine_error(err: EngineError) -> JsValue {
        js_sys::Error::new(&err.to_string()).into()
    }

    fn cell_value(cell: Option<Cell>) -> Result<JsValue, JsValue> {
        match cell {
            Some(cell) => Ok(serde_wasm_bindgen::to_value(&cell)?),
            None => Ok(JsValue::NULL),
        }
    }

    fn cell_array(cells: &BTreeSet<Cell>) -> Result<js_sys::Array, JsValue> {
        let arr = js_sys::Array::new();
        for cell in cells {
            arr.push(&serde_wasm_bindgen::to_value(cell)?);
        }
        Ok(arr)
    }

    /// The agent as a JS class.
    #[wasm_bindgen(js_name = "MinesweeperAgent")]
    pub struct WasmAgent {
        inner: KnowledgeEngine,
    }

    #[wasm_bindgen(js_class = "MinesweeperAgent")]
    impl WasmAgent {
        /// `config`: `{ rows, cols, seed? }`.
        #[wasm_bindgen(constructor)]
        pub fn new(config: JsValue) -> Result<WasmAgent, JsValue> {
            let config: AgentConfig = serde_wasm_bindgen::from_value(config)?;
            let inner = KnowledgeEngine::new(config).map_err(engine_error)?;
            Ok(WasmAgent { inner })
        }

        #[wasm_bindgen(js_name = "recordRevealed")]
        pub fn record_revealed(&mut self, row: usize, col: usize, count: usize) -> Result<(), JsValue> {
            self.inner
                .record_revealed(Cell::new(row, col), count)
                .map_err(engine_error)
        }

        /// `{ row, col }` or `null`.
        #[wasm_bindgen(js_name = "safeMove")]
        pub fn safe_move(&self) -> Result<JsValue, JsValue> {
            cell_value(self.inner.safe_move())
        }

        /// `{ row, col }` or `null`.
        #[wasm_bindgen(js_name = "fallbackMove")]
        pub fn fallback_move(&mut self) -> Result<JsValue, JsValue> {
            cell_value(self.inner.fallback_move())
        }

        pub fn mines(&self) -> Result<js_sys::Array, JsValue> {
            cell_array(self.inner.mines())
        }

        pub fn safes(&self) -> Result<js_sys::Array, JsValue> {
            cell_array(self.inner.safes())
        }
    }

    #[derive(Serialize)]
    struct SimulationReport {
        won: bool,
        lost_at: Option<Cell>,
        moves: usize,
    }

    /// Play one random board to the end.
    /// Returns `{ won, lost_at, moves }`.
    #[wasm_bindgen(js_name = "simulateGame")]
    pub fn wasm_simulate_game(
        rows: usize,
        cols: usize,
        mine_count: usize,
        seed: Option<u64>,
    ) -> Result<JsValue, JsValue> {
        let mut rng = AgentRng::from_optional_seed(seed);
        let field = Minefield::new(BoardSize::new(rows, cols), mine_count, &mut rng)
            .map_err(engine_error)?;
        let mut session = Session::new(field, seed).map_err(engine_error)?;
        let result = session.play_out().map_err(engine_error)?;

        let report = SimulationReport {
            won: result == GameResult::Won,
            lost_at: match result {
                GameResult::Lost(cell) => Some(cell),
                _ => None,
            },
            moves: session.engine().moves_made().len(),
        };
        Ok(serde_wasm_bindgen::to_value(&report)?)
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "minesweeper agent ready".to_string()
    }
}
