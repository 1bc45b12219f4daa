//! Knowledge-base Minesweeper reasoner.
//!
//! Deduces safe cells and mines with certainty by constraint propagation
//! over statements of the form "exactly N of these cells are mines".
//! Exports a `Reasoner` class to JavaScript via wasm-bindgen.

pub mod board;
pub mod config;
pub mod constraint;
pub mod error;
pub mod game;
pub mod reasoner;
pub mod types;

pub use config::BoardConfig;
pub use constraint::Constraint;
pub use error::{ConfigError, KnowledgeError};
pub use reasoner::Reasoner;
pub use types::Cell;

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use crate::config::BoardConfig;
    use crate::reasoner::Reasoner;
    use crate::types::Cell;
    use std::collections::HashSet;
    use wasm_bindgen::prelude::*;

    fn sorted(cells: &HashSet<Cell>) -> Result<JsValue, JsValue> {
        let mut cells: Vec<Cell> = cells.iter().copied().collect();
        cells.sort();
        serde_wasm_bindgen::to_value(&cells).map_err(Into::into)
    }

    /// One game's knowledge base.
    #[wasm_bindgen(js_name = "Reasoner")]
    pub struct WasmReasoner {
        inner: Reasoner,
    }

    #[wasm_bindgen(js_class = "Reasoner")]
    impl WasmReasoner {
        #[wasm_bindgen(constructor)]
        pub fn new(rows: usize, cols: usize, mines: usize) -> WasmReasoner {
            WasmReasoner { inner: Reasoner::new(rows, cols, mines) }
        }

        /// Build from the game's state JSON; anything unparseable means a 10x10 board with 10 mines.
        #[wasm_bindgen(js_name = "fromStateJson")]
        pub fn from_state_json(json: &str) -> WasmReasoner {
            WasmReasoner { inner: Reasoner::from_config(&BoardConfig::from_json_str(json)) }
        }

        /// Absorb a revealed cell. Throws on an invalid observation.
        #[wasm_bindgen(js_name = "addKnowledge")]
        pub fn add_knowledge(&mut self, row: usize, col: usize, count: usize) -> Result<(), JsError> {
            self.inner.add_knowledge(Cell::new(row, col), count)?;
            Ok(())
        }

        /// Known-safe cells as `[{ row, col }]`.
        pub fn safes(&self) -> Result<JsValue, JsValue> {
            sorted(self.inner.safes())
        }

        /// Known mines as `[{ row, col }]`.
        pub fn mines(&self) -> Result<JsValue, JsValue> {
            sorted(self.inner.mines())
        }

        #[wasm_bindgen(js_name = "movesMade")]
        pub fn moves_made(&self) -> Result<JsValue, JsValue> {
            sorted(self.inner.moves_made())
        }

        /// Returns `{ row, col }` or `null`.
        #[wasm_bindgen(js_name = "nextSafeMove")]
        pub fn next_safe_move(&self) -> JsValue {
            match self.inner.next_safe_move() {
                Some(cell) => {
                    let obj = js_sys::Object::new();
                    js_sys::Reflect::set(&obj, &"row".into(), &(cell.row as u32).into()).unwrap();
                    js_sys::Reflect::set(&obj, &"col".into(), &(cell.col as u32).into()).unwrap();
                    obj.into()
                }
                None => JsValue::NULL,
            }
        }

        #[wasm_bindgen(js_name = "isSolved")]
        pub fn is_solved(&self) -> bool {
            self.inner.is_solved()
        }
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "WASM reasoner ready".to_string()
    }
}
