//! The game aggregate and the commands front ends send it.

use std::time::Duration;

use persistence::SaveStore;
use serde::{Deserialize, Serialize};
use sim_contracts::ContractSystem;
use sim_core::catalog::color_def;
use sim_core::{CellCoord, ColorId, Contract, GameState, StateError};
use tracing::{info, warn};

use crate::painter::{AutoPainterSystem, Stroke};
use crate::RuntimeError;

/// Requests accepted from a UI or CLI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Start a contract at the given rank, or the highest accessible one.
    AcceptContract {
        /// Rank level.
        #[serde(default)]
        rank: Option<u32>,
    },
    /// Drop the active contract.
    AbandonContract,
    /// Paint or erase one cell.
    SetCell {
        /// Column.
        x: i32,
        /// Row.
        y: i32,
        /// Color to paint; the selected color when absent.
        #[serde(default)]
        color: Option<ColorId>,
        /// Erase instead of paint.
        #[serde(default)]
        erase: bool,
    },
    /// Paint a batch of cells.
    SetCells {
        /// Target cells and colors; `None` erases.
        cells: Vec<(CellCoord, Option<ColorId>)>,
    },
    /// Revert the last edit.
    Undo,
    /// Erase the grid.
    ClearGrid,
    /// Unlock a color.
    BuyColor {
        /// Color id.
        id: String,
    },
    /// Buy one level of an upgrade.
    BuyUpgrade {
        /// Upgrade id.
        id: String,
    },
    /// Grow the grid to the next tier.
    BuyGridExpansion,
    /// Flip an automation flag.
    SetAutomationEnabled {
        /// Automation id.
        id: String,
        /// New state.
        enabled: bool,
    },
    /// Change the brush color.
    SelectColor {
        /// Color id.
        id: String,
    },
    /// Write the game to the store.
    Save,
    /// Replace the game from the store.
    Load,
    /// Produce an export string.
    Export,
    /// Replace the game from an export string.
    Import {
        /// Export string.
        blob: String,
    },
}

/// Result of a successful command.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Nothing to report.
    Done,
    /// A contract was started or abandoned.
    Contract(Box<Contract>),
    /// Whether a single edit changed anything.
    Changed(bool),
    /// Cells changed by a batch.
    Painted(usize),
    /// New level after a purchase, or the new side length after expansion.
    Level(u32),
    /// Whether a save was found and loaded.
    Loaded(bool),
    /// Export string.
    Exported(String),
}

/// Everything a running session owns. Access is serialized by the caller.
#[derive(Debug)]
pub struct Game {
    /// Authoritative game state.
    pub state: GameState,
    /// Contract generator.
    pub contracts: ContractSystem,
    /// Auto-painter scheduler.
    pub painter: AutoPainterSystem,
}

impl Game {
    /// Fresh game with a seeded contract generator.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::from_state(GameState::new(), seed)
    }

    /// Wraps an existing state.
    #[must_use]
    pub fn from_state(state: GameState, seed: u64) -> Self {
        Self {
            state,
            contracts: ContractSystem::new(seed),
            painter: AutoPainterSystem::default(),
        }
    }

    /// Runs the auto-painters for `dt`.
    pub fn advance(&mut self, dt: Duration) -> Vec<Stroke> {
        self.painter.advance(&mut self.state, dt)
    }

    /// Writes the current state to `store`.
    pub fn save(&self, store: &dyn SaveStore) -> Result<(), RuntimeError> {
        store.save(&self.state.to_document())?;
        Ok(())
    }

    /// Executes one command.
    pub fn execute(
        &mut self,
        command: Command,
        store: &dyn SaveStore,
    ) -> Result<Outcome, RuntimeError> {
        let state = &mut self.state;
        let outcome = match command {
            Command::AcceptContract { rank } => {
                let contract = self.contracts.accept_contract(state, rank)?;
                Outcome::Contract(Box::new(contract))
            }
            Command::AbandonContract => {
                let contract = self.contracts.abandon_contract(state)?;
                Outcome::Contract(Box::new(contract))
            }
            Command::SetCell { x, y, color, erase } => {
                let color = if erase {
                    None
                } else {
                    Some(color.unwrap_or_else(|| state.selected_color().clone()))
                };
                if let Some(id) = &color {
                    ensure_paintable(state, id)?;
                }
                Outcome::Changed(state.set_cell(x, y, color))
            }
            Command::SetCells { cells } => {
                // All or nothing: one bad color rejects the batch.
                for id in cells.iter().filter_map(|(_, color)| color.as_ref()) {
                    ensure_paintable(state, id)?;
                }
                Outcome::Painted(state.set_cells(cells))
            }
            Command::Undo => Outcome::Changed(state.undo()),
            Command::ClearGrid => Outcome::Changed(state.clear_grid()),
            Command::BuyColor { id } => {
                sim_econ::buy_color(state, &id)?;
                Outcome::Done
            }
            Command::BuyUpgrade { id } => Outcome::Level(sim_econ::buy_upgrade(state, &id)?),
            Command::BuyGridExpansion => Outcome::Level(sim_econ::buy_grid_expansion(state)?),
            Command::SetAutomationEnabled { id, enabled } => {
                state.set_automation_enabled(&id, enabled)?;
                Outcome::Done
            }
            Command::SelectColor { id } => {
                state.select_color(&id)?;
                Outcome::Done
            }
            Command::Save => {
                self.save(store)?;
                Outcome::Done
            }
            Command::Load => match store.load() {
                Ok(Some(doc)) => {
                    self.load_document(doc)?;
                    Outcome::Loaded(true)
                }
                Ok(None) => Outcome::Loaded(false),
                Err(err) => {
                    warn!(%err, "load failed, keeping current game");
                    return Err(err.into());
                }
            },
            Command::Export => Outcome::Exported(persistence::encode(&self.state.to_document())?),
            Command::Import { blob } => {
                let doc = match persistence::decode(&blob) {
                    Ok(doc) => doc,
                    Err(err) => {
                        warn!(%err, "import rejected");
                        return Err(err.into());
                    }
                };
                self.load_document(doc)?;
                info!("game imported");
                Outcome::Loaded(true)
            }
        };
        Ok(outcome)
    }

    fn load_document(&mut self, doc: sim_core::SaveDocument) -> Result<(), RuntimeError> {
        self.state.load_document(doc)?;
        self.painter.reset();
        Ok(())
    }
}

/// Manual edits may only use colors the player owns.
fn ensure_paintable(state: &GameState, id: &ColorId) -> Result<(), StateError> {
    if state.is_color_unlocked(id.as_str()) {
        Ok(())
    } else if color_def(id.as_str()).is_none() {
        Err(StateError::UnknownColor(id.to_string()))
    } else {
        Err(StateError::ColorLocked(id.to_string()))
    }
}
