//! The game state aggregate.
//!
//! `GameState` exclusively owns the grid and every progression field. All
//! mutations go through its methods, which publish [`GameEvent`]s on the
//! owned [`EventBus`] before returning. Any cell mutation re-evaluates the
//! active contract synchronously, so observers of a cell event never see a
//! stale contract.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{
    color_def, default_unlocked, grid_tier, ColorId, AUTO_PAINTERS_SWITCH, DEFAULT_COLOR,
    STARTING_COLORS,
};
use crate::contract::{Contract, Progress};
use crate::events::{EventBus, GameEvent};
use crate::grid::{CellCoord, Grid, GridError, GridEvent};
use crate::snapshot::{SaveDocument, SAVE_VERSION};

/// Rejected state mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// Money amounts must be greater than zero.
    #[error("amount must be positive")]
    NonPositiveAmount,
    /// Balance too low.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        /// Requested amount.
        needed: u64,
        /// Current balance.
        available: u64,
    },
    /// Color id not in the catalog.
    #[error("unknown color: {0}")]
    UnknownColor(String),
    /// Color exists but is not unlocked.
    #[error("color {0} is not unlocked")]
    ColorLocked(String),
    /// Automation flags need the upgrade to be owned.
    #[error("automation {0} is not owned")]
    AutomationNotOwned(String),
    /// Only one contract may be active.
    #[error("a contract is already active")]
    ContractActive,
    /// Nothing to abandon.
    #[error("no active contract")]
    NoActiveContract,
    /// Save written by an unsupported format version.
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u32),
    /// Save content failed validation.
    #[error("invalid save data: {0}")]
    InvalidSave(String),
    /// Grid rejected the operation.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Lifetime statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Contracts completed.
    pub contracts_completed: u64,
    /// Contracts abandoned.
    pub contracts_abandoned: u64,
    /// Money received.
    pub money_earned: u64,
    /// Money spent.
    pub money_spent: u64,
    /// Cells painted with a color (erasures excluded).
    pub cells_painted: u64,
    /// Colors bought.
    pub colors_unlocked: u64,
    /// Upgrade levels bought.
    pub upgrades_purchased: u64,
}

/// Aggregate root of a game.
#[derive(Debug)]
pub struct GameState {
    grid: Grid,
    grid_level: u32,
    money: u64,
    unlocked_colors: BTreeSet<ColorId>,
    selected_color: ColorId,
    upgrades: BTreeMap<String, u32>,
    automation_enabled: BTreeMap<String, bool>,
    active_contract: Option<Contract>,
    completed_contracts: u32,
    stats: Stats,
    events: EventBus,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Fresh game: 4x4 grid, no money, starting colors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: Grid::default(),
            grid_level: 0,
            money: 0,
            unlocked_colors: default_unlocked().map(ColorId::from).collect(),
            selected_color: ColorId::from(DEFAULT_COLOR),
            upgrades: BTreeMap::new(),
            automation_enabled: BTreeMap::new(),
            active_contract: None,
            completed_contracts: 0,
            stats: Stats::default(),
            events: EventBus::new(),
        }
    }

    /// Event bus for subscriptions.
    pub fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Read-only grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Grid expansion tier.
    #[must_use]
    pub fn grid_level(&self) -> u32 {
        self.grid_level
    }

    /// Balance.
    #[must_use]
    pub fn money(&self) -> u64 {
        self.money
    }

    /// Unlocked colors.
    #[must_use]
    pub fn unlocked_colors(&self) -> &BTreeSet<ColorId> {
        &self.unlocked_colors
    }

    /// Whether `id` is unlocked.
    #[must_use]
    pub fn is_color_unlocked(&self, id: &str) -> bool {
        self.unlocked_colors.contains(id)
    }

    /// Brush color.
    #[must_use]
    pub fn selected_color(&self) -> &ColorId {
        &self.selected_color
    }

    /// Owned upgrade levels.
    #[must_use]
    pub fn upgrades(&self) -> &BTreeMap<String, u32> {
        &self.upgrades
    }

    /// Owned level of an upgrade, 0 if not owned.
    #[must_use]
    pub fn upgrade_level(&self, id: &str) -> u32 {
        self.upgrades.get(id).copied().unwrap_or(0)
    }

    /// Contract in progress.
    #[must_use]
    pub fn active_contract(&self) -> Option<&Contract> {
        self.active_contract.as_ref()
    }

    /// Completed contracts.
    #[must_use]
    pub fn completed_contracts(&self) -> u32 {
        self.completed_contracts
    }

    /// Lifetime statistics.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Paints or erases one cell. See [`Grid::set_cell`].
    pub fn set_cell(&mut self, x: i32, y: i32, color: Option<ColorId>) -> bool {
        let mut out = Vec::new();
        let changed = self.grid.set_cell(x, y, color, &mut out);
        self.after_grid_change(out);
        changed
    }

    /// Applies a batch of writes. See [`Grid::set_cells`].
    pub fn set_cells<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = (CellCoord, Option<ColorId>)>,
    {
        let mut out = Vec::new();
        let count = self.grid.set_cells(batch, &mut out);
        self.after_grid_change(out);
        count
    }

    /// Reverts the most recent edit.
    pub fn undo(&mut self) -> bool {
        let mut out = Vec::new();
        let undone = self.grid.undo(&mut out);
        self.after_grid_change(out);
        undone
    }

    /// Erases the whole grid.
    pub fn clear_grid(&mut self) -> bool {
        let mut out = Vec::new();
        let cleared = self.grid.clear(&mut out);
        self.dispatch_grid(out);
        cleared
    }

    /// Grows the grid without touching the expansion tier.
    pub fn expand_grid(&mut self, width: u32, height: u32) -> Result<(), StateError> {
        let mut out = Vec::new();
        self.grid.expand(width, height, &mut out)?;
        self.dispatch_grid(out);
        Ok(())
    }

    /// Moves to expansion tier `level` and resizes the grid to match.
    pub fn advance_grid_level(&mut self, level: u32) -> Result<(), StateError> {
        let tier = grid_tier(level)
            .ok_or_else(|| StateError::InvalidSave(format!("no grid tier {level}")))?;
        self.expand_grid(tier.size, tier.size)?;
        self.grid_level = level;
        info!(level, size = tier.size, "grid expanded");
        Ok(())
    }

    /// Credits money.
    pub fn add_money(&mut self, amount: u64) -> Result<u64, StateError> {
        if amount == 0 {
            return Err(StateError::NonPositiveAmount);
        }
        self.money = self.money.saturating_add(amount);
        self.stats.money_earned = self.stats.money_earned.saturating_add(amount);
        self.publish(GameEvent::MoneyChanged {
            money: self.money,
            delta: i64::try_from(amount).unwrap_or(i64::MAX),
        });
        Ok(self.money)
    }

    /// Debits money if the balance allows.
    pub fn spend_money(&mut self, amount: u64) -> Result<u64, StateError> {
        if amount == 0 {
            return Err(StateError::NonPositiveAmount);
        }
        if amount > self.money {
            return Err(StateError::InsufficientFunds {
                needed: amount,
                available: self.money,
            });
        }
        self.money -= amount;
        self.stats.money_spent = self.stats.money_spent.saturating_add(amount);
        self.publish(GameEvent::MoneyChanged {
            money: self.money,
            delta: -i64::try_from(amount).unwrap_or(i64::MAX),
        });
        Ok(self.money)
    }

    /// Adds a catalog color to the palette. `false` if unknown or owned.
    pub fn unlock_color(&mut self, id: &str) -> bool {
        if color_def(id).is_none() || self.unlocked_colors.contains(id) {
            return false;
        }
        let color = ColorId::from(id);
        let _ = self.unlocked_colors.insert(color.clone());
        self.stats.colors_unlocked += 1;
        info!(color = id, "color unlocked");
        self.publish(GameEvent::ColorUnlocked { color });
        true
    }

    /// Changes the brush color.
    pub fn select_color(&mut self, id: &str) -> Result<(), StateError> {
        if color_def(id).is_none() {
            return Err(StateError::UnknownColor(id.to_string()));
        }
        if !self.unlocked_colors.contains(id) {
            return Err(StateError::ColorLocked(id.to_string()));
        }
        if self.selected_color.as_str() != id {
            self.selected_color = ColorId::from(id);
            self.publish(GameEvent::ColorSelected {
                color: self.selected_color.clone(),
            });
        }
        Ok(())
    }

    /// Raises an upgrade by one level. Pricing is the shop's concern.
    pub fn purchase_upgrade(&mut self, id: &str) -> u32 {
        let entry = self.upgrades.entry(id.to_string()).or_insert(0);
        *entry += 1;
        let level = *entry;
        if level == 1 {
            let _ = self.automation_enabled.entry(id.to_string()).or_insert(true);
        }
        self.stats.upgrades_purchased += 1;
        info!(upgrade = id, level, "upgrade purchased");
        self.publish(GameEvent::UpgradeChanged {
            id: id.to_string(),
            level,
        });
        level
    }

    /// Whether an automation is switched on. The master switch defaults to
    /// on; every other id must be owned.
    #[must_use]
    pub fn is_automation_enabled(&self, id: &str) -> bool {
        let flag = self.automation_enabled.get(id).copied().unwrap_or(true);
        if id == AUTO_PAINTERS_SWITCH {
            flag
        } else {
            self.upgrade_level(id) > 0 && flag
        }
    }

    /// Flips an automation flag.
    pub fn set_automation_enabled(&mut self, id: &str, enabled: bool) -> Result<(), StateError> {
        if id != AUTO_PAINTERS_SWITCH && self.upgrade_level(id) == 0 {
            return Err(StateError::AutomationNotOwned(id.to_string()));
        }
        let previous = self.automation_enabled.insert(id.to_string(), enabled);
        if previous != Some(enabled) {
            debug!(automation = id, enabled, "automation toggled");
            self.publish(GameEvent::AutomationToggled {
                id: id.to_string(),
                enabled,
            });
        }
        Ok(())
    }

    /// Installs a contract and clears the grid.
    pub fn start_contract(&mut self, contract: Contract) -> Result<(), StateError> {
        if self.active_contract.is_some() {
            return Err(StateError::ContractActive);
        }
        let _ = self.clear_grid();
        info!(
            id = contract.id.get(),
            rank = contract.rank_level,
            cells = contract.cell_count,
            reward = contract.reward,
            "contract started"
        );
        self.active_contract = Some(contract.clone());
        self.publish(GameEvent::ContractStarted {
            contract: Box::new(contract),
        });
        Ok(())
    }

    /// Drops the active contract without reward and clears the grid.
    pub fn abandon_contract(&mut self) -> Result<Contract, StateError> {
        let contract = self
            .active_contract
            .take()
            .ok_or(StateError::NoActiveContract)?;
        let _ = self.clear_grid();
        self.stats.contracts_abandoned += 1;
        info!(id = contract.id.get(), "contract abandoned");
        self.publish(GameEvent::ContractCleared {
            contract: Box::new(contract.clone()),
        });
        Ok(contract)
    }

    /// Progress toward the active contract.
    #[must_use]
    pub fn progress(&self) -> Option<Progress> {
        self.active_contract
            .as_ref()
            .map(|contract| contract.progress(&self.grid))
    }

    /// Completes the active contract if the grid matches it exactly.
    pub fn check_contract_completion(&mut self) -> bool {
        let satisfied = self
            .active_contract
            .as_ref()
            .is_some_and(|contract| contract.is_satisfied_by(&self.grid));
        if !satisfied {
            return false;
        }
        let Some(contract) = self.active_contract.take() else {
            return false;
        };
        if let Err(err) = self.add_money(contract.reward) {
            warn!(%err, id = contract.id.get(), "contract reward not paid");
        }
        self.completed_contracts = self.completed_contracts.saturating_add(1);
        self.stats.contracts_completed += 1;
        let _ = self.clear_grid();
        info!(
            id = contract.id.get(),
            reward = contract.reward,
            completed = self.completed_contracts,
            "contract completed"
        );
        self.publish(GameEvent::ContractCompleted {
            contract: Box::new(contract),
        });
        true
    }

    /// Captures the persisted fields.
    #[must_use]
    pub fn to_document(&self) -> SaveDocument {
        SaveDocument {
            version: SAVE_VERSION,
            grid: self.grid.to_data(),
            grid_level: self.grid_level,
            money: self.money,
            unlocked_colors: self.unlocked_colors.iter().cloned().collect(),
            selected_color: self.selected_color.clone(),
            upgrades: self.upgrades.clone(),
            automation_enabled: self.automation_enabled.clone(),
            active_contract: self.active_contract.clone(),
            completed_contracts: self.completed_contracts,
            stats: self.stats.clone(),
            saved_at: Some(chrono::Utc::now()),
        }
    }

    /// Replaces every persisted field from `doc`. Nothing changes unless the
    /// whole document validates. Subscribers are kept.
    pub fn load_document(&mut self, doc: SaveDocument) -> Result<(), StateError> {
        if let Err(err) = doc.check_version() {
            warn!(version = doc.version, "rejected save");
            return Err(err);
        }
        let Some(tier) = grid_tier(doc.grid_level) else {
            return Err(StateError::InvalidSave(format!(
                "unknown grid level {}",
                doc.grid_level
            )));
        };
        let grid = Grid::from_data(&doc.grid)?;
        if grid.width().min(grid.height()) < tier.size {
            return Err(StateError::InvalidSave(format!(
                "{}x{} grid is smaller than level {} ({}x{})",
                grid.width(),
                grid.height(),
                doc.grid_level,
                tier.size,
                tier.size
            )));
        }

        let mut unlocked: BTreeSet<ColorId> = doc
            .unlocked_colors
            .into_iter()
            .filter(|c| color_def(c.as_str()).is_some())
            .collect();
        unlocked.extend(STARTING_COLORS.iter().map(|id| ColorId::from(*id)));
        let selected = if unlocked.contains(&doc.selected_color) {
            doc.selected_color
        } else {
            ColorId::from(DEFAULT_COLOR)
        };
        if let Some(contract) = &doc.active_contract {
            contract.id.observe();
        }

        let (width, height) = (grid.width(), grid.height());
        self.grid = grid;
        self.grid_level = doc.grid_level;
        self.money = doc.money;
        self.unlocked_colors = unlocked;
        self.selected_color = selected;
        self.upgrades = doc.upgrades;
        self.automation_enabled = doc.automation_enabled;
        self.active_contract = doc.active_contract;
        self.completed_contracts = doc.completed_contracts;
        self.stats = doc.stats;
        info!(version = doc.version, money = self.money, "save loaded");

        self.publish(GameEvent::Grid(GridEvent::Loaded { width, height }));
        self.publish(GameEvent::StateLoaded);
        Ok(())
    }

    fn after_grid_change(&mut self, out: Vec<GridEvent>) {
        let mut mutated = false;
        for event in &out {
            match event {
                GridEvent::CellChanged(edit) => {
                    mutated = true;
                    if edit.new.is_some() {
                        self.stats.cells_painted += 1;
                    }
                }
                GridEvent::CellsChanged(edits) => {
                    mutated = true;
                    self.stats.cells_painted +=
                        edits.iter().filter(|e| e.new.is_some()).count() as u64;
                }
                _ => {}
            }
        }
        self.dispatch_grid(out);
        if mutated {
            let _ = self.check_contract_completion();
        }
    }

    fn dispatch_grid(&mut self, out: Vec<GridEvent>) {
        for event in out {
            self.publish(GameEvent::Grid(event));
        }
    }

    fn publish(&mut self, event: GameEvent) {
        self.events.publish(&event);
    }
}
