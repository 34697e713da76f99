#![deny(warnings)]

//! Contract generation and lifecycle.
//!
//! Ranks gate which contracts a player may take. A contract's pattern is
//! either a curated image fitted to the grid or a procedural shape drawn from
//! the rank's complexity tier. All randomness comes from a seedable
//! `ChaCha8Rng`, so a given seed and state always produce the same contracts.

pub mod curated;
pub mod shapes;

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sim_core::catalog::{rank_def, RankDef, DEFAULT_COLOR, RANKS};
use sim_core::{ColorId, Contract, GameState, Pattern, Progress, StateError};
use thiserror::Error;
use tracing::{debug, info};

pub use shapes::{Brush, Canvas, ShapeKind};

/// Tunables for contract generation.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractConfig {
    /// Probability that a curated rank draws hand-authored imagery.
    pub curated_chance: f64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            curated_chance: 0.3,
        }
    }
}

/// Contract lifecycle failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContractError {
    /// Requested rank is locked or does not exist.
    #[error("rank {0} is not accessible")]
    RankInaccessible(u32),
    /// The state refused the change.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Whether a rank's own gates pass, ignoring lower ranks.
fn gates_pass(rank: &RankDef, state: &GameState) -> bool {
    let grid = state.grid();
    state.completed_contracts() >= rank.contracts_required
        && grid.width().min(grid.height()) >= rank.min_grid_size
        && rank
            .required_colors
            .iter()
            .all(|id| state.is_color_unlocked(id))
}

/// Highest rank reached by walking the ladder from the bottom. Ranks are
/// gated sequentially, so the walk stops at the first locked rank. Never
/// below 1.
#[must_use]
pub fn highest_accessible_rank(state: &GameState) -> u32 {
    RANKS
        .iter()
        .take_while(|rank| gates_pass(rank, state))
        .last()
        .map_or(1, |rank| rank.level)
}

/// Whether `level` is at or below the highest accessible rank.
#[must_use]
pub fn is_rank_accessible(state: &GameState, level: u32) -> bool {
    rank_def(level).is_some() && level <= highest_accessible_rank(state)
}

/// `floor(base × rank multiplier × boost × cells / 4)`, at least 1.
#[must_use]
pub fn contract_reward(rank: &RankDef, boost: f64, cell_count: u32) -> u64 {
    let raw = rank.complexity.base_reward() as f64
        * rank.reward_multiplier
        * boost
        * (f64::from(cell_count) / 4.0);
    let reward = raw.floor();
    if reward.is_finite() && reward >= 1.0 {
        reward.min(u64::MAX as f64) as u64
    } else {
        1
    }
}

/// Generates and tracks contracts.
#[derive(Debug)]
pub struct ContractSystem {
    rng: ChaCha8Rng,
    config: ContractConfig,
}

impl ContractSystem {
    /// System with the default configuration.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, ContractConfig::default())
    }

    /// System with explicit tunables.
    #[must_use]
    pub fn with_config(seed: u64, config: ContractConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    /// Active tunables.
    #[must_use]
    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Builds a contract sized to the current grid. `None` when the rank is
    /// locked. Defaults to the highest accessible rank.
    pub fn generate_contract(&mut self, state: &GameState, rank: Option<u32>) -> Option<Contract> {
        let level = rank.unwrap_or_else(|| highest_accessible_rank(state));
        if !is_rank_accessible(state, level) {
            debug!(level, "rank not accessible");
            return None;
        }
        let rank = rank_def(level)?;
        let (width, height) = (state.grid().width(), state.grid().height());

        let mut palette: Vec<ColorId> = rank
            .required_colors
            .iter()
            .filter(|id| state.is_color_unlocked(id))
            .map(|id| ColorId::from(*id))
            .collect();
        if palette.is_empty() {
            palette.push(ColorId::from(DEFAULT_COLOR));
        }

        let mut pattern = None;
        if rank.curated && self.rng.gen_bool(self.config.curated_chance.clamp(0.0, 1.0)) {
            let allowed: BTreeSet<ColorId> = palette.iter().cloned().collect();
            pattern = self.curated_pattern(width, height, &allowed);
        }
        let pattern = match pattern {
            Some(pattern) => pattern,
            None => self.procedural_pattern(rank, width, height, palette),
        };

        let reward = contract_reward(
            rank,
            sim_econ::reward_multiplier(state),
            pattern.cell_count(),
        );
        Some(Contract::new(level, pattern, reward))
    }

    /// Generates a contract and installs it as the active one.
    pub fn accept_contract(
        &mut self,
        state: &mut GameState,
        rank: Option<u32>,
    ) -> Result<Contract, ContractError> {
        if state.active_contract().is_some() {
            return Err(StateError::ContractActive.into());
        }
        let requested = rank.unwrap_or_else(|| highest_accessible_rank(state));
        let contract = self
            .generate_contract(state, Some(requested))
            .ok_or(ContractError::RankInaccessible(requested))?;
        state.start_contract(contract.clone())?;
        info!(
            id = contract.id.get(),
            rank = contract.rank_level,
            reward = contract.reward,
            "contract accepted"
        );
        Ok(contract)
    }

    /// Drops the active contract without reward.
    pub fn abandon_contract(&mut self, state: &mut GameState) -> Result<Contract, ContractError> {
        Ok(state.abandon_contract()?)
    }

    /// Progress toward the active contract.
    #[must_use]
    pub fn progress(&self, state: &GameState) -> Option<Progress> {
        state.progress()
    }

    fn curated_pattern(
        &mut self,
        width: u32,
        height: u32,
        available: &BTreeSet<ColorId>,
    ) -> Option<Pattern> {
        let chosen = curated::pick(width, height, available, &mut self.rng)?;
        debug!(name = chosen.name, "curated pattern");
        Some(curated::center_fit(chosen, width, height))
    }

    fn procedural_pattern(
        &mut self,
        rank: &RankDef,
        width: u32,
        height: u32,
        palette: Vec<ColorId>,
    ) -> Pattern {
        let (min, max) = rank.complexity.cell_range();
        let target = self.rng.gen_range(min..=max);
        let kind = ShapeKind::for_complexity(rank.complexity)
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(ShapeKind::Scattered);
        let brush = if rank.multi_color && palette.len() > 1 {
            Brush::Palette(palette)
        } else {
            let color = palette
                .choose(&mut self.rng)
                .cloned()
                .unwrap_or_else(|| ColorId::from(DEFAULT_COLOR));
            Brush::Solid(color)
        };

        let mut canvas = Canvas::new(width, height, target, brush, &mut self.rng);
        kind.draw(&mut canvas);
        if canvas.placed() == 0 {
            let _ = canvas.plot_anywhere();
        }
        debug!(?kind, target, placed = canvas.placed(), "procedural pattern");
        canvas.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::catalog::Complexity;

    #[test]
    fn fresh_state_is_rank_one() {
        let state = GameState::new();
        assert_eq!(highest_accessible_rank(&state), 1);
        assert!(is_rank_accessible(&state, 1));
        assert!(!is_rank_accessible(&state, 2));
        assert!(!is_rank_accessible(&state, 0));
        assert!(!is_rank_accessible(&state, 99));
    }

    #[test]
    fn reward_formula() {
        let rank = rank_def(1).unwrap();
        assert_eq!(rank.complexity, Complexity::Trivial);
        // 10 × 1.0 × 1.0 × 3/4 = 7.5
        assert_eq!(contract_reward(rank, 1.0, 3), 7);
        assert_eq!(contract_reward(rank, 1.0, 0), 1);
        // 10 × 1.0 × 1.5 × 4/4 = 15
        assert_eq!(contract_reward(rank, 1.5, 4), 15);
        let top = rank_def(8).unwrap();
        // 300 × 5.5 × 1.0 × 40/4 = 16500
        assert_eq!(contract_reward(top, 1.0, 40), 16_500);
    }

    #[test]
    fn locked_rank_generates_nothing() {
        let mut system = ContractSystem::new(1);
        let state = GameState::new();
        assert!(system.generate_contract(&state, Some(3)).is_none());
        assert!(system.generate_contract(&state, None).is_some());
    }

    #[test]
    fn rank_one_patterns_are_black_and_small() {
        let mut system = ContractSystem::new(99);
        let state = GameState::new();
        for _ in 0..50 {
            let contract = system.generate_contract(&state, None).unwrap();
            assert_eq!(contract.rank_level, 1);
            assert_eq!((contract.pattern.width(), contract.pattern.height()), (4, 4));
            assert!((1..=3).contains(&contract.cell_count));
            assert_eq!(contract.cell_count, contract.pattern.cell_count());
            assert!(contract.reward >= 1);
            assert!(contract.pattern.filled().all(|(_, c)| c.as_str() == "black"));
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let state = GameState::new();
        let mut a = ContractSystem::new(5);
        let mut b = ContractSystem::new(5);
        for _ in 0..10 {
            let x = a.generate_contract(&state, None).unwrap();
            let y = b.generate_contract(&state, None).unwrap();
            assert_eq!(x.pattern, y.pattern);
            assert_eq!(x.reward, y.reward);
            assert_ne!(x.id, y.id);
        }
    }

    #[test]
    fn lifecycle_errors() {
        let mut system = ContractSystem::new(3);
        let mut state = GameState::new();
        assert_eq!(
            system.abandon_contract(&mut state),
            Err(ContractError::State(StateError::NoActiveContract))
        );
        assert_eq!(
            system.accept_contract(&mut state, Some(4)).map(|c| c.id),
            Err(ContractError::RankInaccessible(4))
        );
        let accepted = system.accept_contract(&mut state, None).unwrap();
        assert_eq!(state.active_contract().map(|c| c.id), Some(accepted.id));
        assert_eq!(
            system.accept_contract(&mut state, None).map(|c| c.id),
            Err(ContractError::State(StateError::ContractActive))
        );
        assert_eq!(system.progress(&state).map(|p| p.correct), Some(0));
        assert_eq!(system.abandon_contract(&mut state).map(|c| c.id), Ok(accepted.id));
        assert!(system.progress(&state).is_none());
    }
}
