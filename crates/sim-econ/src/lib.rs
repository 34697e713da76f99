#![deny(warnings)]

//! Shop rules: pricing and purchases for Grid Painter.
//!
//! This crate provides validated utilities for:
//! - Geometric upgrade pricing and the money boost multiplier
//! - Grid expansion, color and upgrade purchases against a [`GameState`]
//! - Listing upgrade offers with their next price and affordability
//!
//! Nothing here owns state. Every purchase checks its preconditions first and
//! only then spends money and applies the effect through `GameState`.

use serde::Serialize;
use sim_core::catalog::{
    auto_painter_id, color_def, next_grid_tier, resolve_upgrade, UpgradeKind, UpgradeSpec,
    MONEY_BOOST, UPGRADES,
};
use sim_core::{GameState, StateError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Reasons a purchase is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShopError {
    /// The grid is already at the largest tier.
    #[error("grid is already at the maximum size")]
    MaxTierReached,
    /// Balance too low for the price.
    #[error("not enough money: costs {cost}, have {available}")]
    InsufficientFunds {
        /// Price of the item.
        cost: u64,
        /// Current balance.
        available: u64,
    },
    /// Color id not in the catalog.
    #[error("unknown color: {0}")]
    UnknownColor(String),
    /// Color is already in the palette.
    #[error("color {0} is already unlocked")]
    AlreadyOwned(String),
    /// Upgrade id matches no catalog entry or auto-painter.
    #[error("unknown upgrade: {0}")]
    UnknownUpgrade(String),
    /// Upgrade is at its level cap.
    #[error("{id} is at max level {max_level}")]
    MaxLevel {
        /// Upgrade id.
        id: String,
        /// Level cap.
        max_level: u32,
    },
    /// Prerequisite upgrade not owned.
    #[error("{id} requires {prerequisite}")]
    MissingPrerequisite {
        /// Upgrade id.
        id: String,
        /// Required upgrade id.
        prerequisite: String,
    },
    /// Auto-painter for a color the player does not have.
    #[error("color {0} must be unlocked first")]
    ColorLocked(String),
    /// The state rejected the mutation.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Price of raising an upgrade from `level` to `level + 1`:
/// `floor(base × multiplier^level)`, saturating at `u64::MAX`.
#[must_use]
pub fn upgrade_cost(base: u64, multiplier: f64, level: u32) -> u64 {
    let exponent = i32::try_from(level).unwrap_or(i32::MAX);
    let raw = (base as f64 * multiplier.powi(exponent)).floor();
    if !raw.is_finite() || raw >= u64::MAX as f64 {
        u64::MAX
    } else if raw <= 0.0 {
        0
    } else {
        raw as u64
    }
}

/// Reward multiplier granted by `level` money boosts: `1 + 0.1 × level`.
#[must_use]
pub fn money_boost_multiplier(level: u32) -> f64 {
    1.0 + 0.1 * f64::from(level)
}

/// Money boost multiplier for the player's current boost level.
#[must_use]
pub fn reward_multiplier(state: &GameState) -> f64 {
    money_boost_multiplier(state.upgrade_level(MONEY_BOOST))
}

/// Price of the next grid tier, or `None` at the top of the table.
#[must_use]
pub fn grid_expansion_cost(state: &GameState) -> Option<u64> {
    next_grid_tier(state.grid_level()).map(|tier| tier.cost)
}

/// Buys the next grid tier. Returns the new side length.
pub fn buy_grid_expansion(state: &mut GameState) -> Result<u32, ShopError> {
    let tier = next_grid_tier(state.grid_level()).ok_or(ShopError::MaxTierReached)?;
    ensure_funds(state, tier.cost)?;
    if tier.cost > 0 {
        let _ = state.spend_money(tier.cost)?;
    }
    if let Err(err) = state.advance_grid_level(tier.level) {
        warn!(%err, level = tier.level, "grid expansion paid but not applied");
        return Err(err.into());
    }
    info!(level = tier.level, size = tier.size, cost = tier.cost, "bought grid expansion");
    Ok(tier.size)
}

/// Catalog price of a color.
#[must_use]
pub fn color_cost(id: &str) -> Option<u64> {
    color_def(id).map(|c| c.cost)
}

/// Unlocks a color for its catalog price.
pub fn buy_color(state: &mut GameState, id: &str) -> Result<(), ShopError> {
    let cost = color_cost(id).ok_or_else(|| ShopError::UnknownColor(id.to_string()))?;
    if state.is_color_unlocked(id) {
        return Err(ShopError::AlreadyOwned(id.to_string()));
    }
    ensure_funds(state, cost)?;
    if cost > 0 {
        let _ = state.spend_money(cost)?;
    }
    let _ = state.unlock_color(id);
    info!(color = id, cost, "bought color");
    Ok(())
}

/// Price of the next level of `id` at its current owned level.
pub fn upgrade_price(state: &GameState, id: &str) -> Result<u64, ShopError> {
    let spec = resolve_upgrade(id).ok_or_else(|| ShopError::UnknownUpgrade(id.to_string()))?;
    Ok(upgrade_cost(
        spec.base_cost,
        spec.cost_multiplier,
        state.upgrade_level(id),
    ))
}

/// Buys one level of an upgrade. Returns the new level.
pub fn buy_upgrade(state: &mut GameState, id: &str) -> Result<u32, ShopError> {
    let spec = resolve_upgrade(id).ok_or_else(|| ShopError::UnknownUpgrade(id.to_string()))?;
    let level = state.upgrade_level(id);
    check_purchasable(state, &spec, level)?;
    let cost = upgrade_cost(spec.base_cost, spec.cost_multiplier, level);
    ensure_funds(state, cost)?;
    if cost > 0 {
        let _ = state.spend_money(cost)?;
    }
    let level = state.purchase_upgrade(id);
    info!(upgrade = id, level, cost, "bought upgrade");
    Ok(level)
}

/// One row of the upgrade shop.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpgradeOffer {
    /// Upgrade id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Effect family.
    pub kind: UpgradeKind,
    /// Owned level.
    pub level: u32,
    /// Level cap.
    pub max_level: u32,
    /// Price of the next level; `None` once capped.
    pub next_cost: Option<u64>,
    /// Prerequisite met and not capped.
    pub available: bool,
    /// Available and the balance covers `next_cost`.
    pub affordable: bool,
}

/// Every upgrade the player could see in the shop: the static catalog plus
/// one auto-painter per unlocked color.
#[must_use]
pub fn upgrade_offers(state: &GameState) -> Vec<UpgradeOffer> {
    let painters = state
        .unlocked_colors()
        .iter()
        .map(|color| auto_painter_id(color.as_str()));
    UPGRADES
        .iter()
        .map(|def| def.id.to_string())
        .chain(painters)
        .filter_map(|id| resolve_upgrade(&id))
        .map(|spec| {
            let level = state.upgrade_level(&spec.id);
            let available = check_purchasable(state, &spec, level).is_ok();
            let next_cost = (level < spec.max_level)
                .then(|| upgrade_cost(spec.base_cost, spec.cost_multiplier, level));
            let affordable = available && next_cost.is_some_and(|c| c <= state.money());
            UpgradeOffer {
                id: spec.id,
                name: spec.name,
                kind: spec.kind,
                level,
                max_level: spec.max_level,
                next_cost,
                available,
                affordable,
            }
        })
        .collect()
}

fn check_purchasable(state: &GameState, spec: &UpgradeSpec, level: u32) -> Result<(), ShopError> {
    if level >= spec.max_level {
        return Err(ShopError::MaxLevel {
            id: spec.id.clone(),
            max_level: spec.max_level,
        });
    }
    if let Some(prerequisite) = &spec.prerequisite {
        if state.upgrade_level(prerequisite) == 0 {
            return Err(ShopError::MissingPrerequisite {
                id: spec.id.clone(),
                prerequisite: prerequisite.clone(),
            });
        }
    }
    if let Some(color) = &spec.color {
        if !state.is_color_unlocked(color) {
            return Err(ShopError::ColorLocked(color.clone()));
        }
    }
    Ok(())
}

fn ensure_funds(state: &GameState, cost: u64) -> Result<(), ShopError> {
    if state.money() < cost {
        debug!(cost, money = state.money(), "purchase refused");
        return Err(ShopError::InsufficientFunds {
            cost,
            available: state.money(),
        });
    }
    Ok(())
}
