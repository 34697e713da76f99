//! Static reference data: colors, ranks, upgrades, grid tiers and curated
//! patterns. Everything here is immutable and queried through plain lookups.

mod colors;
mod patterns;
mod ranks;
mod tiers;
mod upgrades;

pub use colors::{color_def, default_unlocked, ColorDef, ColorId, COLORS, DEFAULT_COLOR, STARTING_COLORS};
pub use patterns::{legend, patterns_in_tier, CuratedPattern, SizeTier, PATTERNS};
pub use ranks::{rank_def, Complexity, RankDef, RANKS};
pub use tiers::{grid_tier, next_grid_tier, GridTier, GRID_TIERS};
pub use upgrades::{
    auto_painter_color, auto_painter_id, resolve_upgrade, upgrade_def, UpgradeDef, UpgradeKind,
    UpgradeSpec, AUTO_PAINTERS_SWITCH, AUTO_PAINTER_BASE_COST, AUTO_PAINTER_COST_MULTIPLIER,
    AUTO_PAINTER_MAX_LEVEL, AUTO_PAINTER_PREFIX, MONEY_BOOST, SPEED_BOOST, UPGRADES,
};
