//! Upgrade catalog, including the per-color auto-painters derived from the
//! color catalog.

use serde::{Deserialize, Serialize};

use super::colors::color_def;

/// Effect family of an upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Scales contract rewards.
    MoneyBoost,
    /// Shortens every auto-painter interval.
    SpeedBoost,
    /// Paints one color automatically.
    AutoPainter,
}

/// Static upgrade entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpgradeDef {
    /// Stable identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// One-line description for shop listings.
    pub description: &'static str,
    /// Effect family.
    pub kind: UpgradeKind,
    /// Price of the first level.
    pub base_cost: u64,
    /// Geometric price growth per owned level.
    pub cost_multiplier: f64,
    /// Highest purchasable level.
    pub max_level: u32,
    /// Upgrade that must be owned first.
    pub prerequisite: Option<&'static str>,
}

/// Master switch for every auto-painter. Not purchasable.
pub const AUTO_PAINTERS_SWITCH: &str = "auto_painters";

/// Prefix of per-color auto-painter ids.
pub const AUTO_PAINTER_PREFIX: &str = "auto_painter_";

/// Shared price of an auto-painter's first level.
pub const AUTO_PAINTER_BASE_COST: u64 = 250;

/// Shared price growth of auto-painters.
pub const AUTO_PAINTER_COST_MULTIPLIER: f64 = 1.5;

/// Shared level cap of auto-painters.
pub const AUTO_PAINTER_MAX_LEVEL: u32 = 10;

/// Id of the reward multiplier upgrade.
pub const MONEY_BOOST: &str = "money_boost";

/// Id of the global auto-painter speed upgrade.
pub const SPEED_BOOST: &str = "speed_boost";

/// Static upgrades. Auto-painters are not listed here; see [`resolve_upgrade`].
pub const UPGRADES: &[UpgradeDef] = &[
    UpgradeDef {
        id: MONEY_BOOST,
        name: "Money Boost",
        description: "+10% contract reward per level",
        kind: UpgradeKind::MoneyBoost,
        base_cost: 200,
        cost_multiplier: 1.6,
        max_level: 10,
        prerequisite: None,
    },
    UpgradeDef {
        id: SPEED_BOOST,
        name: "Speed Boost",
        description: "Auto-painters work 10% faster per level",
        kind: UpgradeKind::SpeedBoost,
        base_cost: 400,
        cost_multiplier: 1.75,
        max_level: 9,
        prerequisite: Some("auto_painter_black"),
    },
];

/// Upgrade terms after resolving static and derived entries.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeSpec {
    /// Upgrade id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Effect family.
    pub kind: UpgradeKind,
    /// Price of the first level.
    pub base_cost: u64,
    /// Geometric price growth.
    pub cost_multiplier: f64,
    /// Level cap.
    pub max_level: u32,
    /// Required upgrade id.
    pub prerequisite: Option<String>,
    /// Color an auto-painter paints, which must be unlocked before purchase.
    pub color: Option<String>,
}

/// Auto-painter id for a color.
#[must_use]
pub fn auto_painter_id(color: &str) -> String {
    format!("{AUTO_PAINTER_PREFIX}{color}")
}

/// Color painted by an auto-painter id, if the id names one.
#[must_use]
pub fn auto_painter_color(id: &str) -> Option<&str> {
    id.strip_prefix(AUTO_PAINTER_PREFIX)
        .filter(|color| color_def(color).is_some())
}

/// Looks up a static upgrade.
#[must_use]
pub fn upgrade_def(id: &str) -> Option<&'static UpgradeDef> {
    UPGRADES.iter().find(|u| u.id == id)
}

/// Resolves any purchasable upgrade id into its terms.
#[must_use]
pub fn resolve_upgrade(id: &str) -> Option<UpgradeSpec> {
    if let Some(def) = upgrade_def(id) {
        return Some(UpgradeSpec {
            id: def.id.to_string(),
            name: def.name.to_string(),
            kind: def.kind,
            base_cost: def.base_cost,
            cost_multiplier: def.cost_multiplier,
            max_level: def.max_level,
            prerequisite: def.prerequisite.map(str::to_string),
            color: None,
        });
    }
    let color = auto_painter_color(id)?;
    let name = color_def(color).map_or(color, |c| c.name);
    Some(UpgradeSpec {
        id: id.to_string(),
        name: format!("{name} Auto-Painter"),
        kind: UpgradeKind::AutoPainter,
        base_cost: AUTO_PAINTER_BASE_COST,
        cost_multiplier: AUTO_PAINTER_COST_MULTIPLIER,
        max_level: AUTO_PAINTER_MAX_LEVEL,
        prerequisite: None,
        color: Some(color.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_painter_ids_round_trip() {
        let id = auto_painter_id("red");
        assert_eq!(id, "auto_painter_red");
        assert_eq!(auto_painter_color(&id), Some("red"));
        assert_eq!(auto_painter_color("auto_painter_mauve"), None);
        assert_eq!(auto_painter_color(MONEY_BOOST), None);
    }

    #[test]
    fn resolves_static_and_derived_upgrades() {
        let boost = resolve_upgrade(SPEED_BOOST).unwrap();
        assert_eq!(boost.kind, UpgradeKind::SpeedBoost);
        assert_eq!(boost.prerequisite.as_deref(), Some("auto_painter_black"));

        let painter = resolve_upgrade("auto_painter_blue").unwrap();
        assert_eq!(painter.kind, UpgradeKind::AutoPainter);
        assert_eq!(painter.base_cost, AUTO_PAINTER_BASE_COST);
        assert_eq!(painter.color.as_deref(), Some("blue"));
        assert_eq!(painter.name, "Blue Auto-Painter");

        assert!(resolve_upgrade(AUTO_PAINTERS_SWITCH).is_none());
        assert!(resolve_upgrade("warp_drive").is_none());
    }

    #[test]
    fn prerequisites_resolve() {
        for def in UPGRADES {
            if let Some(req) = def.prerequisite {
                assert!(resolve_upgrade(req).is_some(), "{} requires unknown {req}", def.id);
            }
        }
    }
}
