//! Paint colors available in the shop.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a paint color, e.g. "black" or "red".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorId(pub String);

impl ColorId {
    /// Wraps a color identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrowed identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Borrow<str> for ColorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static color entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorDef {
    /// Stable identifier used in saves and patterns.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Visual key for renderers.
    pub hex: &'static str,
    /// Shop price; zero for starting colors.
    pub cost: u64,
    /// Whether a new game starts with the color unlocked.
    pub unlocked_by_default: bool,
}

/// Color used when a contract has no usable palette.
pub const DEFAULT_COLOR: &str = "black";

/// Colors every game owns and can never lose.
pub const STARTING_COLORS: [&str; 2] = ["black", "white"];

const fn color(id: &'static str, name: &'static str, hex: &'static str, cost: u64) -> ColorDef {
    ColorDef {
        id,
        name,
        hex,
        cost,
        unlocked_by_default: cost == 0,
    }
}

/// Color catalog in shop order.
pub const COLORS: &[ColorDef] = &[
    color("black", "Black", "#000000", 0),
    color("white", "White", "#FFFFFF", 0),
    color("red", "Red", "#E53935", 50),
    color("blue", "Blue", "#1E88E5", 120),
    color("green", "Green", "#43A047", 300),
    color("yellow", "Yellow", "#FDD835", 650),
    color("orange", "Orange", "#FB8C00", 1_400),
    color("purple", "Purple", "#8E24AA", 3_000),
    color("pink", "Pink", "#F06292", 6_500),
    color("cyan", "Cyan", "#00ACC1", 12_000),
    color("brown", "Brown", "#6D4C41", 25_000),
];

/// Looks up a color by id.
#[must_use]
pub fn color_def(id: &str) -> Option<&'static ColorDef> {
    COLORS.iter().find(|c| c.id == id)
}

/// Ids of the colors unlocked in a fresh game.
pub fn default_unlocked() -> impl Iterator<Item = &'static str> {
    COLORS
        .iter()
        .filter(|c| c.unlocked_by_default)
        .map(|c| c.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn starting_colors_are_free_defaults() {
        let defaults: BTreeSet<&str> = default_unlocked().collect();
        for id in STARTING_COLORS {
            assert!(defaults.contains(id));
            assert_eq!(color_def(id).map(|c| c.cost), Some(0));
        }
        assert_eq!(color_def("red").map(|c| c.cost), Some(50));
        assert!(color_def("mauve").is_none());
    }

    #[test]
    fn color_ids_are_unique() {
        let ids: BTreeSet<&str> = COLORS.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), COLORS.len());
    }

    #[test]
    fn color_id_borrows_as_str() {
        let set: BTreeSet<ColorId> = [ColorId::from("red")].into_iter().collect();
        assert!(set.contains("red"));
        assert_eq!(serde_json::to_string(&ColorId::from("red")).unwrap(), "\"red\"");
    }
}
