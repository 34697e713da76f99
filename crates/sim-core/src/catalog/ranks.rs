//! Progression ranks gating contract complexity.

use serde::{Deserialize, Serialize};

/// Pattern complexity tier assigned to a rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Complexity {
    /// A handful of cells.
    Trivial,
    /// Small compact shapes.
    Simple,
    /// Letters and crosses.
    Moderate,
    /// Outlines and sparse fills.
    Complex,
    /// Frames, spirals and checkers.
    Intricate,
    /// Large multi-part compositions.
    Masterwork,
}

impl Complexity {
    /// Inclusive range of target filled cells.
    #[must_use]
    pub const fn cell_range(self) -> (u32, u32) {
        match self {
            Self::Trivial => (1, 3),
            Self::Simple => (3, 6),
            Self::Moderate => (5, 10),
            Self::Complex => (8, 16),
            Self::Intricate => (12, 24),
            Self::Masterwork => (20, 40),
        }
    }

    /// Base reward before rank, upgrade and size multipliers.
    #[must_use]
    pub const fn base_reward(self) -> u64 {
        match self {
            Self::Trivial => 10,
            Self::Simple => 20,
            Self::Moderate => 40,
            Self::Complex => 80,
            Self::Intricate => 150,
            Self::Masterwork => 300,
        }
    }
}

/// Static rank entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankDef {
    /// 1-based level; ranks are listed in ascending order.
    pub level: u32,
    /// Display name.
    pub name: &'static str,
    /// Completed contracts needed to reach the rank.
    pub contracts_required: u32,
    /// Minimum of grid width and height needed.
    pub min_grid_size: u32,
    /// Colors that must all be unlocked; also the contract palette.
    pub required_colors: &'static [&'static str],
    /// Pattern tier.
    pub complexity: Complexity,
    /// Reward multiplier.
    pub reward_multiplier: f64,
    /// Whether one pattern may mix several palette colors.
    pub multi_color: bool,
    /// Whether hand-authored imagery may be drawn.
    pub curated: bool,
}

/// Rank catalog ordered by level.
pub const RANKS: &[RankDef] = &[
    RankDef {
        level: 1,
        name: "Novice",
        contracts_required: 0,
        min_grid_size: 4,
        required_colors: &["black"],
        complexity: Complexity::Trivial,
        reward_multiplier: 1.0,
        multi_color: false,
        curated: false,
    },
    RankDef {
        level: 2,
        name: "Apprentice",
        contracts_required: 3,
        min_grid_size: 5,
        required_colors: &["black", "red"],
        complexity: Complexity::Simple,
        reward_multiplier: 1.25,
        multi_color: false,
        curated: false,
    },
    RankDef {
        level: 3,
        name: "Journeyman",
        contracts_required: 8,
        min_grid_size: 6,
        required_colors: &["black", "red", "blue"],
        complexity: Complexity::Simple,
        reward_multiplier: 1.5,
        multi_color: true,
        curated: false,
    },
    RankDef {
        level: 4,
        name: "Artisan",
        contracts_required: 15,
        min_grid_size: 8,
        required_colors: &["black", "white", "red", "blue", "green"],
        complexity: Complexity::Moderate,
        reward_multiplier: 2.0,
        multi_color: true,
        curated: true,
    },
    RankDef {
        level: 5,
        name: "Expert",
        contracts_required: 25,
        min_grid_size: 10,
        required_colors: &["black", "white", "red", "blue", "green", "yellow"],
        complexity: Complexity::Complex,
        reward_multiplier: 2.6,
        multi_color: true,
        curated: true,
    },
    RankDef {
        level: 6,
        name: "Master",
        contracts_required: 40,
        min_grid_size: 12,
        required_colors: &[
            "black", "white", "red", "blue", "green", "yellow", "orange", "purple",
        ],
        complexity: Complexity::Complex,
        reward_multiplier: 3.3,
        multi_color: true,
        curated: true,
    },
    RankDef {
        level: 7,
        name: "Grandmaster",
        contracts_required: 60,
        min_grid_size: 16,
        required_colors: &[
            "black", "white", "red", "blue", "green", "yellow", "orange", "purple", "pink",
            "cyan",
        ],
        complexity: Complexity::Intricate,
        reward_multiplier: 4.2,
        multi_color: true,
        curated: true,
    },
    RankDef {
        level: 8,
        name: "Legend",
        contracts_required: 90,
        min_grid_size: 20,
        required_colors: &[
            "black", "white", "red", "blue", "green", "yellow", "orange", "purple", "pink",
            "cyan", "brown",
        ],
        complexity: Complexity::Masterwork,
        reward_multiplier: 5.5,
        multi_color: true,
        curated: true,
    },
];

/// Looks up a rank by level.
#[must_use]
pub fn rank_def(level: u32) -> Option<&'static RankDef> {
    RANKS.iter().find(|r| r.level == level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::color_def;

    #[test]
    fn ranks_are_ordered_and_gates_grow() {
        for pair in RANKS.windows(2) {
            assert_eq!(pair[1].level, pair[0].level + 1);
            assert!(pair[1].contracts_required >= pair[0].contracts_required);
            assert!(pair[1].min_grid_size >= pair[0].min_grid_size);
        }
        assert_eq!(RANKS[0].level, 1);
    }

    #[test]
    fn required_colors_exist_in_catalog() {
        for rank in RANKS {
            for id in rank.required_colors {
                assert!(color_def(id).is_some(), "rank {} uses unknown color {id}", rank.level);
            }
        }
    }

    #[test]
    fn cell_ranges_are_well_formed() {
        for rank in RANKS {
            let (min, max) = rank.complexity.cell_range();
            assert!(min >= 1 && min <= max);
        }
    }
}
