//! Grid expansion tiers.

/// One step of the grid expansion table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridTier {
    /// Expansion level; tier 0 is the starting grid.
    pub level: u32,
    /// Square grid side length at this tier.
    pub size: u32,
    /// Price of reaching this tier from the previous one.
    pub cost: u64,
}

/// Expansion table, strictly increasing in level, size and cost.
pub const GRID_TIERS: &[GridTier] = &[
    GridTier { level: 0, size: 4, cost: 0 },
    GridTier { level: 1, size: 5, cost: 100 },
    GridTier { level: 2, size: 6, cost: 250 },
    GridTier { level: 3, size: 8, cost: 600 },
    GridTier { level: 4, size: 10, cost: 1_500 },
    GridTier { level: 5, size: 12, cost: 3_500 },
    GridTier { level: 6, size: 16, cost: 8_000 },
    GridTier { level: 7, size: 20, cost: 20_000 },
    GridTier { level: 8, size: 24, cost: 50_000 },
    GridTier { level: 9, size: 32, cost: 120_000 },
];

/// Tier at an expansion level.
#[must_use]
pub fn grid_tier(level: u32) -> Option<&'static GridTier> {
    GRID_TIERS.get(level as usize)
}

/// Tier following `level`, or `None` at the top of the table.
#[must_use]
pub fn next_grid_tier(level: u32) -> Option<&'static GridTier> {
    grid_tier(level.checked_add(1)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_strictly_increasing() {
        for (i, tier) in GRID_TIERS.iter().enumerate() {
            assert_eq!(tier.level as usize, i);
        }
        for pair in GRID_TIERS.windows(2) {
            assert!(pair[1].size > pair[0].size);
            assert!(pair[1].cost > pair[0].cost);
        }
    }

    #[test]
    fn next_tier_stops_at_top() {
        assert_eq!(next_grid_tier(0).map(|t| t.size), Some(5));
        let top = (GRID_TIERS.len() - 1) as u32;
        assert!(next_grid_tier(top).is_none());
        assert!(next_grid_tier(u32::MAX).is_none());
    }
}
