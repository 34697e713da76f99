//! Contracts: target patterns the player reproduces for a reward.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ColorId;
use crate::grid::{CellCoord, Grid};

static NEXT_CONTRACT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically assigned contract identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(u64);

impl ContractId {
    /// Allocates the next identifier.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CONTRACT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Ensures ids allocated later are greater than this one. Called for ids
    /// restored from saves.
    pub(crate) fn observe(self) {
        let _ = NEXT_CONTRACT_ID.fetch_max(self.0.saturating_add(1), Ordering::Relaxed);
    }
}

/// Target pattern: rows of color-or-empty cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern {
    rows: Vec<Vec<Option<ColorId>>>,
}

impl Pattern {
    /// All-empty pattern of the given size.
    #[must_use]
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            rows: vec![vec![None; width as usize]; height as usize],
        }
    }

    /// Builds a pattern from rows. Short rows are padded with empty cells.
    #[must_use]
    pub fn from_rows(mut rows: Vec<Vec<Option<ColorId>>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, None);
        }
        Self { rows }
    }

    /// Width in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.rows.first().map_or(0, Vec::len) as u32
    }

    /// Height in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Expected color at `(x, y)`. Coordinates outside the pattern expect
    /// an empty cell.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<&ColorId> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows.get(y as usize)?.get(x as usize)?.as_ref()
    }

    /// Writes a cell. Returns `false` when out of bounds.
    pub fn set(&mut self, x: i32, y: i32, color: Option<ColorId>) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        match self.rows.get_mut(y as usize).and_then(|r| r.get_mut(x as usize)) {
            Some(cell) => {
                *cell = color;
                true
            }
            None => false,
        }
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn cell_count(&self) -> u32 {
        self.rows.iter().flatten().filter(|c| c.is_some()).count() as u32
    }

    /// Non-empty cells in row-major order.
    pub fn filled(&self) -> impl Iterator<Item = (CellCoord, &ColorId)> {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().filter_map(move |(x, cell)| {
                cell.as_ref()
                    .map(|color| (CellCoord::new(x as i32, y as i32), color))
            })
        })
    }
}

/// How far the grid is from the active contract's pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Pattern cells painted with the expected color.
    pub correct: u32,
    /// Filled cells where the pattern expects nothing.
    pub wrong: u32,
    /// Non-empty cells in the pattern.
    pub total: u32,
    /// `round(100 * correct / total)`, 0 for an empty pattern.
    pub percent: u32,
}

/// An immutable job: reproduce `pattern` on the grid to earn `reward`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Identifier.
    pub id: ContractId,
    /// Rank the contract was generated for.
    pub rank_level: u32,
    /// Target pattern, sized to the grid at generation time.
    pub pattern: Pattern,
    /// Money paid on completion, at least 1.
    pub reward: u64,
    /// Non-empty cells in the pattern.
    pub cell_count: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Contract {
    /// Creates a contract with a fresh id.
    #[must_use]
    pub fn new(rank_level: u32, pattern: Pattern, reward: u64) -> Self {
        let cell_count = pattern.cell_count();
        Self {
            id: ContractId::next(),
            rank_level,
            pattern,
            reward: reward.max(1),
            cell_count,
            created_at: Utc::now(),
        }
    }

    /// True when every grid coordinate holds exactly the expected color.
    #[must_use]
    pub fn is_satisfied_by(&self, grid: &Grid) -> bool {
        for y in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                if grid.get_cell(x, y) != self.pattern.get(x, y) {
                    return false;
                }
            }
        }
        true
    }

    /// Progress of `grid` toward this contract.
    #[must_use]
    pub fn progress(&self, grid: &Grid) -> Progress {
        let correct = self
            .pattern
            .filled()
            .filter(|(c, color)| grid.get_cell(c.x, c.y) == Some(*color))
            .count() as u32;
        let wrong = grid
            .iter()
            .filter(|(c, _)| self.pattern.get(c.x, c.y).is_none())
            .count() as u32;
        let total = self.cell_count;
        let percent = if total == 0 {
            0
        } else {
            (100.0 * f64::from(correct) / f64::from(total)).round() as u32
        };
        Progress {
            correct,
            wrong,
            total,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Option<ColorId> {
        Some(ColorId::from("red"))
    }

    fn diagonal() -> Contract {
        let mut pattern = Pattern::empty(3, 3);
        for i in 0..3 {
            assert!(pattern.set(i, i, red()));
        }
        Contract::new(1, pattern, 10)
    }

    #[test]
    fn ids_increase() {
        let a = ContractId::next();
        let b = ContractId::next();
        assert!(b > a);
        ContractId(b.get() + 100).observe();
        assert!(ContractId::next().get() > b.get() + 100);
    }

    #[test]
    fn pattern_bounds() {
        let mut pattern = Pattern::empty(2, 2);
        assert!(!pattern.set(2, 0, red()));
        assert!(!pattern.set(-1, 0, red()));
        assert!(pattern.set(1, 1, red()));
        assert_eq!(pattern.get(1, 1), red().as_ref());
        assert_eq!(pattern.get(5, 5), None);
        assert_eq!(pattern.cell_count(), 1);
        let filled: Vec<_> = pattern.filled().map(|(c, _)| c).collect();
        assert_eq!(filled, vec![CellCoord::new(1, 1)]);
    }

    #[test]
    fn from_rows_pads() {
        let pattern = Pattern::from_rows(vec![vec![red()], vec![None, None, red()]]);
        assert_eq!((pattern.width(), pattern.height()), (3, 2));
        assert_eq!(pattern.cell_count(), 2);
    }

    #[test]
    fn reward_is_at_least_one() {
        let contract = Contract::new(1, Pattern::empty(1, 1), 0);
        assert_eq!(contract.reward, 1);
        assert_eq!(contract.cell_count, 0);
    }

    #[test]
    fn exact_match_required() {
        let contract = diagonal();
        let mut grid = Grid::new(3, 3).unwrap();
        let mut events = Vec::new();
        for i in 0..3 {
            let _ = grid.set_cell(i, i, red(), &mut events);
        }
        assert!(contract.is_satisfied_by(&grid));

        let _ = grid.set_cell(0, 2, red(), &mut events);
        assert!(!contract.is_satisfied_by(&grid));
    }

    #[test]
    fn cells_beyond_pattern_must_be_empty() {
        let contract = diagonal();
        let mut grid = Grid::new(3, 3).unwrap();
        let mut events = Vec::new();
        for i in 0..3 {
            let _ = grid.set_cell(i, i, red(), &mut events);
        }
        grid.expand(5, 5, &mut events).unwrap();
        assert!(contract.is_satisfied_by(&grid));
        let _ = grid.set_cell(4, 4, red(), &mut events);
        assert!(!contract.is_satisfied_by(&grid));
    }

    #[test]
    fn progress_counts() {
        let contract = diagonal();
        let mut grid = Grid::new(3, 3).unwrap();
        let mut events = Vec::new();
        let _ = grid.set_cell(0, 0, red(), &mut events);
        let _ = grid.set_cell(1, 1, Some(ColorId::from("blue")), &mut events);
        let _ = grid.set_cell(2, 0, red(), &mut events);
        let progress = contract.progress(&grid);
        assert_eq!(
            progress,
            Progress {
                correct: 1,
                wrong: 1,
                total: 3,
                percent: 33
            }
        );
    }

    #[test]
    fn contract_serde_roundtrip() {
        let contract = diagonal();
        let json = serde_json::to_string(&contract).unwrap();
        let back: Contract = serde_json::from_str(&json).unwrap();
        assert_eq!(back, contract);
    }
}
