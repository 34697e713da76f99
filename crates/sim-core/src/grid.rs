//! Sparse paint grid with bounded undo history.
//!
//! Only filled cells are stored. Mutations report what happened into a
//! caller-supplied `Vec<GridEvent>` so the owner decides how to publish them.

use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ColorId;

/// Maximum number of edits retained for undo.
pub const MAX_HISTORY: usize = 50;

/// Integer cell coordinate. Negative values are representable so that callers
/// can pass raw input; they are simply never valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl CellCoord {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// Row-major: top-to-bottom, then left-to-right.
impl Ord for CellCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for CellCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A single reversible edit. Also used as the payload of change events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellEdit {
    /// Cell that changed.
    pub coord: CellCoord,
    /// Color before the edit (`None` = empty).
    pub old: Option<ColorId>,
    /// Color after the edit (`None` = empty).
    pub new: Option<ColorId>,
}

/// A filled cell returned by region queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilledCell {
    /// Cell position.
    pub coord: CellCoord,
    /// Cell color.
    pub color: ColorId,
}

/// Notifications produced by grid mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridEvent {
    /// One cell changed through `set_cell` or `undo`.
    CellChanged(CellEdit),
    /// A batch of cells changed through `set_cells`.
    CellsChanged(Vec<CellEdit>),
    /// Every cell was removed.
    Cleared,
    /// Dimensions grew.
    Resized {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
    /// Contents were replaced from saved data.
    Loaded {
        /// Loaded width.
        width: u32,
        /// Loaded height.
        height: u32,
    },
}

/// Rejected grid operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// Width and height must both be at least 1.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    ZeroSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The grid is expand-only.
    #[error("grid cannot shrink from {width}x{height} to {new_width}x{new_height}")]
    Shrink {
        /// Current width.
        width: u32,
        /// Current height.
        height: u32,
        /// Requested width.
        new_width: u32,
        /// Requested height.
        new_height: u32,
    },
}

/// Sparse grid of colored cells.
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: BTreeMap<CellCoord, ColorId>,
    history: VecDeque<CellEdit>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            cells: BTreeMap::new(),
            history: VecDeque::with_capacity(MAX_HISTORY),
        }
    }
}

impl Grid {
    /// Creates an empty grid.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroSize { width, height });
        }
        Ok(Self {
            width,
            height,
            ..Self::default()
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Bounds check.
    #[must_use]
    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Color at `(x, y)`, `None` when empty or out of bounds.
    #[must_use]
    pub fn get_cell(&self, x: i32, y: i32) -> Option<&ColorId> {
        self.cells.get(&CellCoord::new(x, y))
    }

    /// Number of filled cells.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells.len()
    }

    /// True when no cell is filled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of edits available to `undo`.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Filled cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &ColorId)> {
        self.cells.iter().map(|(coord, color)| (*coord, color))
    }

    /// Paints (or erases, with `None`) a single cell.
    ///
    /// Returns `false` without side effects when the coordinate is invalid or
    /// the color is unchanged.
    pub fn set_cell(
        &mut self,
        x: i32,
        y: i32,
        color: Option<ColorId>,
        out: &mut Vec<GridEvent>,
    ) -> bool {
        let Some(edit) = self.write(CellCoord::new(x, y), color) else {
            return false;
        };
        self.record(edit.clone());
        out.push(GridEvent::CellChanged(edit));
        true
    }

    /// Applies a batch of writes in order. Only cells that actually changed are
    /// recorded; a single batch event is emitted when at least one did.
    pub fn set_cells<I>(&mut self, batch: I, out: &mut Vec<GridEvent>) -> usize
    where
        I: IntoIterator<Item = (CellCoord, Option<ColorId>)>,
    {
        let mut changed = Vec::new();
        for (coord, color) in batch {
            if let Some(edit) = self.write(coord, color) {
                self.record(edit.clone());
                changed.push(edit);
            }
        }
        let count = changed.len();
        if count > 0 {
            out.push(GridEvent::CellsChanged(changed));
        }
        count
    }

    /// Reverts the most recent edit. There is no redo.
    pub fn undo(&mut self, out: &mut Vec<GridEvent>) -> bool {
        let Some(last) = self.history.pop_back() else {
            return false;
        };
        match self.write(last.coord, last.old) {
            Some(edit) => out.push(GridEvent::CellChanged(edit)),
            None => tracing::debug!(?last.coord, "undo entry already matched grid"),
        }
        true
    }

    /// Grows the grid. Shrinking either dimension is rejected. History is
    /// discarded because it refers to the previous coordinate space.
    pub fn expand(
        &mut self,
        width: u32,
        height: u32,
        out: &mut Vec<GridEvent>,
    ) -> Result<(), GridError> {
        if width < self.width || height < self.height {
            return Err(GridError::Shrink {
                width: self.width,
                height: self.height,
                new_width: width,
                new_height: height,
            });
        }
        self.width = width;
        self.height = height;
        self.history.clear();
        out.push(GridEvent::Resized { width, height });
        Ok(())
    }

    /// Removes all cells and history. No event when already empty.
    pub fn clear(&mut self, out: &mut Vec<GridEvent>) -> bool {
        self.history.clear();
        if self.cells.is_empty() {
            return false;
        }
        self.cells.clear();
        out.push(GridEvent::Cleared);
        true
    }

    /// Filled cells inside the inclusive rectangle spanned by the two corners,
    /// clamped to the grid, in row-major order.
    #[must_use]
    pub fn cells_in_region(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<FilledCell> {
        if self.cells.is_empty() {
            return Vec::new();
        }
        let min_x = x0.min(x1).max(0);
        let min_y = y0.min(y1).max(0);
        let max_x = x0.max(x1).min(last_index(self.width));
        let max_y = y0.max(y1).min(last_index(self.height));
        if min_x > max_x || min_y > max_y {
            return Vec::new();
        }

        let area = (max_x - min_x + 1) as usize * (max_y - min_y + 1) as usize;
        if area < self.cells.len() {
            let mut found = Vec::new();
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    if let Some(color) = self.get_cell(x, y) {
                        found.push(FilledCell {
                            coord: CellCoord::new(x, y),
                            color: color.clone(),
                        });
                    }
                }
            }
            found
        } else {
            self.cells
                .iter()
                .filter(|(c, _)| c.x >= min_x && c.x <= max_x && c.y >= min_y && c.y <= max_y)
                .map(|(coord, color)| FilledCell {
                    coord: *coord,
                    color: color.clone(),
                })
                .collect()
        }
    }

    /// Sparse serialized form.
    #[must_use]
    pub fn to_data(&self) -> GridData {
        GridData {
            width: self.width,
            height: self.height,
            cells: GridCells::Sparse(
                self.cells
                    .iter()
                    .map(|(c, color)| (c.x, c.y, color.clone()))
                    .collect(),
            ),
        }
    }

    /// Rebuilds a grid from serialized data. Cells outside the saved bounds
    /// are dropped; history starts empty.
    pub fn from_data(data: &GridData) -> Result<Self, GridError> {
        let mut grid = Self::new(data.width, data.height)?;
        match &data.cells {
            GridCells::Sparse(cells) => {
                for (x, y, color) in cells {
                    if grid.is_valid(*x, *y) {
                        let _ = grid.cells.insert(CellCoord::new(*x, *y), color.clone());
                    }
                }
            }
            GridCells::Dense(cells) => {
                let width = data.width as usize;
                for (i, color) in cells.iter().enumerate() {
                    let Some(color) = color.as_deref().filter(|c| !c.is_empty()) else {
                        continue;
                    };
                    let (x, y) = ((i % width) as i32, (i / width) as i32);
                    if !grid.is_valid(x, y) {
                        break;
                    }
                    let _ = grid.cells.insert(CellCoord::new(x, y), ColorId::new(color));
                }
            }
        }
        Ok(grid)
    }

    fn write(&mut self, coord: CellCoord, color: Option<ColorId>) -> Option<CellEdit> {
        if !self.is_valid(coord.x, coord.y) || self.cells.get(&coord) == color.as_ref() {
            return None;
        }
        let old = match &color {
            Some(c) => self.cells.insert(coord, c.clone()),
            None => self.cells.remove(&coord),
        };
        Some(CellEdit {
            coord,
            old,
            new: color,
        })
    }

    fn record(&mut self, edit: CellEdit) {
        if self.history.len() == MAX_HISTORY {
            let _ = self.history.pop_front();
        }
        self.history.push_back(edit);
    }
}

fn last_index(extent: u32) -> i32 {
    i32::try_from(extent).unwrap_or(i32::MAX) - 1
}

/// Serialized grid: dimensions plus cell data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridData {
    /// Saved width.
    pub width: u32,
    /// Saved height.
    pub height: u32,
    /// Saved cells.
    pub cells: GridCells,
}

/// Cell payload of a saved grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridCells {
    /// `(x, y, color)` triples for filled cells.
    Sparse(Vec<(i32, i32, ColorId)>),
    /// Legacy row-major array, one entry per cell; `null` or `""` is empty.
    Dense(Vec<Option<String>>),
}
