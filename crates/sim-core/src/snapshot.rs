//! Versioned save document.
//!
//! Version changelog:
//! - v2: grid, money, colors, upgrades, contract; grids may use the dense layout
//! - v3: adds `automation_enabled`
//! - v4: adds `stats` and `saved_at`

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{ColorId, DEFAULT_COLOR, STARTING_COLORS};
use crate::contract::Contract;
use crate::grid::{Grid, GridData};
use crate::state::{StateError, Stats};

/// Version written by this build.
pub const SAVE_VERSION: u32 = 4;

/// Versions accepted on load.
pub const SUPPORTED_SAVE_VERSIONS: [u32; 3] = [2, 3, 4];

/// Complete persisted game state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    /// Format version.
    pub version: u32,
    /// Grid dimensions and cells.
    #[serde(default = "default_grid")]
    pub grid: GridData,
    /// Grid expansion tier.
    #[serde(default)]
    pub grid_level: u32,
    /// Balance.
    #[serde(default)]
    pub money: u64,
    /// Unlocked colors.
    #[serde(default = "default_colors")]
    pub unlocked_colors: Vec<ColorId>,
    /// Brush color.
    #[serde(default = "default_selected")]
    pub selected_color: ColorId,
    /// Owned upgrade levels.
    #[serde(default)]
    pub upgrades: BTreeMap<String, u32>,
    /// Automation flags.
    #[serde(default)]
    pub automation_enabled: BTreeMap<String, bool>,
    /// Contract in progress.
    #[serde(default)]
    pub active_contract: Option<Contract>,
    /// Completed contract counter.
    #[serde(default)]
    pub completed_contracts: u32,
    /// Lifetime statistics.
    #[serde(default)]
    pub stats: Stats,
    /// When the document was written.
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl SaveDocument {
    /// Rejects versions this build cannot read.
    pub fn check_version(&self) -> Result<(), StateError> {
        if SUPPORTED_SAVE_VERSIONS.contains(&self.version) {
            Ok(())
        } else {
            Err(StateError::UnsupportedVersion(self.version))
        }
    }

    /// Parses a JSON document and checks its version.
    pub fn from_json(text: &str) -> Result<Self, StateError> {
        let doc: Self =
            serde_json::from_str(text).map_err(|e| StateError::InvalidSave(e.to_string()))?;
        doc.check_version()?;
        Ok(doc)
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> Result<String, StateError> {
        serde_json::to_string_pretty(self).map_err(|e| StateError::InvalidSave(e.to_string()))
    }
}

fn default_grid() -> GridData {
    Grid::default().to_data()
}

fn default_colors() -> Vec<ColorId> {
    STARTING_COLORS.iter().map(|id| ColorId::from(*id)).collect()
}

fn default_selected() -> ColorId {
    ColorId::from(DEFAULT_COLOR)
}
