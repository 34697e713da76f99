//! Auto-painter scheduler.
//!
//! Each owned per-color auto-painter paints one missing cell of its color
//! toward the active contract whenever its own interval has elapsed. The
//! scheduler keeps a private clock that only moves when [`AutoPainterSystem::advance`]
//! is called, so a paused game neither loses nor replays work.

use std::collections::BTreeMap;
use std::time::Duration;

use sim_core::catalog::{auto_painter_color, AUTO_PAINTERS_SWITCH, SPEED_BOOST};
use sim_core::{CellCoord, ColorId, GameState};
use tracing::debug;

/// Interval tuning for auto-painters.
#[derive(Clone, Debug, PartialEq)]
pub struct AutoPainterConfig {
    /// Interval of a freshly bought painter with no speed boost.
    pub base_interval: Duration,
    /// Fraction shaved off per painter level beyond the first.
    pub level_reduction: f64,
    /// Lowest level factor.
    pub level_floor: f64,
    /// Fraction shaved off per speed boost level.
    pub speed_reduction: f64,
    /// Lowest speed factor.
    pub speed_floor: f64,
    /// Hard lower bound on any interval.
    pub min_interval: Duration,
    /// Scheduler poll period.
    pub poll_period: Duration,
}

impl Default for AutoPainterConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(5_000),
            level_reduction: 0.08,
            level_floor: 0.2,
            speed_reduction: 0.1,
            speed_floor: 0.1,
            min_interval: Duration::from_millis(200),
            poll_period: Duration::from_millis(100),
        }
    }
}

impl AutoPainterConfig {
    /// Paint interval for a painter owned at `level` with `speed_boost`
    /// levels of the global speed upgrade. Only levels beyond the first
    /// count, so a freshly bought painter (level 1) runs at the base rate.
    #[must_use]
    pub fn interval(&self, level: u32, speed_boost: u32) -> Duration {
        let extra_levels = f64::from(level.saturating_sub(1));
        let level_factor = (1.0 - extra_levels * self.level_reduction).max(self.level_floor);
        let speed_factor =
            (1.0 - f64::from(speed_boost) * self.speed_reduction).max(self.speed_floor);
        let base_ms = self.base_interval.as_millis() as f64;
        let ms = (base_ms * level_factor * speed_factor).round().max(0.0) as u64;
        Duration::from_millis(ms).max(self.min_interval)
    }
}

/// Interval under the default tuning.
#[must_use]
pub fn auto_painter_interval(level: u32, speed_boost: u32) -> Duration {
    AutoPainterConfig::default().interval(level, speed_boost)
}

/// One painter's paint during a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stroke {
    /// Painter upgrade id.
    pub painter: String,
    /// Painted cell.
    pub coord: CellCoord,
    /// Painted color.
    pub color: ColorId,
}

/// Drives every auto-painter off a shared clock.
#[derive(Clone, Debug, Default)]
pub struct AutoPainterSystem {
    config: AutoPainterConfig,
    clock: Duration,
    last_paint: BTreeMap<String, Duration>,
}

impl AutoPainterSystem {
    /// Scheduler with explicit tuning.
    #[must_use]
    pub fn new(config: AutoPainterConfig) -> Self {
        Self {
            config,
            clock: Duration::ZERO,
            last_paint: BTreeMap::new(),
        }
    }

    /// Active tuning.
    #[must_use]
    pub fn config(&self) -> &AutoPainterConfig {
        &self.config
    }

    /// Time delivered so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.clock
    }

    /// Forgets paint history and restarts the clock, e.g. after a load.
    pub fn reset(&mut self) {
        self.clock = Duration::ZERO;
        self.last_paint.clear();
    }

    /// Delivers one poll period.
    pub fn tick(&mut self, state: &mut GameState) -> Vec<Stroke> {
        let period = self.config.poll_period;
        self.advance(state, period)
    }

    /// Moves the clock forward by `dt` and lets every due painter paint once.
    pub fn advance(&mut self, state: &mut GameState, dt: Duration) -> Vec<Stroke> {
        self.clock = self.clock.saturating_add(dt);
        let mut strokes = Vec::new();
        if state.active_contract().is_none() || !state.is_automation_enabled(AUTO_PAINTERS_SWITCH)
        {
            return strokes;
        }

        let speed = state.upgrade_level(SPEED_BOOST);
        let painters: Vec<(String, ColorId, u32)> = state
            .upgrades()
            .iter()
            .filter(|(_, &level)| level > 0)
            .filter_map(|(id, &level)| {
                auto_painter_color(id).map(|color| (id.clone(), ColorId::from(color), level))
            })
            .filter(|(id, _, _)| state.is_automation_enabled(id))
            .collect();

        for (id, color, level) in painters {
            // An earlier stroke may have completed the contract.
            if state.active_contract().is_none() {
                break;
            }
            let last = self.last_paint.get(&id).copied().unwrap_or(Duration::ZERO);
            if self.clock.saturating_sub(last) < self.config.interval(level, speed) {
                continue;
            }
            let Some(coord) = next_cell(state, &color) else {
                continue;
            };
            let _ = state.set_cell(coord.x, coord.y, Some(color.clone()));
            debug!(painter = %id, x = coord.x, y = coord.y, "auto-painted");
            let _ = self.last_paint.insert(id.clone(), self.clock);
            strokes.push(Stroke {
                painter: id,
                coord,
                color,
            });
        }
        strokes
    }
}

/// First row-major cell where the active pattern wants `color` and the grid
/// has something else.
fn next_cell(state: &GameState, color: &ColorId) -> Option<CellCoord> {
    let contract = state.active_contract()?;
    contract
        .pattern
        .filled()
        .filter(|(_, wanted)| *wanted == color)
        .map(|(coord, _)| coord)
        .find(|coord| state.grid().get_cell(coord.x, coord.y) != Some(color))
}
