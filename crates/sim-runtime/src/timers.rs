//! Background automation and autosave tasks.
//!
//! Both timers lock the shared [`Game`] for the duration of one callback, so
//! a tick never interleaves with a command. Hiding the game stops the tasks
//! and showing it spawns fresh ones; the painter clock only counts delivered
//! ticks, so nothing is lost or replayed across a pause.

use std::sync::Arc;
use std::time::Duration;

use persistence::SaveStore;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::game::Game;

/// Timer periods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerConfig {
    /// Automation poll period.
    pub tick_period: Duration,
    /// Time between autosaves.
    pub autosave_period: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(100),
            autosave_period: Duration::from_secs(30),
        }
    }
}

/// Owns the background tasks for one game.
pub struct Timers {
    game: Arc<Mutex<Game>>,
    store: Arc<dyn SaveStore>,
    config: TimerConfig,
    tasks: Vec<JoinHandle<()>>,
    wanted: bool,
    visible: bool,
}

impl std::fmt::Debug for Timers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timers")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("visible", &self.visible)
            .finish()
    }
}

impl Timers {
    /// Timers for `game`, initially stopped and visible.
    pub fn new(game: Arc<Mutex<Game>>, store: Arc<dyn SaveStore>, config: TimerConfig) -> Self {
        Self {
            game,
            store,
            config,
            tasks: Vec::new(),
            wanted: false,
            visible: true,
        }
    }

    /// Whether tasks are currently spawned.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Starts both timers. Must be called inside a tokio runtime. Does
    /// nothing if they already run; defers until shown if hidden.
    pub fn start(&mut self) {
        self.wanted = true;
        if self.visible && self.tasks.is_empty() {
            self.spawn();
        }
    }

    /// Cancels both timers.
    pub fn stop(&mut self) {
        self.wanted = false;
        self.abort();
    }

    /// Pauses on hide and resumes on show.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.abort();
        } else if self.wanted && self.tasks.is_empty() {
            self.spawn();
        }
        debug!(visible, running = self.is_running(), "visibility changed");
    }

    fn spawn(&mut self) {
        let tick = self.config.tick_period;
        let game = Arc::clone(&self.game);
        self.tasks.push(tokio::spawn(async move {
            let mut ticker = interval(tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut game = game.lock().await;
                let _ = game.advance(tick);
            }
        }));

        let period = self.config.autosave_period;
        let game = Arc::clone(&self.game);
        let store = Arc::clone(&self.store);
        self.tasks.push(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let game = game.lock().await;
                if let Err(err) = game.save(store.as_ref()) {
                    warn!(%err, "autosave failed");
                }
            }
        }));
        info!(?tick, ?period, "timers started");
    }

    fn abort(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        info!("timers stopped");
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}
