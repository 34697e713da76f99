#![deny(warnings)]

//! Runtime for a running game: the auto-painter scheduler, the command
//! surface front ends drive, and the background timers.
//!
//! A [`Session`] holds the one [`Game`] behind an async mutex. Commands and
//! timer callbacks both take that lock, so every mutation is serialized.

pub mod game;
pub mod painter;
pub mod timers;

use std::sync::Arc;

use persistence::{PersistenceError, SaveStore, TransferError};
use sim_contracts::ContractError;
use sim_core::StateError;
use sim_econ::ShopError;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

pub use game::{Command, Game, Outcome};
pub use painter::{auto_painter_interval, AutoPainterConfig, AutoPainterSystem, Stroke};
pub use timers::{TimerConfig, Timers};

/// Anything a command can fail with.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Shop(#[from] ShopError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Shared handle to a game and its save store.
#[derive(Clone)]
pub struct Session {
    game: Arc<Mutex<Game>>,
    store: Arc<dyn SaveStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(game: Game, store: Arc<dyn SaveStore>) -> Self {
        Self {
            game: Arc::new(Mutex::new(game)),
            store,
        }
    }

    /// The shared game, e.g. to read state for display.
    #[must_use]
    pub fn game(&self) -> Arc<Mutex<Game>> {
        Arc::clone(&self.game)
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn SaveStore> {
        Arc::clone(&self.store)
    }

    /// Runs one command under the game lock.
    pub async fn execute(&self, command: Command) -> Result<Outcome, RuntimeError> {
        debug!(?command, "execute");
        let mut game = self.game.lock().await;
        game.execute(command, self.store.as_ref())
    }

    /// Timers bound to this session's game and store, initially stopped.
    #[must_use]
    pub fn timers(&self, config: TimerConfig) -> Timers {
        Timers::new(self.game(), self.store(), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::MemoryStore;

    #[tokio::test]
    async fn commands_share_one_game() {
        let session = Session::new(Game::new(7), Arc::new(MemoryStore::new()));
        let other = session.clone();
        let outcome = session
            .execute(Command::SetCell {
                x: 0,
                y: 0,
                color: None,
                erase: false,
            })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Changed(true));
        let game = other.game();
        let game = game.lock().await;
        assert_eq!(
            game.state.grid().get_cell(0, 0).map(sim_core::ColorId::as_str),
            Some("black")
        );
    }
}
