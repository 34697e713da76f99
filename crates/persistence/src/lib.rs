#![deny(warnings)]

//! Persistence layer: save stores and the textual export format.

pub mod store;
pub mod transfer;

use std::path::PathBuf;

use sim_core::StateError;
use thiserror::Error;

pub use store::{FileStore, MemoryStore, SaveStore};
pub use transfer::{decode, encode, TransferError, EXPORT_DOMAIN};

/// Storage failures.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem error.
    #[error("save i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// Stored text is not a loadable save.
    #[error(transparent)]
    Invalid(#[from] StateError),
    /// A previous holder of the store panicked.
    #[error("save store lock poisoned")]
    Poisoned,
}

/// Default location of the local save file.
#[must_use]
pub fn default_save_path() -> PathBuf {
    PathBuf::from("./saves/gridpaint.json")
}
