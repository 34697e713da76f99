#![deny(warnings)]

//! Core domain model for Grid Painter.
//!
//! This crate owns the sparse paint grid, the static catalogs, the contract
//! type, the typed event bus and the [`GameState`] aggregate that ties them
//! together. Higher-level systems (contracts, shop, automation) borrow the
//! state and mutate it only through its methods.

pub mod catalog;
pub mod contract;
pub mod events;
pub mod grid;
pub mod snapshot;
pub mod state;

pub use catalog::ColorId;
pub use contract::{Contract, ContractId, Pattern, Progress};
pub use events::{EventBus, EventKind, GameEvent, SubscriptionId};
pub use grid::{CellCoord, CellEdit, FilledCell, Grid, GridData, GridError, GridEvent, MAX_HISTORY};
pub use snapshot::{SaveDocument, SAVE_VERSION, SUPPORTED_SAVE_VERSIONS};
pub use state::{GameState, StateError, Stats};
