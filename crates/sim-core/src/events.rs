//! Typed publish/subscribe for game state changes.

use std::fmt;

use crate::catalog::ColorId;
use crate::contract::Contract;
use crate::grid::GridEvent;

/// Everything observers can be told about. Each variant carries a fixed
/// payload type.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Grid change (cell, batch, clear, resize, load).
    Grid(GridEvent),
    /// Balance changed by `delta`.
    MoneyChanged {
        /// New balance.
        money: u64,
        /// Signed change.
        delta: i64,
    },
    /// A color was added to the palette.
    ColorUnlocked {
        /// Unlocked color.
        color: ColorId,
    },
    /// The active brush color changed.
    ColorSelected {
        /// Selected color.
        color: ColorId,
    },
    /// An upgrade level changed.
    UpgradeChanged {
        /// Upgrade id.
        id: String,
        /// New level.
        level: u32,
    },
    /// An automation flag flipped.
    AutomationToggled {
        /// Automation id.
        id: String,
        /// New state.
        enabled: bool,
    },
    /// A contract became active.
    ContractStarted {
        /// The new contract.
        contract: Box<Contract>,
    },
    /// The active contract was abandoned.
    ContractCleared {
        /// The abandoned contract.
        contract: Box<Contract>,
    },
    /// The active contract was completed and paid.
    ContractCompleted {
        /// The completed contract.
        contract: Box<Contract>,
    },
    /// The whole state was replaced from a save.
    StateLoaded,
}

/// Discriminant of [`GameEvent`] used for filtered subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Single cell change.
    CellChanged,
    /// Batched cell change.
    CellsChanged,
    /// Grid cleared.
    GridCleared,
    /// Grid resized.
    GridResized,
    /// Grid loaded.
    GridLoaded,
    /// Money changed.
    MoneyChanged,
    /// Color unlocked.
    ColorUnlocked,
    /// Color selected.
    ColorSelected,
    /// Upgrade changed.
    UpgradeChanged,
    /// Automation toggled.
    AutomationToggled,
    /// Contract started.
    ContractStarted,
    /// Contract abandoned.
    ContractCleared,
    /// Contract completed.
    ContractCompleted,
    /// State loaded.
    StateLoaded,
}

impl GameEvent {
    /// Kind of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Grid(GridEvent::CellChanged(_)) => EventKind::CellChanged,
            Self::Grid(GridEvent::CellsChanged(_)) => EventKind::CellsChanged,
            Self::Grid(GridEvent::Cleared) => EventKind::GridCleared,
            Self::Grid(GridEvent::Resized { .. }) => EventKind::GridResized,
            Self::Grid(GridEvent::Loaded { .. }) => EventKind::GridLoaded,
            Self::MoneyChanged { .. } => EventKind::MoneyChanged,
            Self::ColorUnlocked { .. } => EventKind::ColorUnlocked,
            Self::ColorSelected { .. } => EventKind::ColorSelected,
            Self::UpgradeChanged { .. } => EventKind::UpgradeChanged,
            Self::AutomationToggled { .. } => EventKind::AutomationToggled,
            Self::ContractStarted { .. } => EventKind::ContractStarted,
            Self::ContractCleared { .. } => EventKind::ContractCleared,
            Self::ContractCompleted { .. } => EventKind::ContractCompleted,
            Self::StateLoaded => EventKind::StateLoaded,
        }
    }
}

impl From<GridEvent> for GameEvent {
    fn from(event: GridEvent) -> Self {
        Self::Grid(event)
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&GameEvent) + Send>;

struct Subscriber {
    id: SubscriptionId,
    filter: Option<EventKind>,
    handler: Handler,
}

/// Synchronous event dispatcher. Handlers run in subscription order before
/// `publish` returns.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Receives every event.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.add(None, Box::new(handler))
    }

    /// Receives only events of `kind`.
    pub fn subscribe_to<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.add(Some(kind), Box::new(handler))
    }

    /// Removes a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// True when nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Delivers `event` to every matching subscriber.
    pub fn publish(&mut self, event: &GameEvent) {
        let kind = event.kind();
        for sub in &mut self.subscribers {
            if sub.filter.map_or(true, |f| f == kind) {
                (sub.handler)(event);
            }
        }
    }

    fn add(&mut self, filter: Option<EventKind>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            filter,
            handler,
        });
        id
    }
}
