//! Typed event bus carrying intents and notifications.
//!
//! Intents are user- or system-originated mutation requests; notifications
//! (errors, toasts) travel the same channel in the other direction. The bus
//! decouples the UI from the engine: every subscriber gets its own receiver
//! and filters the variants it handles.

use std::collections::BTreeSet;

use tokio::sync::broadcast;

use crate::states::Target;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Re-read the remote store and republish the snapshot.
    Reload,
    /// Soft-delete a recipe.
    Delete { id: i64 },
    /// Create a recipe, optionally straight onto the plan or shopping list.
    Add {
        title: String,
        url: Option<String>,
        tags: BTreeSet<String>,
        target: Target,
    },
    /// Replace a recipe's title, url and tags.
    Update {
        id: i64,
        title: String,
        url: Option<String>,
        tags: BTreeSet<String>,
    },
    /// Put a recipe on the plan, taking it off the shopping list.
    AddToPlan { id: i64 },
    AddToShop { id: i64 },
    /// Take a recipe off the plan; `increment_counter` bumps its
    /// times-cooked counter as part of the same batched write.
    RemoveFromPlan { id: i64, increment_counter: bool },
    RemoveFromShop { id: i64 },
    /// Bind the local cache to a different remote store (or unbind).
    StoreIdChanged { id: Option<String> },
    /// Create a fresh remote store and bind to it.
    CreateStore,
    /// A failed intent, surfaced to the user.
    Error { message: String },
    /// Transient user-visible notice.
    Notification { message: String },
}

impl Event {
    /// Whether the sync engine consumes this event.
    pub fn is_recipe_intent(&self) -> bool {
        matches!(
            self,
            Event::Reload
                | Event::Delete { .. }
                | Event::Add { .. }
                | Event::Update { .. }
                | Event::AddToPlan { .. }
                | Event::AddToShop { .. }
                | Event::RemoveFromPlan { .. }
                | Event::RemoveFromShop { .. }
        )
    }
}

/// Broadcast channel shared by all components.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Publishes an event. Events published while nobody is subscribed are
    /// dropped.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
