//! Side-effect notifications
//!
//! Services emit events that a UI turns into transient notifications (a
//! section failed to load) or re-render triggers (a bookmark changed).
//! Delivery uses `tokio::sync::broadcast`: emitting never blocks, events are
//! dropped when nobody listens, and lagging subscribers lose the oldest
//! events first.
//!
//! # Example
//!
//! ```no_run
//! use libmoviefinder::service::events::{EventBus, Event};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(Event::BookmarkToggled { movie_id: 533535, bookmarked: true });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::RootError;
use crate::types::MovieListType;

pub type EventReceiver = broadcast::Receiver<Event>;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// `capacity` is the per-subscriber buffer before lagging kicks in
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers without blocking
    pub fn emit(&self, event: Event) {
        // Err only means there are no receivers
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A home section reached its error state; sibling sections are unaffected
    SectionFailed {
        list_type: MovieListType,
        error: RootError,
    },

    /// A detail screen load failed
    DetailFailed { movie_id: i64, error: RootError },

    /// Bookmark membership changed; lists already rendered should re-overlay
    BookmarkToggled { movie_id: i64, bookmarked: bool },
}

impl Event {
    /// Text for a transient user notification, if this event warrants one
    pub fn notification(&self) -> Option<String> {
        match self {
            Event::SectionFailed { list_type, error } => {
                Some(format!("{}: {}", list_type.label(), error.user_message()))
            }
            Event::DetailFailed { error, .. } => Some(error.user_message().to_string()),
            Event::BookmarkToggled { .. } => None,
        }
    }
}
