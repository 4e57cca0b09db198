//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] keeps a registry of [`EventType`]s (a source id plus an event
//! name) and fans every published [`BusEvent`] out to all subscriptions.
//! Each [`Subscription`] is a stream filtered to one source id and a set of
//! event names; it ends once the bus is [closed](EventBus::close).
//!
//! Consumers depend on the [`EventBroker`] trait so that the bus can be
//! swapped for another transport or a test double.

use std::collections::{BTreeSet, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// BusEvent
// ---------------------------------------------------------------------------

/// An event published on the bus.
///
/// Constructed via [`BusEvent::new`] and given a body with
/// [`with_payload`](BusEvent::with_payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusEvent {
    pub id: Uuid,

    /// Identity of the service that owns the event type.
    pub source_id: String,

    /// Event name, e.g. `"cardbus:card:create"`.
    pub name: String,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl BusEvent {
    /// Create an event with an empty object payload.
    pub fn new(source_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            source_id: source_id.into(),
            name: name.into(),
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn event_type(&self) -> EventType {
        EventType::new(self.source_id.clone(), self.name.clone())
    }
}

/// A registered kind of event, scoped to its source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventType {
    pub source_id: String,
    pub name: String,
}

impl EventType {
    pub fn new(source_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            name: name.into(),
        }
    }
}

/// Errors reported by an [`EventBroker`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    #[error("Event type '{name}' is not registered for source '{source_id}'")]
    UnknownEventType { source_id: String, name: String },

    #[error("Event bus is closed")]
    Closed,
}

/// A stream of events matching one subscription, in publish order.
///
/// The stream ends when the bus is closed; it never restarts.
pub type Subscription = BoxStream<'static, BusEvent>;

/// The bus operations the card lifecycle depends on.
#[async_trait]
pub trait EventBroker: Send + Sync {
    /// Register an event type. Registering an identical type again is a
    /// no-op.
    async fn register_event_type(&self, event_type: EventType) -> Result<(), BusError>;

    /// Subscribe to `names` published under `source_id`.
    ///
    /// Every name must already be registered for the source. An empty
    /// `names` slice subscribes to every event of the source.
    async fn subscribe(
        &self,
        source_id: &str,
        names: &[String],
    ) -> Result<Subscription, BusError>;
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscriptions can
/// independently receive every published [`BusEvent`].
///
/// # Usage
///
/// ```rust
/// use cardbus_events::bus::{BusEvent, EventBus, EventType};
///
/// let bus = EventBus::default();
/// bus.register(EventType::new("cardbus", "cardbus:card:create")).unwrap();
/// let _events = bus.subscribe_to("cardbus", &["cardbus:card:create".to_string()]).unwrap();
///
/// bus.publish(BusEvent::new("cardbus", "cardbus:card:create")).unwrap();
/// ```
pub struct EventBus {
    sender: broadcast::Sender<BusEvent>,
    event_types: RwLock<BTreeSet<EventType>>,
    closed: CancellationToken,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow subscriptions skip them with a warning.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            event_types: RwLock::new(BTreeSet::new()),
            closed: CancellationToken::new(),
        }
    }

    /// Register an event type.
    ///
    /// Returns `true` if the type was not registered before.
    pub fn register(&self, event_type: EventType) -> Result<bool, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        let mut types = self
            .event_types
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let added = types.insert(event_type.clone());
        if added {
            tracing::debug!(
                source_id = %event_type.source_id,
                name = %event_type.name,
                "Event type registered"
            );
        }
        Ok(added)
    }

    /// All registered event types, ordered by source id then name.
    pub fn event_types(&self) -> Vec<EventType> {
        self.event_types
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    fn is_registered(&self, event_type: &EventType) -> bool {
        self.event_types
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains(event_type)
    }

    /// Publish an event to all current subscriptions.
    ///
    /// Returns the number of subscriptions the event was handed to (zero is
    /// not an error). Fails for unregistered event types and after
    /// [`close`](Self::close).
    pub fn publish(&self, event: BusEvent) -> Result<usize, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        let event_type = event.event_type();
        if !self.is_registered(&event_type) {
            return Err(BusError::UnknownEventType {
                source_id: event_type.source_id,
                name: event_type.name,
            });
        }
        // A SendError only means there are zero receivers.
        Ok(self.sender.send(event).unwrap_or(0))
    }

    /// Open a subscription to `names` published under `source_id`.
    pub fn subscribe_to(
        &self,
        source_id: &str,
        names: &[String],
    ) -> Result<Subscription, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        for name in names {
            let event_type = EventType::new(source_id, name.as_str());
            if !self.is_registered(&event_type) {
                return Err(BusError::UnknownEventType {
                    source_id: event_type.source_id,
                    name: event_type.name,
                });
            }
        }

        let state = SubscriptionState {
            receiver: self.sender.subscribe(),
            closed: self.closed.clone(),
            source_id: source_id.to_string(),
            names: names.iter().cloned().collect(),
        };
        Ok(stream::unfold(state, next_event).boxed())
    }

    /// Close the bus.
    ///
    /// Subscriptions deliver whatever was already published and then end;
    /// further publish, register and subscribe calls fail with
    /// [`BusError::Closed`].
    pub fn close(&self) {
        if !self.closed.is_cancelled() {
            tracing::info!("Event bus closing");
        }
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl EventBroker for EventBus {
    async fn register_event_type(&self, event_type: EventType) -> Result<(), BusError> {
        self.register(event_type).map(|_| ())
    }

    async fn subscribe(
        &self,
        source_id: &str,
        names: &[String],
    ) -> Result<Subscription, BusError> {
        self.subscribe_to(source_id, names)
    }
}

// ---------------------------------------------------------------------------
// Subscription stream
// ---------------------------------------------------------------------------

struct SubscriptionState {
    receiver: broadcast::Receiver<BusEvent>,
    closed: CancellationToken,
    source_id: String,
    names: HashSet<String>,
}

impl SubscriptionState {
    fn matches(&self, event: &BusEvent) -> bool {
        event.source_id == self.source_id
            && (self.names.is_empty() || self.names.contains(&event.name))
    }
}

/// Produce the next matching event, or `None` once the bus is closed.
///
/// Already-buffered events win over the close signal.
async fn next_event(mut state: SubscriptionState) -> Option<(BusEvent, SubscriptionState)> {
    loop {
        tokio::select! {
            biased;
            received = state.receiver.recv() => match received {
                Ok(event) if state.matches(&event) => return Some((event, state)),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        skipped,
                        source_id = %state.source_id,
                        "Subscription lagged, some events were skipped"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            },
            _ = state.closed.cancelled() => return None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
