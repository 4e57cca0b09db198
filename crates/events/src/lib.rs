//! Card event bus and lifecycle management.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, reachable through the [`EventBroker`] trait.
//! - [`BusEvent`]: the event envelope carried on the bus.
//! - [`CardLifecycleManager`]: registers the card topics, consumes them on a
//!   single background task and applies the card persistence policy.
//! - [`backoff`]: retry policy for opening the subscription.

pub mod backoff;
pub mod bus;
pub mod lifecycle;

pub use backoff::RetryConfig;
pub use bus::{BusError, BusEvent, EventBroker, EventBus, EventType, Subscription};
pub use lifecycle::{CardLifecycleManager, ConsumerExit, ConsumerHandle, LifecycleConfig};
