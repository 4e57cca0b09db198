//! Card lifecycle management.
//!
//! [`CardLifecycleManager`] owns the card persistence policy and the
//! background task that turns card events on the bus into storage
//! mutations:
//!
//! - `"<service>:card:create"` carries an [`ExternalCard`] payload and is
//!   applied as an upsert.
//! - `"<service>:card:delete"` carries `{"id": "..."}` and is applied as a
//!   delete.
//!
//! Short notices are never stored. Gateway errors are returned to the caller
//! unchanged and never retried. Every call that reaches the bus or the
//! gateway takes a [`CancellationToken`].
//!
//! [`ExternalCard`]: cardbus_core::schema::ExternalCard

use std::future::Future;
use std::sync::Arc;

use cardbus_core::card::Card;
use cardbus_core::codec::{Codec, JsonCodec};
use cardbus_core::config::{env_string_or, ConfigError};
use cardbus_core::error::{CardError, SchemaError};
use cardbus_core::gateway::CardGateway;
use cardbus_core::schema::SchemaAdapter;
use cardbus_core::topics::{CardTopics, DEFAULT_SERVICE_NAME};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backoff::{next_delay, RetryConfig};
use crate::bus::{BusEvent, EventBroker, EventType, Subscription};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for a [`CardLifecycleManager`].
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Service name; also the bus source id the card topics live under.
    pub service_name: String,
    /// Backoff used when opening the subscription.
    pub retry: RetryConfig,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            retry: RetryConfig::default(),
        }
    }
}

impl LifecycleConfig {
    /// Load from environment variables with defaults.
    ///
    /// `CARD_SERVICE_NAME` (default `cardbus`) plus the variables read by
    /// [`RetryConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            service_name: env_string_or("CARD_SERVICE_NAME", DEFAULT_SERVICE_NAME),
            retry: RetryConfig::from_env()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Consumer handle
// ---------------------------------------------------------------------------

/// Why the consumer task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerExit {
    /// The bus closed the subscription.
    ChannelClosed,
    /// The consumer's cancellation token fired.
    Cancelled,
    /// The task panicked or was aborted.
    Failed,
}

/// Owns the background consumer started by
/// [`CardLifecycleManager::start`].
#[derive(Debug)]
pub struct ConsumerHandle {
    cancel: CancellationToken,
    join: JoinHandle<ConsumerExit>,
}

impl ConsumerHandle {
    /// `true` once the consumer has stopped for any reason.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Cancel the consumer and wait for it to stop.
    pub async fn shutdown(self) -> ConsumerExit {
        self.cancel.cancel();
        self.wait().await
    }

    /// Wait for the consumer to stop on its own.
    pub async fn wait(self) -> ConsumerExit {
        match self.join.await {
            Ok(exit) => exit,
            Err(e) => {
                tracing::error!(error = %e, "Card lifecycle consumer failed");
                ConsumerExit::Failed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Body of a `"<service>:card:delete"` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCardPayload {
    pub id: String,
}

/// Applies the card persistence policy and consumes card lifecycle events.
///
/// Cheap to clone; collaborators are shared behind `Arc`.
#[derive(Clone)]
pub struct CardLifecycleManager {
    broker: Arc<dyn EventBroker>,
    gateway: Arc<dyn CardGateway>,
    adapter: SchemaAdapter,
    source_id: String,
    topics: CardTopics,
    retry: RetryConfig,
}

impl CardLifecycleManager {
    pub fn new(
        broker: Arc<dyn EventBroker>,
        gateway: Arc<dyn CardGateway>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            broker,
            gateway,
            adapter: SchemaAdapter::default(),
            topics: CardTopics::new(&config.service_name),
            source_id: config.service_name,
            retry: config.retry,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn topics(&self) -> &CardTopics {
        &self.topics
    }

    /// Register the card topics, subscribe to them and spawn the consumer.
    ///
    /// A failing subscribe is retried with backoff; once the attempts are
    /// exhausted the failure is returned as [`CardError::Subscription`]. The
    /// consumer runs under a child of `cancel`.
    pub async fn start(&self, cancel: &CancellationToken) -> Result<ConsumerHandle, CardError> {
        self.register_topics(cancel).await?;
        let subscription = self.subscribe_with_retry(cancel).await?;

        let consumer_cancel = cancel.child_token();
        let manager = self.clone();
        let task_cancel = consumer_cancel.clone();
        let join =
            tokio::spawn(async move { manager.consume(subscription, task_cancel).await });

        tracing::info!(
            source_id = %self.source_id,
            create_topic = %self.topics.create,
            delete_topic = %self.topics.delete,
            "Card lifecycle consumer started"
        );

        Ok(ConsumerHandle {
            cancel: consumer_cancel,
            join,
        })
    }

    /// List stored cards in the gateway's order.
    pub async fn list(&self, cancel: &CancellationToken) -> Result<Vec<Card>, CardError> {
        Ok(with_cancel(cancel, self.gateway.list_cards()).await??)
    }

    /// Store a card, replacing any stored card with the same id.
    ///
    /// Short notices succeed without reaching the gateway. Other cards must
    /// pass [`Card::validate`] before they are stored.
    pub async fn upsert(&self, card: &Card, cancel: &CancellationToken) -> Result<(), CardError> {
        if card.is_ephemeral() {
            tracing::debug!(card_id = %card.id, "Short notice not persisted");
            return Ok(());
        }
        card.validate()?;
        with_cancel(cancel, self.gateway.upsert_card(card)).await??;
        Ok(())
    }

    /// Remove a stored card.
    pub async fn delete(&self, id: &str, cancel: &CancellationToken) -> Result<(), CardError> {
        let removed = with_cancel(cancel, self.gateway.delete_card(id)).await??;
        if !removed {
            return Err(CardError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    /// Build the bus event announcing `card`.
    pub fn create_event(&self, card: &Card) -> Result<BusEvent, SchemaError> {
        let external = self.adapter.to_external(card)?;
        let payload = JsonCodec.encode(&external)?;
        Ok(BusEvent::new(self.source_id.as_str(), self.topics.create.as_str())
            .with_payload(payload))
    }

    /// Build the bus event announcing the removal of card `id`.
    pub fn delete_event(&self, id: &str) -> Result<BusEvent, SchemaError> {
        let payload = JsonCodec.encode(&DeleteCardPayload { id: id.to_string() })?;
        Ok(BusEvent::new(self.source_id.as_str(), self.topics.delete.as_str())
            .with_payload(payload))
    }

    // -----------------------------------------------------------------------
    // Startup
    // -----------------------------------------------------------------------

    async fn register_topics(&self, cancel: &CancellationToken) -> Result<(), CardError> {
        for name in self.topics.all() {
            let event_type = EventType::new(self.source_id.as_str(), name.as_str());
            with_cancel(cancel, self.broker.register_event_type(event_type))
                .await?
                .map_err(|e| {
                    CardError::Subscription(format!("failed to register '{name}': {e}"))
                })?;
        }
        Ok(())
    }

    async fn subscribe_with_retry(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Subscription, CardError> {
        let names = self.topics.all();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut delay = self.retry.initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match with_cancel(cancel, self.broker.subscribe(&self.source_id, &names)).await? {
                Ok(subscription) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "Card subscription established after retry");
                    }
                    return Ok(subscription);
                }
                Err(e) if attempt >= max_attempts => {
                    tracing::error!(attempt, error = %e, "Giving up on card subscription");
                    return Err(CardError::Subscription(format!(
                        "gave up after {attempt} attempts: {e}"
                    )));
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Card subscription attempt failed"
                    );
                }
            }

            // Wait before the next attempt, respecting cancellation.
            with_cancel(cancel, tokio::time::sleep(delay)).await?;
            delay = next_delay(delay, &self.retry);
        }
    }

    // -----------------------------------------------------------------------
    // Consumer
    // -----------------------------------------------------------------------

    /// Apply events one at a time, in arrival order, until the subscription
    /// ends or `cancel` fires.
    async fn consume(
        self,
        mut subscription: Subscription,
        cancel: CancellationToken,
    ) -> ConsumerExit {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Card lifecycle consumer cancelled");
                    return ConsumerExit::Cancelled;
                }
                next = subscription.next() => match next {
                    Some(event) => match self.apply_event(&event, &cancel).await {
                        Ok(()) | Err(CardError::Cancelled) => {}
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                event_id = %event.id,
                                event_name = %event.name,
                                "Failed to apply card event"
                            );
                        }
                    },
                    None => {
                        tracing::info!("Card event channel closed, consumer shutting down");
                        return ConsumerExit::ChannelClosed;
                    }
                },
            }
        }
    }

    async fn apply_event(
        &self,
        event: &BusEvent,
        cancel: &CancellationToken,
    ) -> Result<(), CardError> {
        if event.name == self.topics.create {
            let card = self.adapter.card_from_payload(event.payload.clone())?;
            tracing::debug!(
                card_id = %card.id,
                event_id = %event.id,
                "Applying card create event"
            );
            self.upsert(&card, cancel).await
        } else if event.name == self.topics.delete {
            let DeleteCardPayload { id } =
                JsonCodec.decode::<DeleteCardPayload>(event.payload.clone())?;
            tracing::debug!(card_id = %id, event_id = %event.id, "Applying card delete event");
            self.delete(&id, cancel).await
        } else {
            tracing::debug!(event_name = %event.name, "Ignoring unrelated event");
            Ok(())
        }
    }
}

/// Run `fut` unless `cancel` fires first.
async fn with_cancel<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, CardError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CardError::Cancelled),
        output = fut => Ok(output),
    }
}
