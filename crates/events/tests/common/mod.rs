//! Test doubles for the lifecycle collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cardbus_core::card::Card;
use cardbus_core::error::GatewayError;
use cardbus_core::gateway::CardGateway;
use cardbus_db::MemoryCardGateway;
use cardbus_events::{
    BusError, CardLifecycleManager, EventBroker, EventBus, EventType, LifecycleConfig,
    RetryConfig, Subscription,
};

/// Wraps a [`MemoryCardGateway`], counting calls and optionally failing them.
#[derive(Default)]
pub struct RecordingGateway {
    pub inner: MemoryCardGateway,
    pub list_calls: AtomicUsize,
    pub upsert_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fail_with: Option<&'static str>,
}

impl RecordingGateway {
    pub fn failing(message: &'static str) -> Self {
        Self {
            fail_with: Some(message),
            ..Default::default()
        }
    }

    pub fn upserts(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), GatewayError> {
        match self.fail_with {
            Some(message) => Err(GatewayError::new(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CardGateway for RecordingGateway {
    async fn list_cards(&self) -> Result<Vec<Card>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.list_cards().await
    }

    async fn upsert_card(&self, card: &Card) -> Result<(), GatewayError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.upsert_card(card).await
    }

    async fn delete_card(&self, id: &str) -> Result<bool, GatewayError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.delete_card(id).await
    }
}

/// Delegates to an [`EventBus`] but fails the first `fail_first` subscribes.
pub struct FlakyBroker {
    pub bus: Arc<EventBus>,
    pub fail_first: usize,
    pub subscribe_calls: AtomicUsize,
}

impl FlakyBroker {
    pub fn new(bus: Arc<EventBus>, fail_first: usize) -> Self {
        Self {
            bus,
            fail_first,
            subscribe_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EventBroker for FlakyBroker {
    async fn register_event_type(&self, event_type: EventType) -> Result<(), BusError> {
        self.bus.register_event_type(event_type).await
    }

    async fn subscribe(
        &self,
        source_id: &str,
        names: &[String],
    ) -> Result<Subscription, BusError> {
        let call = self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(BusError::Closed);
        }
        self.bus.subscribe(source_id, names).await
    }
}

/// Lifecycle config with millisecond backoff so retry tests stay fast.
pub fn fast_config(max_attempts: u32) -> LifecycleConfig {
    LifecycleConfig {
        service_name: "cardbus".to_string(),
        retry: RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
        },
    }
}

pub fn manager_with(
    bus: Arc<EventBus>,
    gateway: Arc<RecordingGateway>,
) -> CardLifecycleManager {
    CardLifecycleManager::new(bus, gateway, fast_config(3))
}

/// Poll `condition` until it holds, panicking after two seconds.
pub async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 2s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
