#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use cardbus_api::config::ServerConfig;
use cardbus_api::router::build_app_router;
use cardbus_api::state::AppState;
use cardbus_core::card::Card;
use cardbus_core::schema::SchemaAdapter;
use cardbus_db::MemoryCardGateway;
use cardbus_events::{CardLifecycleManager, ConsumerHandle, EventBus, LifecycleConfig};
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults and no database.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: None,
        lifecycle: LifecycleConfig::default(),
    }
}

/// A running application plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub event_bus: Arc<EventBus>,
    pub gateway: Arc<MemoryCardGateway>,
    pub consumer: ConsumerHandle,
    pub shutdown: CancellationToken,
}

/// Build the full application router backed by an in-memory gateway seeded
/// with `cards`, with the card consumer running.
pub async fn build_test_app(cards: Vec<Card>) -> TestApp {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    let gateway = Arc::new(MemoryCardGateway::with_cards(cards));
    let shutdown = CancellationToken::new();

    let manager = CardLifecycleManager::new(
        event_bus.clone(),
        gateway.clone(),
        config.lifecycle.clone(),
    );
    let consumer = manager.start(&shutdown).await.unwrap();

    let state = AppState {
        manager,
        event_bus: Arc::clone(&event_bus),
        adapter: SchemaAdapter::default(),
        pool: None,
        shutdown: shutdown.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        event_bus,
        gateway,
        consumer,
        shutdown,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
