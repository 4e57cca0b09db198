//! Integration tests for the `/cards` and `/events` endpoints.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use cardbus_core::card::{Card, CardBody, CardType, ListItem};
use cardbus_core::gateway::CardGateway;
use cardbus_events::ConsumerExit;
use common::{body_json, build_test_app, delete, get, post_json, put_json};
use serde_json::json;

fn backup_task() -> Card {
    Card::new("1", CardType::Task, CardBody::task())
        .with_task_content("", "Backup")
        .with_progress("45%", 45)
}

fn backup_task_json() -> serde_json::Value {
    json!({
        "id": "1",
        "cardType": "task",
        "renderType": "task",
        "content": {
            "titleIcon": "",
            "titleText": "Backup",
            "bodyProgress": { "label": "45%", "progress": 45 }
        }
    })
}

// ---------------------------------------------------------------------------
// Test: GET /health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok_without_database() {
    let app = build_test_app(Vec::new()).await;
    let response = get(app.router, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json["db_healthy"].is_null());
}

// ---------------------------------------------------------------------------
// Test: GET /api/v1/cards
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_returns_external_cards_in_order() {
    let apps = Card::new(
        "apps",
        CardType::LongNotice,
        CardBody::list([ListItem::new("a.svg", "App A", "v2")]),
    );
    let app = build_test_app(vec![backup_task(), apps]).await;

    let response = get(app.router, "/api/v1/cards").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let cards = json["data"].as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0], backup_task_json());
    assert_eq!(cards[1]["renderType"], "list-notice");
    assert_eq!(cards[1]["content"]["bodyList"][0]["rightText"], "v2");
}

// ---------------------------------------------------------------------------
// Test: PUT /api/v1/cards
// ---------------------------------------------------------------------------

#[tokio::test]
async fn put_stores_task_card() {
    let app = build_test_app(Vec::new()).await;

    let response = put_json(app.router.clone(), "/api/v1/cards", backup_task_json()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(app.gateway.list_cards().await.unwrap(), vec![backup_task()]);
}

#[tokio::test]
async fn put_short_notice_is_accepted_but_not_stored() {
    let app = build_test_app(Vec::new()).await;

    let body = json!({
        "id": "2",
        "cardType": "short-notice",
        "renderType": "markdown-notice",
        "content": { "titleText": "Saved" }
    });
    let response = put_json(app.router, "/api/v1/cards", body).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.gateway.list_cards().await.unwrap().is_empty());
}

#[tokio::test]
async fn put_with_unknown_render_type_is_bad_request() {
    let app = build_test_app(Vec::new()).await;

    let mut body = backup_task_json();
    body["renderType"] = json!("hologram");
    let response = put_json(app.router, "/api/v1/cards", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SCHEMA_ERROR");
}

#[tokio::test]
async fn put_with_progress_over_100_is_rejected_and_not_stored() {
    let app = build_test_app(Vec::new()).await;

    let mut body = backup_task_json();
    body["content"]["bodyProgress"]["progress"] = json!(150);
    let response = put_json(app.router.clone(), "/api/v1/cards", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let listed = body_json(get(app.router, "/api/v1/cards").await).await;
    assert_eq!(listed["data"], json!([]));
}

#[tokio::test]
async fn put_with_mismatched_body_is_bad_request() {
    let app = build_test_app(Vec::new()).await;

    let mut body = backup_task_json();
    body["content"]["bodyList"] = json!([{ "description": "stray" }]);
    let response = put_json(app.router, "/api/v1/cards", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: DELETE /api/v1/cards/{id}
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_existing_card_returns_204() {
    let app = build_test_app(vec![backup_task()]).await;

    let response = delete(app.router, "/api/v1/cards/1").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.gateway.list_cards().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_missing_card_returns_404() {
    let app = build_test_app(Vec::new()).await;

    let response = delete(app.router, "/api/v1/cards/missing-id").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Card with id missing-id not found");
}

// ---------------------------------------------------------------------------
// Test: POST /api/v1/events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn published_create_event_is_stored_by_consumer() {
    let app = build_test_app(Vec::new()).await;

    let response = post_json(
        app.router,
        "/api/v1/events",
        json!({
            "sourceId": "cardbus",
            "name": "cardbus:card:create",
            "payload": backup_task_json(),
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "cardbus:card:create");

    app.event_bus.close();
    let exit = tokio::time::timeout(Duration::from_secs(2), app.consumer.wait())
        .await
        .unwrap();
    assert_eq!(exit, ConsumerExit::ChannelClosed);
    assert_eq!(app.gateway.list_cards().await.unwrap(), vec![backup_task()]);
}

#[tokio::test]
async fn unregistered_event_type_is_bad_request() {
    let app = build_test_app(Vec::new()).await;

    let response = post_json(
        app.router,
        "/api/v1/events",
        json!({ "sourceId": "cardbus", "name": "cardbus:card:archive" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNKNOWN_EVENT_TYPE");
}

#[tokio::test]
async fn event_types_lists_card_topics() {
    let app = build_test_app(Vec::new()).await;

    let json = body_json(get(app.router, "/api/v1/events/types").await).await;
    let names: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["cardbus:card:create", "cardbus:card:delete"]);
}

// ---------------------------------------------------------------------------
// Test: shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn requests_after_shutdown_are_unavailable() {
    let app = build_test_app(vec![backup_task()]).await;
    app.shutdown.cancel();

    let response = get(app.router, "/api/v1/cards").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(app.consumer.wait().await, ConsumerExit::Cancelled);
}
