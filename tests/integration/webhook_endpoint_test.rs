//! Endpoint tests for the Lemon Squeezy webhook routes.
//!
//! Drives the full router with an in-process analytics sink.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use common::{
    app_with_sink, body_string, sign, signed_post, test_config, FailingSink, HangingSink,
    RecordingSink, UnconfiguredSink, ORDER_CREATED_BODY, SECRET,
};

const WEBHOOK_URI: &str = "/webhooks/lemon-squeezy";

#[tokio::test]
async fn test_non_post_methods_are_rejected() {
    for method in ["GET", "PUT", "PATCH", "DELETE"] {
        let sink = Arc::new(RecordingSink::default());
        let app = app_with_sink(test_config(Some(SECRET), &[]), sink.clone());

        let request = Request::builder()
            .method(method)
            .uri(WEBHOOK_URI)
            .header("X-Signature", sign(ORDER_CREATED_BODY.as_bytes()))
            .body(Body::from(ORDER_CREATED_BODY))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        assert_eq!(body_string(response).await, "Method not allowed");
        assert!(sink.requests().is_empty());
    }
}

#[tokio::test]
async fn test_missing_signature_is_unauthorized() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with_sink(test_config(Some(SECRET), &[]), sink.clone());

    // Not even JSON: parsing must never be reached
    let request = Request::builder()
        .method("POST")
        .uri(WEBHOOK_URI)
        .body(Body::from("{definitely not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_string(response).await, "Missing signature");
    assert!(sink.requests().is_empty());
}

#[tokio::test]
async fn test_missing_secret_is_server_error() {
    let app = app_with_sink(test_config(None, &[]), Arc::new(RecordingSink::default()));

    let response = app
        .oneshot(signed_post(WEBHOOK_URI, ORDER_CREATED_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_string(response).await, "Server configuration error");
}

#[tokio::test]
async fn test_wrong_signature_is_unauthorized() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with_sink(test_config(Some(SECRET), &[]), sink.clone());

    let request = Request::builder()
        .method("POST")
        .uri(WEBHOOK_URI)
        .header("X-Signature", "0".repeat(64))
        .body(Body::from(ORDER_CREATED_BODY))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_string(response).await, "Invalid signature");
    assert!(sink.requests().is_empty());
}

#[tokio::test]
async fn test_single_byte_change_invalidates_signature() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with_sink(test_config(Some(SECRET), &[]), sink.clone());

    let signature = sign(ORDER_CREATED_BODY.as_bytes());
    let tampered = ORDER_CREATED_BODY.replace("Alice", "Alicf");

    let request = Request::builder()
        .method("POST")
        .uri(WEBHOOK_URI)
        .header("X-Signature", signature)
        .body(Body::from(tampered))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_string(response).await, "Invalid signature");
    assert!(sink.requests().is_empty());
}

#[tokio::test]
async fn test_signature_header_name_is_case_insensitive() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with_sink(test_config(Some(SECRET), &[]), sink.clone());

    let request = Request::builder()
        .method("POST")
        .uri(WEBHOOK_URI)
        .header("x-signature", sign(ORDER_CREATED_BODY.as_bytes()))
        .body(Body::from(ORDER_CREATED_BODY))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sink.requests().len(), 1);
}

#[tokio::test]
async fn test_signed_malformed_json_is_bad_request() {
    let app = app_with_sink(
        test_config(Some(SECRET), &[]),
        Arc::new(RecordingSink::default()),
    );

    let response = app
        .oneshot(signed_post(WEBHOOK_URI, r#"{"meta":{"event_name":"order_created""#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Invalid JSON");
}

#[tokio::test]
async fn test_missing_event_name_is_bad_request() {
    let app = app_with_sink(
        test_config(Some(SECRET), &[]),
        Arc::new(RecordingSink::default()),
    );

    let response = app
        .oneshot(signed_post(WEBHOOK_URI, r#"{"data":{"attributes":{}}}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Missing event name");
}

#[tokio::test]
async fn test_unrecognized_events_are_acknowledged_without_forward() {
    for event_name in ["order_refunded", "subscription_updated", "license_key_created"] {
        let sink = Arc::new(RecordingSink::default());
        let app = app_with_sink(test_config(Some(SECRET), &[]), sink.clone());
        let body = json!({ "meta": { "event_name": event_name } }).to_string();

        let response = app.oneshot(signed_post(WEBHOOK_URI, &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{}", event_name);
        assert_eq!(body_string(response).await, "OK");
        assert!(sink.requests().is_empty(), "{}", event_name);
    }
}

#[tokio::test]
async fn test_order_created_is_forwarded_once() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with_sink(test_config(Some(SECRET), &[]), sink.clone());

    let response = app
        .oneshot(signed_post(WEBHOOK_URI, ORDER_CREATED_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
    assert_eq!(
        sink.requests(),
        vec![json!({
            "type": "track",
            "payload": {
                "name": "order_created",
                "properties": {
                    "user_name": "Alice",
                    "user_email": "a@x.com",
                    "subtotal_usd": 99
                }
            }
        })]
    );
}

#[tokio::test]
async fn test_subscription_created_is_forwarded_under_mapped_name() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with_sink(test_config(Some(SECRET), &[]), sink.clone());
    let body = json!({
        "meta": { "event_name": "subscription_created" },
        "data": { "attributes": { "user_email": "b@x.com", "subtotal_usd": "49.00" } }
    })
    .to_string();

    let response = app.oneshot(signed_post(WEBHOOK_URI, &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let requests = sink.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["payload"]["name"], "subscription_created_test");
    assert_eq!(
        requests[0]["payload"]["properties"],
        json!({ "user_email": "b@x.com", "subtotal_usd": "49.00" })
    );
}

#[tokio::test]
async fn test_forward_failure_still_returns_ok() {
    let sink = Arc::new(FailingSink::default());
    let app = app_with_sink(test_config(Some(SECRET), &[]), sink.clone());

    let response = app
        .oneshot(signed_post(WEBHOOK_URI, ORDER_CREATED_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
    assert_eq!(sink.attempts(), 1);
}

#[tokio::test]
async fn test_hung_collector_still_returns_ok() {
    let app = app_with_sink(test_config(Some(SECRET), &[]), Arc::new(HangingSink));

    let response = app
        .oneshot(signed_post(WEBHOOK_URI, ORDER_CREATED_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unconfigured_collector_still_returns_ok() {
    let app = app_with_sink(test_config(Some(SECRET), &[]), Arc::new(UnconfiguredSink));

    let response = app
        .oneshot(signed_post(WEBHOOK_URI, ORDER_CREATED_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn test_integration_route_behaves_like_primary_route() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with_sink(test_config(Some(SECRET), &[]), sink.clone());

    let response = app
        .clone()
        .oneshot(signed_post(
            "/api/v1/integrations/lemon-squeezy-webhook/store-42",
            ORDER_CREATED_BODY,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sink.requests().len(), 1);

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/integrations/lemon-squeezy-webhook/store-42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = app_with_sink(
        test_config(Some(SECRET), &[("WEBHOOK_MAX_BODY_BYTES", "64")]),
        Arc::new(RecordingSink::default()),
    );

    let response = app
        .oneshot(signed_post(WEBHOOK_URI, ORDER_CREATED_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_string(response).await, "Payload too large");
}

#[tokio::test]
async fn test_unsigned_oversized_body_is_unauthorized() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with_sink(
        test_config(Some(SECRET), &[("WEBHOOK_MAX_BODY_BYTES", "16")]),
        sink.clone(),
    );

    for signature in [None, Some("")] {
        let mut builder = Request::builder().method("POST").uri(WEBHOOK_URI);
        if let Some(value) = signature {
            builder = builder.header("X-Signature", value);
        }
        let request = builder.body(Body::from(ORDER_CREATED_BODY)).unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{:?}", signature);
        assert_eq!(body_string(response).await, "Missing signature");
    }
    assert!(sink.requests().is_empty());
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = app_with_sink(
        test_config(Some(SECRET), &[]),
        Arc::new(RecordingSink::default()),
    );

    let response = app
        .oneshot(signed_post(WEBHOOK_URI, ORDER_CREATED_BODY))
        .await
        .unwrap();

    assert!(response.headers().contains_key("X-Request-ID"));
}

#[tokio::test]
async fn test_health_reports_configuration() {
    let app = app_with_sink(test_config(Some(SECRET), &[]), Arc::new(UnconfiguredSink));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["environment"], "test");
    assert_eq!(health["webhook_secret_configured"], true);
    assert_eq!(health["analytics_configured"], false);
}

#[tokio::test]
async fn test_health_without_secret_is_unhealthy() {
    let app = app_with_sink(test_config(None, &[]), Arc::new(RecordingSink::default()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let health: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(health["status"], "unhealthy");
}

#[tokio::test]
async fn test_openapi_document_lists_webhook_routes() {
    let app = app_with_sink(
        test_config(Some(SECRET), &[]),
        Arc::new(RecordingSink::default()),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let doc: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(doc["paths"]["/webhooks/lemon-squeezy"]["post"].is_object());
    assert!(doc["paths"]["/api/v1/integrations/lemon-squeezy-webhook/{id}"]["post"].is_object());
}

#[tokio::test]
async fn test_metrics_endpoint_without_recorder_is_empty() {
    let app = app_with_sink(
        test_config(Some(SECRET), &[]),
        Arc::new(RecordingSink::default()),
    );

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}
