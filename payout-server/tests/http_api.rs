//! HTTP surface tests: the routers wired to real state, driven with
//! `tower::ServiceExt::oneshot`.

mod common;

use axum::body::Body;
use common::*;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let (state, _) = test_state().await;
    let app = payout_server::routes::build_app(&state).with_state(state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn batch_trigger_rejects_missing_or_wrong_secret() {
    let (state, _) = test_state().await;
    let app = payout_server::routes::build_app(&state).with_state(state.clone());

    // No Authorization header
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/payouts/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong secret
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/payouts/run")
                .header(header::AUTHORIZATION, "Bearer wrong-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn batch_trigger_returns_the_report_contract() {
    let (state, _) = test_state().await;
    let app = payout_server::routes::build_app(&state).with_state(state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/payouts/run")
                .header(header::AUTHORIZATION, "Bearer test-cron-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["results"]["processed"], 0);
    assert_eq!(json["results"]["skipped"], 0);
    assert_eq!(json["results"]["failed"], 0);
    assert!(json["results"]["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn webhook_validation_names_the_offending_field() {
    let (state, _) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;
    let app = payout_server::routes::build_app(&state).with_state(state.clone());

    let payload = serde_json::json!({
        "affiliate_code": "",
        "product_id": product.product_id,
        "customer_email": "buyer@example.com",
        "purchase_amount": 100.0,
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/webhooks/purchase")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("affiliate_code"));
}

#[tokio::test]
async fn webhook_happy_path_returns_purchase_and_commission() {
    let (state, _) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;
    let partnership = seed_approved_partnership(&state, "aff_1", "co_1").await;
    let app = payout_server::routes::build_app(&state).with_state(state.clone());

    let payload = serde_json::json!({
        "affiliate_code": partnership.affiliate_code,
        "product_id": product.product_id,
        "customer_email": "buyer@example.com",
        "purchase_amount": 100.0,
        "external_purchase_id": "ext_http_1",
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/webhooks/purchase")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["commission_amount"], 10.0);
    assert!(json["purchase_id"].as_str().is_some());
}

#[tokio::test]
async fn checkout_rejects_invalid_quantity() {
    let (state, _) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;
    let partnership = seed_approved_partnership(&state, "aff_1", "co_1").await;
    let app = payout_server::routes::build_app(&state).with_state(state.clone());

    let payload = serde_json::json!({
        "product_id": product.product_id,
        "partnership_id": partnership.partnership_id,
        "customer_email": "buyer@example.com",
        "quantity": 0,
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/purchases")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn commission_approval_flows_through_the_api() {
    let (state, _) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;
    let partnership = seed_approved_partnership(&state, "aff_1", "co_1").await;
    let app = payout_server::routes::build_app(&state).with_state(state.clone());

    // Record a purchase so a pending commission exists
    state
        .recorder
        .record_purchase(payout_server::engine::CheckoutRequest {
            product_id: product.product_id.clone(),
            partnership_id: partnership.partnership_id.clone(),
            customer_email: "buyer@example.com".to_string(),
            quantity: 1,
        })
        .await
        .unwrap();
    let pending = state.commissions().list_by_affiliate("aff_1").await.unwrap();
    let id = pending[0].commission_id.clone();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/commissions/{id}/approve"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "approved");
}
