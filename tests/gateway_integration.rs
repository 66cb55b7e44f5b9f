//! Integration tests for the HTTP-facing components wired together:
//! in-memory credential store, real PayPal client against a mocked
//! provider.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use commerce_services::config::{PayPalConfig, Settings};
use commerce_services::payments::handlers::{
    create_payment, execute_payment, items_bought, CreateOrderRequest, ExecuteOrderRequest,
};
use commerce_services::payments::{OrderState, PayPalClient};
use commerce_services::server::AppState;
use commerce_services::users::handlers::{authenticate, create_user};
use commerce_services::users::{AuthRequest, CreateUserRequest, MemoryUserStore};

fn state_for(server: &MockServer) -> AppState {
    let paypal = PayPalConfig {
        client_id: "client".to_string(),
        secret: "secret".to_string(),
        base_url: server.uri(),
        ..Default::default()
    };

    AppState::new(
        Settings::default(),
        Arc::new(MemoryUserStore::new()),
        Arc::new(PayPalClient::new(paypal)),
    )
}

async fn mock_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn checkout_flow_creates_order_with_computed_total() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/payments/payment"))
        .and(body_partial_json(json!({
            "transactions": [{"amount": {"total": "20.00", "currency": "SGD"}}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "PAY-777",
            "state": "created",
            "links": [
                {"href": "https://provider/approve", "rel": "approval_url", "method": "REDIRECT"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let request: CreateOrderRequest = serde_json::from_value(json!({
        "items": [{"name": "Widget", "price": "10.00", "quantity": 2}]
    }))
    .unwrap();

    let response = create_payment(State(state), Json(request)).await.unwrap();
    assert_eq!(response.0.payment_id, "PAY-777");
    assert_eq!(response.0.approval_url, "https://provider/approve");
}

#[tokio::test]
async fn items_bought_returns_sanitized_items() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/payments/payment/PAY-777"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "PAY-777",
            "state": "approved",
            "transactions": [{
                "amount": {"total": "20.00", "currency": "SGD"},
                "item_list": {"items": [
                    {"name": "Widget", "price": "10.00", "quantity": "2", "currency": "SGD"}
                ]}
            }]
        })))
        .mount(&server)
        .await;

    let state = state_for(&server);
    let response = items_bought(State(state), Path("PAY-777".to_string()))
        .await
        .unwrap();

    assert_eq!(response.0.items.len(), 1);
    assert_eq!(response.0.items[0].name, "Widget");
    assert_eq!(response.0.items[0].quantity, 2);
}

#[tokio::test]
async fn executing_an_approved_order_twice_charges_nothing() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/payments/payment/PAY-777"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "PAY-777",
            "state": "approved",
            "transactions": [{"amount": {"total": "20.00", "currency": "SGD"}}]
        })))
        .mount(&server)
        .await;

    // The execute endpoint must never be hit.
    Mock::given(method("POST"))
        .and(path("/v1/payments/payment/PAY-777/execute"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server);

    for _ in 0..2 {
        let response = execute_payment(
            State(state.clone()),
            Json(ExecuteOrderRequest {
                payment_id: "PAY-777".to_string(),
                payer_id: "PAYER-1".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0.status, "already_approved");
        assert_eq!(response.0.state, OrderState::Approved);
    }
}

#[tokio::test]
async fn registration_and_login_roundtrip() {
    let server = MockServer::start().await;
    let state = state_for(&server);

    let (status, created) = create_user(
        State(state.clone()),
        Path("acme-corp".to_string()),
        Json(CreateUserRequest {
            password: "Str0ng!pass".to_string(),
            company_name: "Acme Pte Ltd".to_string(),
            email: "billing@acme.com".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, axum::http::StatusCode::CREATED);
    assert_eq!(created.0.username, "acme-corp");

    let response = authenticate(
        State(state.clone()),
        Path("acme-corp".to_string()),
        Json(AuthRequest {
            password: "Str0ng!pass".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(response.0.company_name, "Acme Pte Ltd");
    let claims = state.jwt.validate(&response.0.token).unwrap();
    assert_eq!(claims.username(), "acme-corp");
}
