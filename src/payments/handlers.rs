//! HTTP handlers for the payment gateway adapter.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::metrics::{ORDERS_CREATED_TOTAL, ORDERS_EXECUTED_TOTAL};
use crate::server::AppState;

use super::{LineItem, NewOrderItem, OrderState, DEFAULT_CURRENCY};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub payment_id: String,
    pub approval_url: String,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<LineItem>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteOrderRequest {
    #[serde(rename = "paymentId")]
    pub payment_id: String,
    #[serde(rename = "PayerID")]
    pub payer_id: String,
}

#[derive(Debug, Serialize)]
pub struct ExecuteOrderResponse {
    pub status: String,
    pub payment_id: String,
    pub state: OrderState,
    pub total: String,
    pub currency: String,
}

/// POST /payment/create
pub async fn create_payment(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>> {
    if body.items.is_empty() {
        return Err(AppError::Validation("Invalid request format".to_string()));
    }

    let mut items = Vec::with_capacity(body.items.len());
    let mut total = 0.0;
    for raw in &body.items {
        let (item, line_total) = raw.normalize()?;
        total += line_total;
        items.push(item);
    }

    if total <= 0.0 {
        return Err(AppError::Validation(
            "Total amount must be greater than zero".to_string(),
        ));
    }

    let total = format!("{:.2}", total);
    let created = state
        .payments
        .create_order(&items, &total, DEFAULT_CURRENCY)
        .await?;

    ORDERS_CREATED_TOTAL.inc();
    tracing::info!(
        payment_id = %created.payment_id,
        total = %total,
        items = items.len(),
        "Payment created"
    );

    Ok(Json(CreateOrderResponse {
        payment_id: created.payment_id,
        approval_url: created.approval_url,
    }))
}

/// GET /itemsBought/{payment_id}
pub async fn items_bought(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<ItemsResponse>> {
    let order = state
        .payments
        .find_order(&payment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

    Ok(Json(ItemsResponse { items: order.items }))
}

/// POST /payment/execute
///
/// Idempotent with respect to finalized orders: an order the provider
/// already reports as approved or executed is returned as-is, without a
/// second execute call.
pub async fn execute_payment(
    State(state): State<AppState>,
    Json(body): Json<ExecuteOrderRequest>,
) -> Result<Json<ExecuteOrderResponse>> {
    if body.payment_id.is_empty() || body.payer_id.is_empty() {
        return Err(AppError::Validation(
            "Missing paymentId or PayerID".to_string(),
        ));
    }

    let order = state
        .payments
        .find_order(&body.payment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

    if order.state.is_finalized() {
        tracing::info!(payment_id = %order.id, state = ?order.state, "Execute skipped, order already finalized");
        return Ok(Json(ExecuteOrderResponse {
            status: "already_approved".to_string(),
            payment_id: order.id,
            state: order.state,
            total: order.total,
            currency: order.currency,
        }));
    }

    let executed = state
        .payments
        .execute_order(&body.payment_id, &body.payer_id)
        .await?;

    ORDERS_EXECUTED_TOTAL.inc();
    tracing::info!(payment_id = %executed.id, state = ?executed.state, "Payment executed");

    Ok(Json(ExecuteOrderResponse {
        status: "success".to_string(),
        payment_id: executed.id,
        state: executed.state,
        total: executed.total,
        currency: executed.currency,
    }))
}
