use axum::{
    routing::{get, post},
    Router,
};

use crate::payments::handlers::{create_payment, execute_payment, items_bought};
use crate::server::AppState;
use crate::users::handlers::{authenticate, create_user, list_users};

use super::health::{health, metrics};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & metrics
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        // Credential store
        .route("/User/{username}", post(create_user))
        .route("/User", get(list_users))
        .route("/AUser/{username}", post(authenticate))
        // Payment gateway
        .route("/payment/create", post(create_payment))
        .route("/itemsBought/{payment_id}", get(items_bought))
        .route("/payment/execute", post(execute_payment))
}
