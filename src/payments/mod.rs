//! Payment gateway adapter.
//!
//! Validates line items locally, then delegates order lifecycle to the
//! external provider behind the [`PaymentProvider`] trait. Authoritative
//! order state lives with the provider; this component only carries what
//! a response needs.

pub mod handlers;
mod provider;

pub use provider::{PayPalClient, PaymentProvider, ProviderError};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_CURRENCY: &str = "SGD";

/// A validated line item in provider wire format (two-decimal price).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Order lifecycle as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    Created,
    Approved,
    Executed,
    Failed,
}

impl OrderState {
    pub fn from_provider(state: &str) -> Self {
        match state {
            "created" => OrderState::Created,
            "approved" => OrderState::Approved,
            "completed" | "executed" => OrderState::Executed,
            _ => OrderState::Failed,
        }
    }

    /// Executing a finalized order must not issue a second charge.
    pub fn is_finalized(&self) -> bool {
        matches!(self, OrderState::Approved | OrderState::Executed)
    }
}

/// Provider-side view of an order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: String,
    pub state: OrderState,
    pub items: Vec<LineItem>,
    pub total: String,
    pub currency: String,
}

/// Result of creating an order: where to send the payer for approval.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub payment_id: String,
    pub approval_url: String,
}

/// Raw item as submitted by callers. Prices arrive as strings or
/// numbers depending on the client.
#[derive(Debug, Deserialize)]
pub struct NewOrderItem {
    #[serde(default = "default_item_name")]
    pub name: String,
    #[serde(default)]
    pub price: PriceField,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    Number(f64),
    Text(String),
}

impl Default for PriceField {
    fn default() -> Self {
        PriceField::Number(0.0)
    }
}

fn default_item_name() -> String {
    "Item".to_string()
}

fn default_quantity() -> i64 {
    1
}

impl NewOrderItem {
    /// Validate and convert to wire format, returning the line total
    /// alongside so the handler can compute the order total.
    pub fn normalize(&self) -> Result<(LineItem, f64), AppError> {
        let price = match &self.price {
            PriceField::Number(n) => *n,
            PriceField::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::Validation(format!("Invalid item format: {}", self.name)))?,
        };

        if !price.is_finite() || price < 0.0 || self.quantity <= 0 {
            return Err(AppError::Validation(format!(
                "Invalid item format: {}",
                self.name
            )));
        }

        let quantity = u32::try_from(self.quantity)
            .map_err(|_| AppError::Validation(format!("Invalid item format: {}", self.name)))?;

        let item = LineItem {
            name: self.name.clone(),
            price: format!("{:.2}", price),
            quantity,
            currency: DEFAULT_CURRENCY.to_string(),
            description: self.description.clone(),
        };

        Ok((item, price * quantity as f64))
    }
}
