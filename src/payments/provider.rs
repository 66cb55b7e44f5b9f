//! PayPal REST client behind the `PaymentProvider` trait.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::PayPalConfig;
use crate::error::AppError;

use super::{CreatedOrder, LineItem, Order, OrderState, DEFAULT_CURRENCY};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("payment {0} not found")]
    NotFound(String),

    #[error("malformed provider response: {0}")]
    Decode(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(_) => AppError::NotFound("Payment not found".to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

/// Order lifecycle operations against the external payment provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_order(
        &self,
        items: &[LineItem],
        total: &str,
        currency: &str,
    ) -> Result<CreatedOrder, ProviderError>;

    async fn find_order(&self, payment_id: &str) -> Result<Option<Order>, ProviderError>;

    async fn execute_order(&self, payment_id: &str, payer_id: &str)
        -> Result<Order, ProviderError>;
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Client for the PayPal v1 payments API.
pub struct PayPalClient {
    http: Client,
    config: PayPalConfig,
    base_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl PayPalClient {
    pub fn new(config: PayPalConfig) -> Self {
        let base_url = config.effective_base_url();
        Self {
            http: Client::new(),
            config,
            base_url,
            token: Mutex::new(None),
        }
    }

    /// Fetch (or reuse) a client-credentials access token. Cached until
    /// shortly before provider-reported expiry.
    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }

        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.config.client_id, Some(&self.config.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let token: TokenResponse = response.json().await?;
        let expires_at = Instant::now() + Duration::from_secs(token.expires_in.saturating_sub(30));
        *guard = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }

    fn payment_url(&self, payment_id: &str) -> String {
        format!("{}/v1/payments/payment/{}", self.base_url, payment_id)
    }
}

#[async_trait]
impl PaymentProvider for PayPalClient {
    async fn create_order(
        &self,
        items: &[LineItem],
        total: &str,
        currency: &str,
    ) -> Result<CreatedOrder, ProviderError> {
        let token = self.access_token().await?;

        let request = CreatePaymentRequest {
            intent: "sale".to_string(),
            payer: Payer {
                payment_method: "paypal".to_string(),
            },
            redirect_urls: RedirectUrls {
                return_url: self.config.return_url.clone(),
                cancel_url: self.config.cancel_url.clone(),
            },
            transactions: vec![TransactionRequest {
                item_list: ItemListRequest {
                    items: items.to_vec(),
                },
                amount: AmountRequest {
                    total: total.to_string(),
                    currency: currency.to_string(),
                    details: AmountDetails {
                        subtotal: total.to_string(),
                    },
                },
                description: "Payment for products/services".to_string(),
            }],
        };

        let response = self
            .http
            .post(format!("{}/v1/payments/payment", self.base_url))
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let payment: PaymentResource = response.json().await?;
        let approval_url = payment
            .links
            .iter()
            .find(|link| link.method.as_deref() == Some("REDIRECT"))
            .map(|link| link.href.clone())
            .ok_or_else(|| {
                ProviderError::Decode("no redirect link in create response".to_string())
            })?;

        Ok(CreatedOrder {
            payment_id: payment.id,
            approval_url,
        })
    }

    async fn find_order(&self, payment_id: &str) -> Result<Option<Order>, ProviderError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(self.payment_url(payment_id))
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let payment: PaymentResource = response.json().await?;
        Ok(Some(payment.into_order()))
    }

    async fn execute_order(
        &self,
        payment_id: &str,
        payer_id: &str,
    ) -> Result<Order, ProviderError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(format!("{}/execute", self.payment_url(payment_id)))
            .bearer_auth(&token)
            .json(&ExecuteRequest {
                payer_id: payer_id.to_string(),
            })
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(payment_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let payment: PaymentResource = response.json().await?;
        Ok(payment.into_order())
    }
}

/// Capture status and a bounded slice of the body for the server-side log.
async fn api_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let mut detail = response.text().await.unwrap_or_default();
    detail.truncate(300);
    ProviderError::Api { status, detail }
}

// Wire types for the PayPal v1 payments API.

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Serialize)]
struct CreatePaymentRequest {
    intent: String,
    payer: Payer,
    redirect_urls: RedirectUrls,
    transactions: Vec<TransactionRequest>,
}

#[derive(Debug, Serialize)]
struct Payer {
    payment_method: String,
}

#[derive(Debug, Serialize)]
struct RedirectUrls {
    return_url: String,
    cancel_url: String,
}

#[derive(Debug, Serialize)]
struct TransactionRequest {
    item_list: ItemListRequest,
    amount: AmountRequest,
    description: String,
}

#[derive(Debug, Serialize)]
struct ItemListRequest {
    items: Vec<LineItem>,
}

#[derive(Debug, Serialize)]
struct AmountRequest {
    total: String,
    currency: String,
    details: AmountDetails,
}

#[derive(Debug, Serialize)]
struct AmountDetails {
    subtotal: String,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest {
    payer_id: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResource {
    id: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    transactions: Vec<TransactionResource>,
    #[serde(default)]
    links: Vec<LinkResource>,
}

#[derive(Debug, Deserialize)]
struct TransactionResource {
    #[serde(default)]
    amount: Option<AmountResource>,
    #[serde(default)]
    item_list: Option<ItemListResource>,
}

#[derive(Debug, Deserialize)]
struct AmountResource {
    total: String,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct ItemListResource {
    #[serde(default)]
    items: Vec<ItemResource>,
}

/// The provider is loose about item fields; sanitize with defaults.
#[derive(Debug, Deserialize)]
struct ItemResource {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    quantity: Option<serde_json::Value>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkResource {
    href: String,
    #[serde(default)]
    method: Option<String>,
}

impl PaymentResource {
    fn into_order(self) -> Order {
        let state = OrderState::from_provider(&self.state);

        let (total, currency) = self
            .transactions
            .first()
            .and_then(|t| t.amount.as_ref())
            .map(|a| (a.total.clone(), a.currency.clone()))
            .unwrap_or_else(|| ("0.00".to_string(), DEFAULT_CURRENCY.to_string()));

        let items = self
            .transactions
            .into_iter()
            .filter_map(|t| t.item_list)
            .flat_map(|list| list.items)
            .map(ItemResource::sanitize)
            .collect();

        Order {
            id: self.id,
            state,
            items,
            total,
            currency,
        }
    }
}

impl ItemResource {
    fn sanitize(self) -> LineItem {
        let quantity = match self.quantity {
            Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(1) as u32,
            Some(serde_json::Value::String(s)) => s.parse().unwrap_or(1),
            _ => 1,
        };

        LineItem {
            name: self.name.unwrap_or_default(),
            price: self.price.unwrap_or_else(|| "0.00".to_string()),
            quantity,
            currency: self.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            description: self.description,
        }
    }
}
