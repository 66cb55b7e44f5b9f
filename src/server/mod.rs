mod app;
mod state;

pub use app::create_app;
pub use state::AppState;

#[cfg(test)]
pub mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::config::Settings;
    use crate::payments::{CreatedOrder, LineItem, Order, PaymentProvider, ProviderError};
    use crate::users::MemoryUserStore;

    use super::AppState;

    /// Provider stub for tests that never touch payments.
    pub struct NoopProvider;

    #[async_trait]
    impl PaymentProvider for NoopProvider {
        async fn create_order(
            &self,
            _items: &[LineItem],
            _total: &str,
            _currency: &str,
        ) -> Result<CreatedOrder, ProviderError> {
            Err(ProviderError::Decode(
                "provider not wired in this test".to_string(),
            ))
        }

        async fn find_order(&self, _payment_id: &str) -> Result<Option<Order>, ProviderError> {
            Ok(None)
        }

        async fn execute_order(
            &self,
            payment_id: &str,
            _payer_id: &str,
        ) -> Result<Order, ProviderError> {
            Err(ProviderError::NotFound(payment_id.to_string()))
        }
    }

    pub fn test_state() -> AppState {
        state_with_provider(Arc::new(NoopProvider))
    }

    pub fn state_with_provider(payments: Arc<dyn PaymentProvider>) -> AppState {
        AppState::new(
            Settings::default(),
            Arc::new(MemoryUserStore::new()),
            payments,
        )
    }
}
