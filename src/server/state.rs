use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::config::Settings;
use crate::payments::PaymentProvider;
use crate::users::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub users: Arc<dyn UserStore>,
    pub payments: Arc<dyn PaymentProvider>,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        users: Arc<dyn UserStore>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        let jwt = Arc::new(JwtKeys::new(&settings.auth));

        Self {
            settings: Arc::new(settings),
            users,
            payments,
            jwt,
        }
    }
}
