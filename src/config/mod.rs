mod settings;

pub use settings::{
    AuthConfig, BrokerConfig, DatabaseConfig, MailgunConfig, PayPalConfig, ServerConfig, Settings,
};
