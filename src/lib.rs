// Infrastructure layer (shared components)
pub mod config;
pub mod error;
pub mod metrics;

// Domain layer (business logic)
pub mod auth;
pub mod notifier;
pub mod payments;
pub mod users;

// Application layer
pub mod api;
pub mod server;
