pub mod api_client;
pub mod auth_client;
pub mod catalog;
pub mod metrics;
pub mod payment_sink;
