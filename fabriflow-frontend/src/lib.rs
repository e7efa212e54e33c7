pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod services;
pub mod startup;

use config::{PaymentSettings, ServerSettings};
use services::{auth_client::AuthService, catalog::InvoiceSource, payment_sink::PaymentSink};
use std::sync::Arc;

/// Shared application state: backend collaborators plus the settings
/// handlers consult per request.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub invoices: Arc<dyn InvoiceSource>,
    pub payment_sink: Arc<dyn PaymentSink>,
    pub server: ServerSettings,
    pub payments: PaymentSettings,
}

impl AppState {
    pub fn new(
        auth: Arc<dyn AuthService>,
        invoices: Arc<dyn InvoiceSource>,
        payment_sink: Arc<dyn PaymentSink>,
        server: ServerSettings,
        payments: PaymentSettings,
    ) -> Self {
        Self {
            auth,
            invoices,
            payment_sink,
            server,
            payments,
        }
    }
}
