use async_trait::async_trait;

use super::api_client::{ApiClient, ApiError, CallContext};
use crate::payments::PaymentBatch;

/// Receives complete payment batches from the dialog.
#[async_trait]
pub trait PaymentSink: Send + Sync {
    async fn submit(&self, batch: &PaymentBatch, ctx: &CallContext) -> Result<(), ApiError>;
}

/// Writes each batch to the log and accepts it.
#[derive(Debug, Default)]
pub struct LoggingPaymentSink;

#[async_trait]
impl PaymentSink for LoggingPaymentSink {
    async fn submit(&self, batch: &PaymentBatch, ctx: &CallContext) -> Result<(), ApiError> {
        let payload = serde_json::to_string(batch).map_err(|e| {
            tracing::error!("Failed to encode payment batch: {}", e);
            ApiError::Unexpected
        })?;

        tracing::info!(
            request_id = ctx.request_id.as_deref().unwrap_or("-"),
            reference = %batch.payment_reference,
            batch = %payload,
            "Payment batch received"
        );
        Ok(())
    }
}

/// Posts batches to the backend with the caller's token.
pub struct ApiPaymentSink {
    api: ApiClient,
    path: String,
}

impl ApiPaymentSink {
    pub fn new(api: ApiClient, path: impl Into<String>) -> Self {
        Self {
            api,
            path: path.into(),
        }
    }
}

#[async_trait]
impl PaymentSink for ApiPaymentSink {
    async fn submit(&self, batch: &PaymentBatch, ctx: &CallContext) -> Result<(), ApiError> {
        if ctx.access_token.is_none() {
            return Err(ApiError::Unauthorized);
        }
        let _: serde_json::Value = self.api.post(&self.path, batch, ctx).await?;
        Ok(())
    }
}
