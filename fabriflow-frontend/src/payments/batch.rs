use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::dialog::PaymentDialog;
use crate::services::api_client::CallContext;
use crate::services::payment_sink::PaymentSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Transfer,
    Check,
    Cash,
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Transfer,
        PaymentMethod::Check,
        PaymentMethod::Cash,
        PaymentMethod::Card,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Check => "check",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Transfer => "Transferencia",
            PaymentMethod::Check => "Cheque",
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Card => "Tarjeta",
        }
    }

    /// Parses a form value. Empty or unknown values mean "not chosen".
    pub fn from_form(value: &str) -> Option<Self> {
        match value.trim() {
            "transfer" => Some(PaymentMethod::Transfer),
            "check" => Some(PaymentMethod::Check),
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }
}

/// Proof-of-payment file metadata. The file itself is not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
}

impl Attachment {
    /// PDF or image receipts only.
    pub const ACCEPTED_TYPES: [&'static str; 3] = ["application/pdf", "image/jpeg", "image/png"];

    /// Largest receipt accepted, in bytes.
    pub const MAX_SIZE: usize = 50 * 1024 * 1024;

    pub fn is_accepted_type(content_type: &str) -> bool {
        Self::ACCEPTED_TYPES.contains(&content_type)
    }
}

/// A complete, valid payment ready to hand to the submission sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBatch {
    pub selected_invoice_ids: Vec<String>,
    pub payment_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
    pub allocations: BTreeMap<String, Decimal>,
    pub attachment: Option<Attachment>,
}

/// When the dialog closes after a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClosePolicy {
    /// Close whatever the sink answers.
    #[default]
    Always,
    /// Keep the dialog open, state intact, when the sink reports a failure.
    OnSuccess,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The gate was not satisfied; nothing was sent.
    Invalid,
    Submitted,
    Failed { message: String, closed: bool },
}

impl SubmitOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitOutcome::Invalid => "invalid",
            SubmitOutcome::Submitted => "submitted",
            SubmitOutcome::Failed { .. } => "failed",
        }
    }

    pub fn closed(&self) -> bool {
        match self {
            SubmitOutcome::Invalid => false,
            SubmitOutcome::Submitted => true,
            SubmitOutcome::Failed { closed, .. } => *closed,
        }
    }
}

/// Hands the dialog's batch to `sink` and closes the dialog per `policy`.
pub async fn submit(
    dialog: &mut PaymentDialog,
    sink: &dyn PaymentSink,
    ctx: &CallContext,
    policy: ClosePolicy,
) -> SubmitOutcome {
    let Some(batch) = dialog.batch() else {
        return SubmitOutcome::Invalid;
    };

    match sink.submit(&batch, ctx).await {
        Ok(()) => {
            tracing::info!(
                invoices = batch.selected_invoice_ids.len(),
                amount = %batch.payment_amount,
                method = batch.payment_method.as_str(),
                "Payment batch submitted"
            );
            dialog.reset();
            SubmitOutcome::Submitted
        }
        Err(e) => {
            tracing::error!(error = %e, "Payment batch submission failed");
            let closed = policy == ClosePolicy::Always;
            if closed {
                dialog.reset();
            }
            SubmitOutcome::Failed {
                message: e.to_string(),
                closed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Invoice;
    use crate::services::api_client::ApiError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingSink {
        fail: bool,
        received: Mutex<Vec<PaymentBatch>>,
    }

    impl RecordingSink {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PaymentSink for RecordingSink {
        async fn submit(&self, batch: &PaymentBatch, _ctx: &CallContext) -> Result<(), ApiError> {
            self.received.lock().unwrap().push(batch.clone());
            if self.fail {
                Err(ApiError::ServerUnavailable(503))
            } else {
                Ok(())
            }
        }
    }

    fn ready_dialog() -> PaymentDialog {
        let invoice: Invoice = serde_json::from_value(serde_json::json!({
            "uuid": "INV-002",
            "folio": "A-2024-002",
            "company": "Manufacturera Industrial Mexicana",
            "issuerName": "Aceros y Metales S.A.",
            "invoiceDate": "2024-01-20",
            "total": "150750.50",
            "status": "pending"
        }))
        .unwrap();

        let mut dialog = PaymentDialog::open(&[invoice]);
        dialog.toggle("INV-002");
        dialog.set_payment_amount("150750.50");
        dialog.auto_allocate();
        dialog.set_payment_method("transfer");
        dialog.set_payment_reference("SPEI-8841");
        dialog
    }

    #[tokio::test]
    async fn invalid_dialog_sends_nothing() {
        let sink = RecordingSink::new(false);
        let mut dialog = ready_dialog();
        dialog.set_payment_reference("");

        let outcome = submit(&mut dialog, &sink, &CallContext::default(), ClosePolicy::Always).await;
        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert!(sink.received.lock().unwrap().is_empty());
        assert!(!dialog.selection().is_empty());
    }

    #[tokio::test]
    async fn success_resets_dialog() {
        let sink = RecordingSink::new(false);
        let mut dialog = ready_dialog();

        let outcome = submit(&mut dialog, &sink, &CallContext::default(), ClosePolicy::OnSuccess).await;
        assert_eq!(outcome, SubmitOutcome::Submitted);
        assert!(dialog.is_empty());

        let received = sink.received.lock().unwrap();
        assert_eq!(received[0].payment_reference, "SPEI-8841");
        assert_eq!(received[0].payment_method, PaymentMethod::Transfer);
    }

    #[tokio::test]
    async fn failure_follows_close_policy() {
        let sink = RecordingSink::new(true);

        let mut kept = ready_dialog();
        let outcome = submit(&mut kept, &sink, &CallContext::default(), ClosePolicy::OnSuccess).await;
        assert!(!outcome.closed());
        assert_eq!(kept, ready_dialog());

        let mut closed = ready_dialog();
        let outcome = submit(&mut closed, &sink, &CallContext::default(), ClosePolicy::Always).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                message: "El servidor no está disponible. Intente más tarde.".to_string(),
                closed: true,
            }
        );
        assert!(closed.is_empty());
    }
}
