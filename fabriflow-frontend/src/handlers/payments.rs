//! HTMX endpoints behind the multi-invoice payment dialog.
//!
//! The dialog lives in the session under [`DIALOG_KEY`] from open to close.
//! Every mutation re-renders the whole dialog fragment.

use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Form, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;
use tower_sessions::Session;

use super::{call_context, AlertTemplate};
use crate::models::money::format_money;
use crate::models::AuthUser;
use crate::payments::{self, Attachment, PaymentDialog, PaymentMethod, Reconciliation, SubmitOutcome};
use crate::services::metrics::record_payment_submission;
use crate::AppState;

pub const DIALOG_KEY: &str = "payment_dialog";

pub const SUBMITTED_MESSAGE: &str = "Pago registrado correctamente";
pub const INCOMPLETE_MESSAGE: &str =
    "Completa la selección, el monto, el método, la referencia y asigna el monto total antes de enviar";

pub struct DialogRow {
    pub uuid: String,
    pub folio: String,
    pub company: String,
    pub issuer_name: String,
    pub total: String,
    pub selected: bool,
    pub allocation: String,
}

pub struct MethodOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "partials/payment_dialog.html")]
pub struct PaymentDialogTemplate {
    pub rows: Vec<DialogRow>,
    pub search_term: String,
    pub all_selected: bool,
    pub selected_count: usize,
    pub payment_amount: String,
    pub methods: Vec<MethodOption>,
    pub payment_reference: String,
    pub attachment_name: Option<String>,
    pub selected_total: String,
    pub total_allocated: String,
    pub remaining: String,
    pub settled: bool,
    pub valid: bool,
    pub message: Option<String>,
}

impl PaymentDialogTemplate {
    pub fn from_dialog(dialog: &PaymentDialog, message: Option<String>) -> Self {
        let reconciliation = dialog.reconciliation();
        let rows = dialog
            .visible_invoices()
            .into_iter()
            .map(|invoice| {
                let selected = dialog.selection().contains(&invoice.uuid);
                DialogRow {
                    uuid: invoice.uuid.clone(),
                    folio: invoice.folio.clone(),
                    company: invoice.company.clone(),
                    issuer_name: invoice.issuer_name.clone(),
                    total: invoice.formatted_total(),
                    selected,
                    allocation: dialog
                        .allocations()
                        .get(&invoice.uuid)
                        .map(|amount| amount.to_string())
                        .unwrap_or_default(),
                }
            })
            .collect();

        let methods = PaymentMethod::ALL
            .iter()
            .map(|method| MethodOption {
                value: method.as_str(),
                label: method.label(),
                selected: dialog.payment_method() == Some(*method),
            })
            .collect();

        Self {
            rows,
            search_term: dialog.search_term().to_string(),
            all_selected: dialog.all_visible_selected(),
            selected_count: dialog.selection().len(),
            payment_amount: dialog
                .payment_amount()
                .map(|amount| amount.to_string())
                .unwrap_or_default(),
            methods,
            payment_reference: dialog.payment_reference().to_string(),
            attachment_name: dialog.attachment().map(|file| file.file_name.clone()),
            selected_total: format_money(reconciliation.selected_total),
            total_allocated: format_money(reconciliation.total_allocated),
            remaining: format_money(reconciliation.remaining),
            settled: reconciliation.is_settled(),
            valid: dialog.is_valid(),
            message,
        }
    }
}

/// JSON read-out of the dialog's reconciliation figures.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogSummary {
    #[serde(flatten)]
    pub reconciliation: Reconciliation,
    pub selected_invoice_ids: Vec<String>,
    pub allocations: std::collections::BTreeMap<String, Decimal>,
    pub is_valid: bool,
}

#[derive(Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search: String,
}

#[derive(Deserialize)]
pub struct ToggleForm {
    pub id: String,
}

#[derive(Deserialize)]
pub struct SelectAllForm {
    /// Present (as `on`) only when the header checkbox is checked.
    #[serde(default)]
    pub checked: Option<String>,
}

#[derive(Deserialize)]
pub struct DetailsForm {
    #[serde(default)]
    pub payment_amount: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub payment_reference: String,
}

#[derive(Deserialize)]
pub struct AllocationForm {
    pub id: String,
    #[serde(default)]
    pub amount: String,
}

async fn load_dialog(session: &Session) -> Result<PaymentDialog, AppError> {
    session
        .get::<PaymentDialog>(DIALOG_KEY)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("session read failed: {e}")))?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("El diálogo de pago no está abierto")))
}

async fn store_dialog(session: &Session, dialog: &PaymentDialog) -> Result<(), AppError> {
    session
        .insert(DIALOG_KEY, dialog)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("session write failed: {e}")))
}

async fn discard_dialog(session: &Session) -> Result<(), AppError> {
    session
        .remove::<PaymentDialog>(DIALOG_KEY)
        .await
        .map(|_| ())
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("session write failed: {e}")))
}

/// Loads the open dialog, applies `change` and renders the result.
async fn update_dialog<F>(session: &Session, change: F) -> Result<PaymentDialogTemplate, AppError>
where
    F: FnOnce(&mut PaymentDialog),
{
    let mut dialog = load_dialog(session).await?;
    change(&mut dialog);
    store_dialog(session, &dialog).await?;
    Ok(PaymentDialogTemplate::from_dialog(&dialog, None))
}

pub async fn open_dialog(
    State(state): State<AppState>,
    auth_user: AuthUser,
    request_id: Option<Extension<RequestId>>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let ctx = call_context(&auth_user, request_id);
    let invoices = state.invoices.invoices(&ctx).await?;

    let dialog = PaymentDialog::open(&invoices);
    store_dialog(&session, &dialog).await?;

    tracing::debug!(eligible = dialog.invoices().len(), "Payment dialog opened");
    Ok(PaymentDialogTemplate::from_dialog(&dialog, None))
}

pub async fn search(
    session: Session,
    Form(form): Form<SearchForm>,
) -> Result<impl IntoResponse, AppError> {
    update_dialog(&session, |dialog| dialog.set_search(&form.search)).await
}

pub async fn toggle(
    session: Session,
    Form(form): Form<ToggleForm>,
) -> Result<impl IntoResponse, AppError> {
    update_dialog(&session, |dialog| {
        if !dialog.toggle(&form.id) {
            tracing::debug!(invoice = %form.id, "Ignoring toggle for unknown invoice");
        }
    })
    .await
}

pub async fn select_all(
    session: Session,
    Form(form): Form<SelectAllForm>,
) -> Result<impl IntoResponse, AppError> {
    update_dialog(&session, |dialog| dialog.set_all_visible(form.checked.is_some())).await
}

pub async fn clear(session: Session) -> Result<impl IntoResponse, AppError> {
    update_dialog(&session, PaymentDialog::clear_selection).await
}

pub async fn details(
    session: Session,
    Form(form): Form<DetailsForm>,
) -> Result<impl IntoResponse, AppError> {
    update_dialog(&session, |dialog| {
        dialog.set_payment_amount(&form.payment_amount);
        dialog.set_payment_method(&form.payment_method);
        dialog.set_payment_reference(&form.payment_reference);
    })
    .await
}

pub async fn allocation(
    session: Session,
    Form(form): Form<AllocationForm>,
) -> Result<impl IntoResponse, AppError> {
    update_dialog(&session, |dialog| {
        dialog.set_allocation(&form.id, &form.amount);
    })
    .await
}

pub async fn auto_allocate(session: Session) -> Result<impl IntoResponse, AppError> {
    update_dialog(&session, |dialog| {
        dialog.auto_allocate();
    })
    .await
}

pub async fn attachment(
    session: Session,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut dialog = load_dialog(&session).await?;
    let mut attached = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Archivo inválido: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("comprobante").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !Attachment::is_accepted_type(&content_type) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Tipo de archivo no soportado: {}",
                content_type
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Archivo inválido: {e}")))?;

        attached = Some(Attachment {
            file_name,
            content_type,
            size: bytes.len() as u64,
        });
    }

    dialog.set_attachment(attached);
    store_dialog(&session, &dialog).await?;
    Ok(PaymentDialogTemplate::from_dialog(&dialog, None))
}

pub async fn submit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    request_id: Option<Extension<RequestId>>,
    session: Session,
) -> Result<Response, AppError> {
    let mut dialog = load_dialog(&session).await?;
    let ctx = call_context(&auth_user, request_id);

    let outcome = payments::submit(
        &mut dialog,
        state.payment_sink.as_ref(),
        &ctx,
        state.payments.close_policy,
    )
    .await;
    record_payment_submission(outcome.as_label());

    if outcome.closed() {
        discard_dialog(&session).await?;
        let alert = match &outcome {
            SubmitOutcome::Failed { message, .. } => AlertTemplate::error(message.clone()),
            _ => AlertTemplate::success(SUBMITTED_MESSAGE),
        };
        let mut headers = HeaderMap::new();
        headers.insert("HX-Trigger", HeaderValue::from_static("payment-dialog-closed"));
        return Ok((StatusCode::OK, headers, alert).into_response());
    }

    store_dialog(&session, &dialog).await?;
    let message = match outcome {
        SubmitOutcome::Failed { message, .. } => message,
        _ => INCOMPLETE_MESSAGE.to_string(),
    };
    Ok(PaymentDialogTemplate::from_dialog(&dialog, Some(message)).into_response())
}

pub async fn close(session: Session) -> Result<impl IntoResponse, AppError> {
    discard_dialog(&session).await?;
    Ok(StatusCode::OK)
}

pub async fn summary(session: Session) -> Result<Json<DialogSummary>, AppError> {
    let dialog = load_dialog(&session).await?;

    Ok(Json(DialogSummary {
        reconciliation: dialog.reconciliation(),
        selected_invoice_ids: dialog.selection().ids().to_vec(),
        allocations: dialog.allocations().to_map(),
        is_valid: dialog.is_valid(),
    }))
}
