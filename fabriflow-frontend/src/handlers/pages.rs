use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension,
};
use serde::Deserialize;
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;

use super::call_context;
use crate::models::provider::search_providers;
use crate::models::{
    AuthUser, DashboardMetrics, Invoice, ManagedUser, Provider, ReportType, SessionUser,
};
use crate::services::catalog::report_types;
use crate::AppState;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: SessionUser,
    pub current_page: &'static str,
    pub metrics: Option<DashboardMetrics>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "invoices.html")]
pub struct InvoicesTemplate {
    pub user: SessionUser,
    pub current_page: &'static str,
    pub invoices: Vec<Invoice>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "invoice_detail.html")]
pub struct InvoiceDetailTemplate {
    pub user: SessionUser,
    pub current_page: &'static str,
    pub invoice: Invoice,
}

#[derive(Template)]
#[template(path = "providers.html")]
pub struct ProvidersTemplate {
    pub user: SessionUser,
    pub current_page: &'static str,
    pub providers: Vec<Provider>,
    pub search: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub user: SessionUser,
    pub current_page: &'static str,
    pub users: Vec<ManagedUser>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "reports.html")]
pub struct ReportsTemplate {
    pub user: SessionUser,
    pub current_page: &'static str,
    pub reports: Vec<ReportType>,
}

#[derive(Deserialize)]
pub struct ProviderQuery {
    #[serde(default)]
    pub search: String,
}

pub async fn dashboard_handler(
    State(state): State<AppState>,
    auth_user: AuthUser,
    request_id: Option<Extension<RequestId>>,
) -> impl IntoResponse {
    let ctx = call_context(&auth_user, request_id);
    let (metrics, error) = match state.invoices.dashboard_metrics(&ctx).await {
        Ok(metrics) => (Some(metrics), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load dashboard metrics");
            (
                None,
                Some("Error al cargar el panel. Por favor intenta de nuevo más tarde.".to_string()),
            )
        }
    };

    DashboardTemplate {
        user: auth_user.user,
        current_page: "dashboard",
        metrics,
        error,
    }
}

pub async fn invoices_handler(
    State(state): State<AppState>,
    auth_user: AuthUser,
    request_id: Option<Extension<RequestId>>,
) -> impl IntoResponse {
    let ctx = call_context(&auth_user, request_id);
    let (invoices, error) = match state.invoices.invoices(&ctx).await {
        Ok(invoices) => (invoices, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load invoices");
            (
                Vec::new(),
                Some("Error al cargar facturas. Por favor intenta de nuevo más tarde.".to_string()),
            )
        }
    };

    InvoicesTemplate {
        user: auth_user.user,
        current_page: "invoices",
        invoices,
        error,
    }
}

pub async fn invoice_detail_handler(
    State(state): State<AppState>,
    auth_user: AuthUser,
    request_id: Option<Extension<RequestId>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = call_context(&auth_user, request_id);
    let invoice = state
        .invoices
        .invoice(&id, &ctx)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Factura {} no encontrada", id)))?;

    Ok(InvoiceDetailTemplate {
        user: auth_user.user,
        current_page: "invoices",
        invoice,
    })
}

pub async fn providers_handler(
    State(state): State<AppState>,
    auth_user: AuthUser,
    request_id: Option<Extension<RequestId>>,
    Query(query): Query<ProviderQuery>,
) -> impl IntoResponse {
    let ctx = call_context(&auth_user, request_id);
    let (providers, error) = match state.invoices.providers(&ctx).await {
        Ok(providers) => (search_providers(&providers, &query.search), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load providers");
            (
                Vec::new(),
                Some("Error al cargar proveedores. Por favor intenta de nuevo más tarde.".to_string()),
            )
        }
    };

    ProvidersTemplate {
        user: auth_user.user,
        current_page: "providers",
        providers,
        search: query.search,
        error,
    }
}

pub async fn users_handler(
    State(state): State<AppState>,
    auth_user: AuthUser,
    request_id: Option<Extension<RequestId>>,
) -> impl IntoResponse {
    let ctx = call_context(&auth_user, request_id);
    let (users, error) = match state.invoices.users(&ctx).await {
        Ok(users) => (users, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load users");
            (
                Vec::new(),
                Some("Error al cargar usuarios. Por favor intenta de nuevo más tarde.".to_string()),
            )
        }
    };

    UsersTemplate {
        user: auth_user.user,
        current_page: "users",
        users,
        error,
    }
}

pub async fn reports_handler(auth_user: AuthUser) -> impl IntoResponse {
    ReportsTemplate {
        user: auth_user.user,
        current_page: "reports",
        reports: report_types(),
    }
}
