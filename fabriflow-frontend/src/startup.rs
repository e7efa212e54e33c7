use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{
    app::{health_check, index},
    auth::{login_handler, login_page, logout_handler, register_handler, register_page},
    metrics::metrics,
    pages::{
        dashboard_handler, invoice_detail_handler, invoices_handler, providers_handler,
        reports_handler, users_handler,
    },
    payments,
};
use crate::middleware::{auth::auth_middleware, metrics::metrics_middleware};
use crate::payments::Attachment;
use crate::AppState;

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/invoices", get(invoices_handler))
        .route("/invoices/:id", get(invoice_detail_handler))
        .route("/providers", get(providers_handler))
        .route("/users", get(users_handler))
        .route("/reports", get(reports_handler))
        .route("/payments/dialog", get(payments::open_dialog))
        .route("/payments/dialog/search", post(payments::search))
        .route("/payments/dialog/toggle", post(payments::toggle))
        .route("/payments/dialog/select-all", post(payments::select_all))
        .route("/payments/dialog/clear", post(payments::clear))
        .route("/payments/dialog/details", post(payments::details))
        .route("/payments/dialog/allocation", post(payments::allocation))
        .route("/payments/dialog/auto-allocate", post(payments::auto_allocate))
        .route(
            "/payments/dialog/attachment",
            post(payments::attachment).layer(DefaultBodyLimit::max(Attachment::MAX_SIZE)),
        )
        .route("/payments/dialog/submit", post(payments::submit))
        .route("/payments/dialog/close", post(payments::close))
        .route("/payments/dialog/summary", get(payments::summary))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
}

pub fn build_router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.server.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::days(
            state.server.session_inactivity_days,
        )));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/login", get(login_page).post(login_handler))
        .route("/register", get(register_page).post(register_handler))
        .route("/logout", get(logout_handler).post(logout_handler))
        .merge(protected_routes(&state))
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
