use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    Extension,
};
use service_core::middleware::tracing::RequestId;
use tower_sessions::Session;

use super::request_id;
use crate::middleware::auth::resolve_session;
use crate::AppState;

pub async fn index(
    State(state): State<AppState>,
    session: Session,
    request_id_ext: Option<Extension<RequestId>>,
) -> impl IntoResponse {
    match resolve_session(&session, state.auth.as_ref(), request_id(request_id_ext)).await {
        Ok(_) => Redirect::to("/dashboard"),
        Err(_) => Redirect::to("/login"),
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}
