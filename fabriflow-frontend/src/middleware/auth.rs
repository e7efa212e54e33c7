use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use service_core::middleware::tracing::RequestId;
use tower_sessions::Session;

use crate::models::{AuthUser, SessionUser};
use crate::services::api_client::CallContext;
use crate::services::auth_client::AuthService;
use crate::services::metrics::record_auth_rejection;
use crate::AppState;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USER_KEY: &str = "user";

/// Why a session did not resolve to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingSession,
    InvalidToken,
    /// The backend still accepts the token but the user is pending or rejected.
    AwaitingApproval,
}

impl Rejection {
    pub fn as_label(&self) -> &'static str {
        match self {
            Rejection::MissingSession => "missing_session",
            Rejection::InvalidToken => "invalid_token",
            Rejection::AwaitingApproval => "awaiting_approval",
        }
    }
}

/// Resolves the session to a signed-in user. Both the token and the stored
/// user must be present, the backend must still accept the token, and the
/// backend's current record must not be awaiting approval.
pub async fn resolve_session(
    session: &Session,
    auth: &dyn AuthService,
    request_id: Option<String>,
) -> Result<AuthUser, Rejection> {
    let access_token: Option<String> = session.get(ACCESS_TOKEN_KEY).await.unwrap_or(None);
    let user: Option<SessionUser> = session.get(USER_KEY).await.unwrap_or(None);

    let (Some(access_token), Some(user)) = (access_token, user) else {
        return Err(Rejection::MissingSession);
    };

    let ctx = CallContext::authenticated(&access_token, request_id);
    match auth.resolve_user(&ctx).await {
        Ok(current) if current.is_awaiting_approval() => {
            tracing::warn!(user = %user.user, status = ?current.status, "Session user no longer approved");
            Err(Rejection::AwaitingApproval)
        }
        Ok(_) => Ok(AuthUser { user, access_token }),
        Err(e) => {
            tracing::warn!(error = %e, "Session token rejected by backend");
            Err(Rejection::InvalidToken)
        }
    }
}

/// Auth gate for protected routes. Failed sessions are destroyed and the
/// caller is sent to the login page.
pub async fn auth_middleware(
    State(state): State<AppState>,
    session: Session,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string());

    match resolve_session(&session, state.auth.as_ref(), request_id).await {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(rejection) => {
            record_auth_rejection(rejection.as_label());
            if let Err(e) = session.flush().await {
                tracing::error!("Failed to destroy session: {}", e);
            }
            Redirect::to("/login").into_response()
        }
    }
}
