use askama::Template;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;
use tower_sessions::Session;
use validator::Validate;

use super::{request_id, AlertTemplate};
use crate::middleware::auth::{resolve_session, ACCESS_TOKEN_KEY, USER_KEY};
use crate::models::registration::AccountKind;
use crate::models::{CompanyRegistration, RegisterForm, SessionUser, VendorRegistration};
use crate::services::api_client::CallContext;
use crate::AppState;

pub const PENDING_APPROVAL_MESSAGE: &str =
    "Este usuario sigue pendiente de aprobación, favor de contactarse con el administrador";

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub companies: Vec<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub companies: Vec<String>,
    pub server_error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<Secret<String>>,
    #[serde(default)]
    pub company: String,
}

fn alert_response(status: StatusCode, alert: AlertTemplate) -> Response {
    (status, alert).into_response()
}

pub async fn login_page(
    State(state): State<AppState>,
    request_id_ext: Option<Extension<RequestId>>,
) -> impl IntoResponse {
    let ctx = CallContext::anonymous(request_id(request_id_ext));
    let companies = state.auth.companies(&ctx).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load companies for login form");
        Vec::new()
    });

    LoginTemplate { companies }
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    request_id_ext: Option<Extension<RequestId>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim();
    let password = form
        .password
        .filter(|password| !password.expose_secret().is_empty());

    let Some(password) = password.filter(|_| !email.is_empty()) else {
        return alert_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            AlertTemplate::error("Email y contraseña son requeridos"),
        );
    };

    let company = form.company.trim();
    if company.is_empty() {
        return alert_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            AlertTemplate::error("Por favor selecciona una empresa"),
        );
    }

    let ctx = CallContext::anonymous(request_id(request_id_ext));
    let login = match state.auth.login(email, &password, company, &ctx).await {
        Ok(login) => login,
        Err(e) => {
            tracing::warn!(email = %email, company = %company, error = %e, "Login failed");
            return alert_response(StatusCode::UNPROCESSABLE_ENTITY, AlertTemplate::error(e.to_string()));
        }
    };

    if login.user.is_awaiting_approval() {
        tracing::info!(email = %email, "Login refused for user awaiting approval");
        return alert_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            AlertTemplate::error(PENDING_APPROVAL_MESSAGE),
        );
    }

    let user = SessionUser::from_backend(&login.user, company);

    if let Err(e) = session.cycle_id().await {
        tracing::error!("Failed to rotate session id: {}", e);
    }
    let stored = async {
        session.insert(ACCESS_TOKEN_KEY, &login.token).await?;
        session.insert(USER_KEY, &user).await
    };
    if let Err(e) = stored.await {
        tracing::error!("Failed to store session: {}", e);
        return AppError::InternalError(anyhow::anyhow!("session store failed: {e}")).into_response();
    }

    tracing::info!(user = %user.user, company = %user.company, role = %user.role, "User logged in");

    let mut headers = HeaderMap::new();
    headers.insert("HX-Redirect", HeaderValue::from_static("/dashboard"));
    (StatusCode::OK, headers, "").into_response()
}

pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    request_id_ext: Option<Extension<RequestId>>,
) -> Response {
    let request_id = request_id(request_id_ext);
    if resolve_session(&session, state.auth.as_ref(), request_id.clone())
        .await
        .is_ok()
    {
        return Redirect::to("/dashboard").into_response();
    }

    let ctx = CallContext::anonymous(request_id);
    let template = match state.auth.companies(&ctx).await {
        Ok(companies) => RegisterTemplate {
            companies,
            server_error: None,
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to load companies for registration");
            RegisterTemplate {
                companies: Vec::new(),
                server_error: Some(e.to_string()),
            }
        }
    };

    template.into_response()
}

fn validation_messages(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|field| field.iter())
        .map(|error| {
            error
                .message
                .as_ref()
                .map(|message| message.to_string())
                .unwrap_or_else(|| format!("Campo inválido: {}", error.code))
        })
        .collect();
    messages.sort();
    messages
}

pub async fn register_handler(
    State(state): State<AppState>,
    request_id_ext: Option<Extension<RequestId>>,
    Form(form): Form<RegisterForm>,
) -> Response {
    if let Err(errors) = form.validate() {
        return alert_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            AlertTemplate {
                kind: "error",
                messages: validation_messages(&errors),
            },
        );
    }
    if let Some(message) = form.missing_kind_fields() {
        return alert_response(StatusCode::UNPROCESSABLE_ENTITY, AlertTemplate::error(message));
    }

    let ctx = CallContext::anonymous(request_id(request_id_ext));
    let result = match form.company_type {
        AccountKind::Provider => {
            state
                .auth
                .register_vendor(&VendorRegistration::from(&form), &ctx)
                .await
        }
        AccountKind::Client => {
            state
                .auth
                .register_company(&CompanyRegistration::from(&form), &ctx)
                .await
        }
    };

    match result {
        Ok(()) => alert_response(StatusCode::OK, AlertTemplate::success(form.success_message())),
        Err(e) => {
            tracing::warn!(email = %form.email, error = %e, "Registration failed");
            alert_response(StatusCode::UNPROCESSABLE_ENTITY, AlertTemplate::error(e.to_string()))
        }
    }
}

pub async fn logout_handler(session: Session) -> impl IntoResponse {
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to destroy session during logout: {}", e);
    }
    Redirect::to("/login")
}
