pub mod app;
pub mod auth;
pub mod metrics;
pub mod pages;
pub mod payments;

use askama::Template;
use axum::Extension;
use service_core::middleware::tracing::RequestId;

use crate::models::AuthUser;
use crate::services::api_client::CallContext;

/// HTMX alert fragment used for form feedback.
#[derive(Template)]
#[template(path = "partials/alert.html")]
pub struct AlertTemplate {
    pub kind: &'static str,
    pub messages: Vec<String>,
}

impl AlertTemplate {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error",
            messages: vec![message.into()],
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success",
            messages: vec![message.into()],
        }
    }
}

pub fn request_id(extension: Option<Extension<RequestId>>) -> Option<String> {
    extension.map(|Extension(id)| id.0)
}

pub fn call_context(auth_user: &AuthUser, request_id: Option<Extension<RequestId>>) -> CallContext {
    CallContext::authenticated(&auth_user.access_token, self::request_id(request_id))
}
