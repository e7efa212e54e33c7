//! JSON client for the FabriFlow backend API.

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use service_core::error::AppError;
use service_core::observability::{TracedClientExt, TracedRequest};
use thiserror::Error;

use crate::config::BackendSettings;

/// Failures talking to the backend, with the messages shown to users.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Credenciales inválidas")]
    Unauthorized,

    #[error("Acceso denegado")]
    Forbidden,

    #[error("Recurso no encontrado")]
    NotFound,

    #[error("Error interno del servidor")]
    Internal,

    #[error("El servidor no está disponible. Intente más tarde.")]
    ServerUnavailable(u16),

    #[error("{message}")]
    Http { status: u16, message: String },

    /// The backend answered 2xx but reported `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("No se pudo conectar al servidor. Verifique su conexión a internet.")]
    Network,

    #[error("Error inesperado. Por favor intente más tarde.")]
    Unexpected,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::Internal => "INTERNAL_ERROR",
            ApiError::ServerUnavailable(_) => "SERVER_UNAVAILABLE",
            ApiError::Http { .. } => "HTTP_ERROR",
            ApiError::Rejected(_) => "REJECTED",
            ApiError::Network => "NETWORK_ERROR",
            ApiError::Unexpected => "UNKNOWN_ERROR",
        }
    }

    /// Maps a non-success status. `body_message` is the `message` or `error`
    /// field of a JSON error body, used only for statuses without a fixed text.
    pub fn from_status(status: StatusCode, body_message: Option<String>) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound,
            500 => ApiError::Internal,
            code @ (502..=504) => ApiError::ServerUnavailable(code),
            code => ApiError::Http {
                status: code,
                message: body_message.unwrap_or_else(|| {
                    format!(
                        "HTTP {}: {}",
                        code,
                        status.canonical_reason().unwrap_or("Unknown")
                    )
                }),
            },
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized | ApiError::Rejected(_) => {
                AppError::Unauthorized(anyhow::anyhow!(err))
            }
            ApiError::Forbidden => AppError::Forbidden(anyhow::anyhow!(err)),
            ApiError::NotFound => AppError::NotFound(anyhow::anyhow!(err)),
            ApiError::ServerUnavailable(_) | ApiError::Network => AppError::ServiceUnavailable,
            ApiError::Internal | ApiError::Http { .. } => AppError::BadGateway(err.to_string()),
            ApiError::Unexpected => AppError::InternalError(anyhow::anyhow!(err)),
        }
    }
}

/// `{ success, data, error }` wrapper most backend endpoints answer with.
#[derive(Debug, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// The payload, or `fallback` as the error message when the call failed.
    pub fn into_result(self, fallback: &str) -> Result<T, ApiError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(ApiError::Rejected(
                self.error.unwrap_or_else(|| fallback.to_string()),
            )),
        }
    }
}

/// Credentials and correlation data for one outbound call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    pub access_token: Option<String>,
    pub request_id: Option<String>,
}

impl CallContext {
    pub fn anonymous(request_id: Option<String>) -> Self {
        Self {
            access_token: None,
            request_id,
        }
    }

    pub fn authenticated(access_token: &str, request_id: Option<String>) -> Self {
        Self {
            access_token: Some(access_token.to_string()),
            request_id,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

pub struct ApiClient {
    client: Client,
    settings: BackendSettings,
}

impl ApiClient {
    pub fn new(settings: BackendSettings) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self { client, settings }
    }

    pub fn base_url(&self) -> &str {
        &self.settings.url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.url.trim_end_matches('/'), path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, ctx: &CallContext) -> Result<T, ApiError> {
        let url = self.url(path);
        let request = self.client.traced_get(&url);
        self.execute(&url, request, ctx).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, ctx: &CallContext) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request = self.client.traced_post(&url).json(body);
        self.execute(&url, request, ctx).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: &str,
        mut request: TracedRequest,
        ctx: &CallContext,
    ) -> Result<T, ApiError> {
        if let Some(token) = &ctx.access_token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(url = %url, "Calling backend API");

        let response = request
            .send_with_request_id(ctx.request_id.as_deref())
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to {}: {}", url, e);
                ApiError::Network
            })?;

        let status = response.status();

        if !status.is_success() {
            let body_message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message.or(body.error));
            tracing::warn!(
                url = %url,
                status = status.as_u16(),
                message = ?body_message,
                "Backend API returned an error"
            );
            return Err(ApiError::from_status(status, body_message));
        }

        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read response body from {}: {}", url, e);
            ApiError::Network
        })?;

        let body: &[u8] = if status == StatusCode::NO_CONTENT || bytes.is_empty() {
            b"{}"
        } else {
            &bytes
        };

        serde_json::from_slice(body).map_err(|e| {
            tracing::error!("Failed to decode response from {}: {}", url, e);
            ApiError::Unexpected
        })
    }
}
