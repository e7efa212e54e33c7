use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::api_client::{ApiClient, ApiError, CallContext, Envelope};
use crate::models::{BackendUser, CompanyRegistration, VendorRegistration};

/// Token and user returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub user: BackendUser,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    company: &'a str,
}

/// Identity operations the frontend needs from the backend.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(
        &self,
        email: &str,
        password: &Secret<String>,
        company: &str,
        ctx: &CallContext,
    ) -> Result<LoginData, ApiError>;

    /// Validates a session token and returns its user.
    async fn resolve_user(&self, ctx: &CallContext) -> Result<BackendUser, ApiError>;

    /// Client companies offered on the login and sign-up forms.
    async fn companies(&self, ctx: &CallContext) -> Result<Vec<String>, ApiError>;

    async fn register_company(
        &self,
        payload: &CompanyRegistration,
        ctx: &CallContext,
    ) -> Result<(), ApiError>;

    async fn register_vendor(
        &self,
        payload: &VendorRegistration,
        ctx: &CallContext,
    ) -> Result<(), ApiError>;
}

pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }
}

#[async_trait]
impl AuthService for AuthClient {
    async fn login(
        &self,
        email: &str,
        password: &Secret<String>,
        company: &str,
        ctx: &CallContext,
    ) -> Result<LoginData, ApiError> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
            company,
        };

        let envelope: Envelope<LoginData> = self.api.post("/api/auth/login", &body, ctx).await?;
        envelope.into_result("Login failed")
    }

    async fn resolve_user(&self, ctx: &CallContext) -> Result<BackendUser, ApiError> {
        if ctx.access_token.is_none() {
            return Err(ApiError::Unauthorized);
        }
        self.api.get("/api/auth/me", ctx).await
    }

    async fn companies(&self, ctx: &CallContext) -> Result<Vec<String>, ApiError> {
        let envelope: Envelope<Vec<String>> = self.api.get("/api/auth/companies", ctx).await?;
        // An unsuccessful envelope just means nothing to offer
        Ok(envelope.into_result("").unwrap_or_default())
    }

    async fn register_company(
        &self,
        payload: &CompanyRegistration,
        ctx: &CallContext,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self.api.post("/company/register", payload, ctx).await?;
        tracing::info!(company = %payload.company_name, "Company registration submitted");
        Ok(())
    }

    async fn register_vendor(
        &self,
        payload: &VendorRegistration,
        ctx: &CallContext,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .api
            .post("/api/auth/register-vendor", payload, ctx)
            .await?;
        tracing::info!(
            client = %payload.company,
            vendor_type = ?payload.vendor_company_type,
            "Vendor registration submitted"
        );
        Ok(())
    }
}
