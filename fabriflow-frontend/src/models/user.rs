use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

/// User record as returned by the backend (`/api/auth/login`, `/api/auth/me`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl BackendUser {
    /// Statuses that must not be granted a session.
    pub fn is_awaiting_approval(&self) -> bool {
        self.status.as_deref().is_some_and(is_awaiting_approval)
    }
}

pub fn is_awaiting_approval(status: &str) -> bool {
    matches!(status, "pending" | "pendiente" | "rejected" | "rechazado")
}

/// Identity kept in the session once login succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub user: String,
    pub role: String,
    pub status: String,
    pub permissions: Vec<String>,
    pub company: String,
}

impl SessionUser {
    /// Builds the session identity, filling in the backend's optional fields.
    /// `company` is the one picked on the login form, not the backend's.
    pub fn from_backend(user: &BackendUser, company: &str) -> Self {
        Self {
            user: user.user.clone().unwrap_or_else(|| user.email.clone()),
            role: user.role.clone().unwrap_or_else(|| "user".to_string()),
            status: user.status.clone().unwrap_or_else(|| "active".to_string()),
            permissions: user.permissions.clone().unwrap_or_default(),
            company: company.to_string(),
        }
    }

    pub fn name(&self) -> String {
        self.user.split('@').next().unwrap_or("Usuario").to_string()
    }

    pub fn initials(&self) -> String {
        let name: Vec<char> = self.name().chars().collect();
        match name.len() {
            0 => "U".to_string(),
            1 => name[0].to_uppercase().collect(),
            _ => name[..2].iter().flat_map(|c| c.to_uppercase()).collect(),
        }
    }
}

/// Authenticated caller, placed in request extensions by the auth gate.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: SessionUser,
    pub access_token: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| Redirect::to("/login").into_response())
    }
}

/// Row in the users administration table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub company: String,
    pub status: String,
    pub last_login: String,
    pub created_at: String,
}

impl ManagedUser {
    pub fn role_label(&self) -> &str {
        match self.role.as_str() {
            "admin" => "Administrador",
            "vendor" => "Proveedor",
            "user" => "Usuario",
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_user() -> BackendUser {
        BackendUser {
            id: "42".to_string(),
            email: "ana.garcia@textilesnorte.com".to_string(),
            company: "Textiles del Norte".to_string(),
            user: None,
            role: None,
            permissions: None,
            status: None,
            last_login: None,
            created_at: None,
        }
    }

    #[test]
    fn session_user_defaults() {
        let session_user = SessionUser::from_backend(&backend_user(), "Magavi");
        assert_eq!(session_user.user, "ana.garcia@textilesnorte.com");
        assert_eq!(session_user.role, "user");
        assert_eq!(session_user.status, "active");
        assert!(session_user.permissions.is_empty());
        assert_eq!(session_user.company, "Magavi");
        assert_eq!(session_user.initials(), "AN");
    }

    #[test]
    fn approval_statuses() {
        let mut user = backend_user();
        assert!(!user.is_awaiting_approval());

        for status in ["pendiente", "rechazado", "pending", "rejected"] {
            user.status = Some(status.to_string());
            assert!(user.is_awaiting_approval(), "{status} should be blocked");
        }

        user.status = Some("active".to_string());
        assert!(!user.is_awaiting_approval());
    }
}
