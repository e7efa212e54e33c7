//! Sign-up form and the payloads it maps to.
//!
//! One form covers both client companies and vendors; the backend has a
//! separate endpoint for each.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Client,
    Provider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorType {
    Legal,
    Personal,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub company_type: AccountKind,
    #[serde(default)]
    pub provider_type: String,
    #[validate(length(min = 1, message = "La empresa es requerida"))]
    pub company: String,
    #[serde(default)]
    pub provider_company: String,
    #[serde(default)]
    pub vendor_legal_name: String,
    #[serde(default)]
    pub company_email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lastname: String,
    #[validate(email(message = "Correo electrónico inválido"))]
    pub email: String,
    #[validate(length(min = 12, max = 13, message = "El RFC debe tener 12 o 13 caracteres"))]
    pub rfc: String,
    #[serde(default)]
    pub phone: String,
    #[validate(length(min = 8, message = "La contraseña debe tener al menos 8 caracteres"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Las contraseñas no coinciden"))]
    pub confirm_password: String,
}

impl RegisterForm {
    /// Anything other than an explicit `personal` registers a legal entity.
    pub fn vendor_type(&self) -> VendorType {
        if self.provider_type == "personal" {
            VendorType::Personal
        } else {
            VendorType::Legal
        }
    }

    /// Fields required only for some account kinds. Returns the first
    /// message to show, if any.
    pub fn missing_kind_fields(&self) -> Option<&'static str> {
        match (self.company_type, self.vendor_type()) {
            (AccountKind::Provider, VendorType::Legal) if self.vendor_legal_name.trim().is_empty() => {
                Some("La razón social es requerida")
            }
            (AccountKind::Provider, VendorType::Personal) if self.provider_company.trim().is_empty() => {
                Some("El nombre del proveedor es requerido")
            }
            (AccountKind::Client, _) | (AccountKind::Provider, VendorType::Legal)
                if self.name.trim().is_empty() || self.lastname.trim().is_empty() =>
            {
                Some("Nombre y apellido son requeridos")
            }
            _ => None,
        }
    }

    pub fn success_message(&self) -> String {
        match self.company_type {
            AccountKind::Provider => {
                let kind = match self.vendor_type() {
                    VendorType::Personal => "proveedor individual",
                    VendorType::Legal => "empresa proveedora",
                };
                format!(
                    "Registro de {} exitoso. Tu solicitud será enviada a {} para aprobación.",
                    kind, self.company
                )
            }
            AccountKind::Client => "¡Registro exitoso! Tu cuenta está pendiente de autorización. En breve recibirás un correo con la confirmación.".to_string(),
        }
    }
}

/// Body of `POST /company/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRegistration {
    pub company_name: String,
    pub company_email: String,
    pub rfc: String,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl From<&RegisterForm> for CompanyRegistration {
    fn from(form: &RegisterForm) -> Self {
        let company_email = if form.company_email.trim().is_empty() {
            form.email.clone()
        } else {
            form.company_email.trim().to_string()
        };

        Self {
            company_name: form.company.clone(),
            company_email,
            rfc: form.rfc.clone(),
            admin_name: format!("{} {}", form.name, form.lastname),
            admin_email: form.email.clone(),
            admin_password: form.password.clone(),
        }
    }
}

/// Body of `POST /api/auth/register-vendor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorRegistration {
    pub company: String,
    pub email: String,
    pub password: String,
    pub vendor_rfc: String,
    pub vendor_company_type: VendorType,
    pub vendor_legal_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_lastname: Option<String>,
    pub clients: Vec<String>,
}

impl From<&RegisterForm> for VendorRegistration {
    fn from(form: &RegisterForm) -> Self {
        let vendor_type = form.vendor_type();
        let (vendor_legal_name, contact_name, contact_lastname) = match vendor_type {
            VendorType::Legal => (
                form.vendor_legal_name.clone(),
                Some(form.name.clone()),
                Some(form.lastname.clone()),
            ),
            VendorType::Personal => (form.provider_company.clone(), None, None),
        };

        Self {
            company: form.company.clone(),
            email: form.email.clone(),
            password: form.password.clone(),
            vendor_rfc: form.rfc.clone(),
            vendor_company_type: vendor_type,
            vendor_legal_name,
            contact_name,
            contact_lastname,
            clients: vec![form.company.clone()],
        }
    }
}
