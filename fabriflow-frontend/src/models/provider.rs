use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::invoice::Currency;
use super::money::{self, format_money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    Activo,
    Pendiente,
    Rechazado,
    Revisar,
}

impl ProviderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProviderStatus::Activo => "Activo",
            ProviderStatus::Pendiente => "Pendiente",
            ProviderStatus::Rechazado => "Rechazado",
            ProviderStatus::Revisar => "Revisar",
        }
    }
}

/// Vendor registered against the signed-in company.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub rfc: String,
    pub name: String,
    pub email: String,
    pub status: ProviderStatus,
    #[serde(deserialize_with = "money::lenient", default)]
    pub mxn_total: Decimal,
    #[serde(deserialize_with = "money::lenient", default)]
    pub usd_total: Decimal,
    pub currency: Currency,
    pub key: String,
}

impl Provider {
    /// Case-insensitive match on name, RFC or email.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.rfc.to_lowercase().contains(&needle)
            || self.email.to_lowercase().contains(&needle)
    }

    pub fn formatted_mxn_total(&self) -> String {
        format_money(self.mxn_total)
    }

    pub fn formatted_usd_total(&self) -> String {
        format_money(self.usd_total)
    }
}

pub fn search_providers(providers: &[Provider], term: &str) -> Vec<Provider> {
    if term.trim().is_empty() {
        return providers.to_vec();
    }
    providers
        .iter()
        .filter(|provider| provider.matches(term.trim()))
        .cloned()
        .collect()
}
