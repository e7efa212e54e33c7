//! Invoice model as served by the FabriFlow backend.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::{self, format_money};

/// Invoice status.
///
/// The backend mixes English and Spanish spellings; each variant accepts both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
    Other(String),
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
            InvoiceStatus::Other(s) => s,
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "pending" | "pendiente" => InvoiceStatus::Pending,
            "paid" | "pagado" => InvoiceStatus::Paid,
            "overdue" | "vencido" => InvoiceStatus::Overdue,
            "cancelled" | "cancelado" => InvoiceStatus::Cancelled,
            other => InvoiceStatus::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            InvoiceStatus::Pending => "Pendiente",
            InvoiceStatus::Paid => "Pagado",
            InvoiceStatus::Overdue => "Vencido",
            InvoiceStatus::Cancelled => "Cancelado",
            InvoiceStatus::Other(s) => s,
        }
    }

    /// Only pending invoices can take part in a payment batch.
    pub fn is_payable(&self) -> bool {
        matches!(self, InvoiceStatus::Pending)
    }
}

impl From<String> for InvoiceStatus {
    fn from(s: String) -> Self {
        InvoiceStatus::from_string(&s)
    }
}

impl From<InvoiceStatus> for String {
    fn from(status: InvoiceStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    #[serde(rename = "MXN")]
    Mxn,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Mxn => "MXN",
            Currency::Usd => "USD",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub description: String,
    pub unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedDocumentKind {
    Order,
    Payment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedDocument {
    #[serde(rename = "type")]
    pub kind: RelatedDocumentKind,
    pub name: String,
    pub url: String,
    pub mime_type: String,
    pub upload_date: String,
}

/// Document attached to an invoice after issuance.
///
/// The backend tags every complement with `documentType`; the tag selects the
/// variant instead of guessing from which fields happen to be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "documentType")]
pub enum Complement {
    #[serde(rename = "pago", rename_all = "camelCase")]
    Payment {
        date: String,
        entry_date: String,
        id_pdf: String,
        reference: String,
        #[serde(deserialize_with = "money::lenient", default)]
        total: Decimal,
        exchange_rate: String,
    },
    #[serde(rename = "complemento", rename_all = "camelCase")]
    PaymentComplement {
        folio: String,
        operation_number: String,
        #[serde(deserialize_with = "money::lenient", default)]
        total: Decimal,
        date: String,
        currency: Currency,
        id_pdf: String,
        id_xml: String,
        uuid: String,
        entry_date: String,
    },
    #[serde(rename = "nota", rename_all = "camelCase")]
    CreditNote {
        entry_date: String,
        date: String,
        folio: String,
        id_pdf: String,
        id_xml: String,
        currency: Currency,
        #[serde(deserialize_with = "money::lenient", default)]
        total: Decimal,
        uuid: String,
    },
    #[serde(rename = "cancelacion", rename_all = "camelCase")]
    Cancel {
        date: String,
        entry_date: String,
        id_xml: String,
        id_pdf: String,
    },
    #[serde(rename = "recepcion", rename_all = "camelCase")]
    Receipt {
        id_pdf: String,
        date: String,
        num: u32,
    },
    #[serde(rename = "multicomp", rename_all = "camelCase")]
    MultiComplement {
        folio: String,
        uuid: String,
        currency: Currency,
        #[serde(deserialize_with = "money::lenient", default)]
        total: Decimal,
        date: String,
        entry_date: String,
        id_pdf: String,
        id_xml: String,
    },
    #[serde(rename = "multipago", rename_all = "camelCase")]
    MultiPayment {
        reference: String,
        #[serde(deserialize_with = "money::lenient", default)]
        total: Decimal,
        exchange_rate: String,
        date: String,
        entry_date: String,
        id_pdf: String,
    },
}

impl Complement {
    pub fn label(&self) -> &'static str {
        match self {
            Complement::Payment { .. } => "Pago",
            Complement::PaymentComplement { .. } => "Complemento de pago",
            Complement::CreditNote { .. } => "Nota de crédito",
            Complement::Cancel { .. } => "Cancelación",
            Complement::Receipt { .. } => "Recepción",
            Complement::MultiComplement { .. } => "Multicomplemento",
            Complement::MultiPayment { .. } => "Multipago",
        }
    }

    pub fn date(&self) -> &str {
        match self {
            Complement::Payment { date, .. }
            | Complement::PaymentComplement { date, .. }
            | Complement::CreditNote { date, .. }
            | Complement::Cancel { date, .. }
            | Complement::Receipt { date, .. }
            | Complement::MultiComplement { date, .. }
            | Complement::MultiPayment { date, .. } => date,
        }
    }

    /// Amount carried by the complement, if the document type has one.
    pub fn total(&self) -> Option<Decimal> {
        match self {
            Complement::Payment { total, .. }
            | Complement::PaymentComplement { total, .. }
            | Complement::CreditNote { total, .. }
            | Complement::MultiComplement { total, .. }
            | Complement::MultiPayment { total, .. } => Some(*total),
            Complement::Cancel { .. } | Complement::Receipt { .. } => None,
        }
    }

    pub fn formatted_total(&self) -> Option<String> {
        self.total().map(format_money)
    }
}

/// Invoice document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub uuid: String,
    pub folio: String,
    pub company: String,
    pub issuer_name: String,
    pub invoice_date: NaiveDate,
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
    #[serde(deserialize_with = "money::lenient", default)]
    pub total: Decimal,
    #[serde(deserialize_with = "money::lenient", default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub currency: Currency,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub payment_conditions: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub use_cfdi: String,
    #[serde(deserialize_with = "money::lenient", default)]
    pub balance: Decimal,
    #[serde(default)]
    pub exchange_rate: String,
    #[serde(default)]
    pub url_pdf_file: String,
    #[serde(default)]
    pub url_xml_file: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub details: Vec<Detail>,
    #[serde(default)]
    pub complements: Vec<Complement>,
    #[serde(default)]
    pub related_documents: Vec<RelatedDocument>,
}

impl Invoice {
    pub fn formatted_total(&self) -> String {
        format_money(self.total)
    }

    pub fn formatted_subtotal(&self) -> String {
        format_money(self.subtotal)
    }

    pub fn formatted_balance(&self) -> String {
        format_money(self.balance)
    }

    /// Placeholder links (`""`, `"#"`) mean the file was never uploaded.
    pub fn has_pdf(&self) -> bool {
        is_document_link(&self.url_pdf_file)
    }

    pub fn has_xml(&self) -> bool {
        is_document_link(&self.url_xml_file)
    }

    pub fn formatted_date(&self) -> String {
        self.invoice_date.format("%d/%m/%Y").to_string()
    }
}

fn is_document_link(url: &str) -> bool {
    !url.is_empty() && url != "#"
}
