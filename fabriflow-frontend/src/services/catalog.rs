//! Where pages get their invoices, providers and figures from.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::api_client::{ApiError, CallContext};
use crate::models::{DashboardMetrics, Invoice, ManagedUser, Provider, RecentActivity, ReportType};

#[async_trait]
pub trait InvoiceSource: Send + Sync {
    async fn invoices(&self, ctx: &CallContext) -> Result<Vec<Invoice>, ApiError>;

    async fn invoice(&self, id: &str, ctx: &CallContext) -> Result<Option<Invoice>, ApiError> {
        Ok(self
            .invoices(ctx)
            .await?
            .into_iter()
            .find(|invoice| invoice.uuid == id))
    }

    async fn providers(&self, ctx: &CallContext) -> Result<Vec<Provider>, ApiError>;

    async fn users(&self, ctx: &CallContext) -> Result<Vec<ManagedUser>, ApiError>;

    async fn dashboard_metrics(&self, ctx: &CallContext) -> Result<DashboardMetrics, ApiError>;
}

const INVOICES_JSON: &str = include_str!("../../data/invoices.json");
const PROVIDERS_JSON: &str = include_str!("../../data/providers.json");
const USERS_JSON: &str = include_str!("../../data/users.json");

/// Fixed development data set served while the backend has no listing
/// endpoints for these resources.
#[derive(Debug, Clone)]
pub struct SampleCatalog {
    invoices: Vec<Invoice>,
    providers: Vec<Provider>,
    users: Vec<ManagedUser>,
}

impl SampleCatalog {
    pub fn load() -> Result<Self, serde_json::Error> {
        Ok(Self {
            invoices: serde_json::from_str(INVOICES_JSON)?,
            providers: serde_json::from_str(PROVIDERS_JSON)?,
            users: serde_json::from_str(USERS_JSON)?,
        })
    }

    pub fn with_invoices(invoices: Vec<Invoice>) -> Self {
        Self {
            invoices,
            providers: Vec::new(),
            users: Vec::new(),
        }
    }
}

fn activity(description: &str, amount: Decimal, time: &str) -> RecentActivity {
    RecentActivity {
        description: description.to_string(),
        amount,
        time: time.to_string(),
    }
}

#[async_trait]
impl InvoiceSource for SampleCatalog {
    async fn invoices(&self, _ctx: &CallContext) -> Result<Vec<Invoice>, ApiError> {
        Ok(self.invoices.clone())
    }

    async fn providers(&self, _ctx: &CallContext) -> Result<Vec<Provider>, ApiError> {
        Ok(self.providers.clone())
    }

    async fn users(&self, _ctx: &CallContext) -> Result<Vec<ManagedUser>, ApiError> {
        Ok(self.users.clone())
    }

    async fn dashboard_metrics(&self, _ctx: &CallContext) -> Result<DashboardMetrics, ApiError> {
        Ok(DashboardMetrics {
            total_revenue: Decimal::new(1254305, 1),
            total_invoices: 47,
            active_providers: 12,
            balance_usd: Decimal::new(2450075, 2),
            balance_mxn: Decimal::new(487250, 0),
            recent_activity: vec![
                activity("Factura #INV-2024-001 pagada", Decimal::new(2500, 0), "hace 2 horas"),
                activity("Nuevo proveedor registrado: ABC Corp", Decimal::ZERO, "hace 5 horas"),
                activity("Factura #INV-2024-002 creada", Decimal::new(37505, 1), "hace 1 día"),
                activity("Pago recibido de XYZ Ltd", Decimal::new(1200, 0), "hace 2 días"),
                activity("Reporte mensual generado", Decimal::ZERO, "hace 3 días"),
            ],
        })
    }
}

pub fn report_types() -> Vec<ReportType> {
    vec![
        ReportType {
            id: "monthly-summary",
            title: "Resumen Financiero Mensual",
            description: "Resumen integral de la actividad financiera mensual incluyendo facturas, pagos y saldos.",
            features: vec![
                "Desglose de ingresos",
                "Estado de pagos",
                "Análisis de divisas",
                "Gráficos de tendencias",
            ],
        },
        ReportType {
            id: "provider-analysis",
            title: "Análisis de Desempeño de Proveedores",
            description: "Análisis detallado de las relaciones con proveedores, volúmenes de transacciones y patrones de pago.",
            features: vec![
                "Principales proveedores",
                "Velocidad de pago",
                "Tendencias de volumen",
                "Análisis regional",
            ],
        },
        ReportType {
            id: "tax-compliance",
            title: "Reporte de Cumplimiento Fiscal",
            description: "Generar reportes para cumplimiento fiscal incluyendo requisitos del SAT y documentación CFDI.",
            features: vec![
                "Resumen CFDI",
                "Cálculos fiscales",
                "Estado de cumplimiento",
                "Formatos de exportación",
            ],
        },
        ReportType {
            id: "custom-analytics",
            title: "Panel de Análisis Personalizado",
            description: "Crear reportes personalizados con filtros flexibles y capacidades de análisis avanzadas.",
            features: vec![
                "Filtros personalizados",
                "Rangos de fechas",
                "Opciones de exportación",
                "Gráficos visuales",
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvoiceStatus;
    use crate::payments::filter::eligible_invoices;

    #[test]
    fn sample_data_parses() {
        let catalog = SampleCatalog::load().unwrap();
        assert_eq!(catalog.invoices.len(), 5);
        assert_eq!(catalog.providers.len(), 5);
        assert_eq!(catalog.users.len(), 5);

        let pending: Vec<String> = eligible_invoices(&catalog.invoices)
            .into_iter()
            .map(|invoice| invoice.uuid)
            .collect();
        assert_eq!(pending, ["INV-002", "INV-004"]);
    }

    #[tokio::test]
    async fn invoice_lookup_by_id() {
        let catalog = SampleCatalog::load().unwrap();
        let ctx = CallContext::default();

        let invoice = catalog.invoice("INV-003", &ctx).await.unwrap().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Overdue);
        assert_eq!(invoice.total, Decimal::new(89300, 0));
        assert!(catalog.invoice("INV-999", &ctx).await.unwrap().is_none());
    }
}
