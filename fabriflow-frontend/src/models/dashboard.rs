use rust_decimal::Decimal;
use serde::Serialize;

use super::money::format_money;

#[derive(Debug, Clone, Serialize)]
pub struct RecentActivity {
    pub description: String,
    pub amount: Decimal,
    pub time: String,
}

impl RecentActivity {
    pub fn has_amount(&self) -> bool {
        !self.amount.is_zero()
    }

    pub fn formatted_amount(&self) -> String {
        format_money(self.amount)
    }
}

/// Headline figures shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub total_revenue: Decimal,
    pub total_invoices: u32,
    pub active_providers: u32,
    pub balance_usd: Decimal,
    pub balance_mxn: Decimal,
    pub recent_activity: Vec<RecentActivity>,
}

impl DashboardMetrics {
    pub fn formatted_revenue(&self) -> String {
        format_money(self.total_revenue)
    }

    pub fn formatted_balance_usd(&self) -> String {
        format_money(self.balance_usd)
    }

    pub fn formatted_balance_mxn(&self) -> String {
        format_money(self.balance_mxn)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportType {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub features: Vec<&'static str>,
}
