use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::allocation::AllocationTable;

/// Largest unallocated remainder still treated as fully allocated (one cent).
pub fn allocation_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// True when `remaining` is within one cent of zero.
pub fn is_settled(remaining: Decimal) -> bool {
    remaining.abs() < allocation_tolerance()
}

/// Running totals of a payment batch, recomputed after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// Sum of the totals of the selected invoices. Informational only.
    pub selected_total: Decimal,
    pub total_allocated: Decimal,
    /// Payment amount minus allocations. May be negative when over-allocated.
    pub remaining: Decimal,
}

impl Reconciliation {
    pub fn compute(
        payment_amount: Option<Decimal>,
        selected_total: Decimal,
        allocations: &AllocationTable,
    ) -> Self {
        let total_allocated = allocations.total();
        Self {
            selected_total,
            total_allocated,
            remaining: payment_amount
                .unwrap_or(Decimal::ZERO)
                .saturating_sub(total_allocated),
        }
    }

    pub fn is_settled(&self) -> bool {
        is_settled(self.remaining)
    }
}
