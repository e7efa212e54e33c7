use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::selection::SelectionSet;
use crate::models::money::saturating_sum;

/// Amount assigned to each selected invoice.
///
/// Keys must always be a subset of the current [`SelectionSet`]; callers that
/// shrink the selection are expected to call [`AllocationTable::retain`] or
/// [`AllocationTable::remove`] in the same step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationTable {
    entries: BTreeMap<String, Decimal>,
}

impl AllocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites a single entry. Other invoices are left untouched.
    pub fn set(&mut self, id: &str, amount: Decimal) {
        self.entries.insert(id.to_string(), amount.max(Decimal::ZERO));
    }

    pub fn get(&self, id: &str) -> Option<Decimal> {
        self.entries.get(id).copied()
    }

    pub fn remove(&mut self, id: &str) -> Option<Decimal> {
        self.entries.remove(id)
    }

    /// Drops every entry whose invoice is no longer selected.
    pub fn retain(&mut self, selection: &SelectionSet) {
        self.entries.retain(|id, _| selection.contains(id));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn total(&self) -> Decimal {
        saturating_sum(self.entries.values().copied())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.entries.iter().map(|(id, amount)| (id.as_str(), *amount))
    }

    pub fn keys_within(&self, selection: &SelectionSet) -> bool {
        self.entries.keys().all(|id| selection.contains(id))
    }

    pub fn to_map(&self) -> BTreeMap<String, Decimal> {
        self.entries.clone()
    }

    /// Greedy first-fit distribution of `amount` over `selection`, in selection order.
    ///
    /// Each invoice takes `min(remaining, total)` until the amount runs out;
    /// later invoices get zero. Whatever exceeds the sum of totals stays
    /// unassigned. Ids that `total_of` does not know are skipped.
    pub fn auto_allocate<F>(amount: Decimal, selection: &SelectionSet, total_of: F) -> Self
    where
        F: Fn(&str) -> Option<Decimal>,
    {
        let mut remaining = amount;
        let mut table = Self::new();

        for id in selection.ids() {
            let Some(invoice_total) = total_of(id) else {
                continue;
            };

            let allocation = if remaining <= Decimal::ZERO {
                Decimal::ZERO
            } else {
                remaining.min(invoice_total.max(Decimal::ZERO))
            };

            table.set(id, allocation);
            remaining -= allocation;
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn totals(id: &str) -> Option<Decimal> {
        match id {
            "inv1" => Some(dec("100")),
            "inv2" => Some(dec("250")),
            "inv3" => Some(dec("89.99")),
            _ => None,
        }
    }

    fn selection(ids: &[&str]) -> SelectionSet {
        let mut selection = SelectionSet::new();
        selection.replace(ids.iter().copied());
        selection
    }

    #[test]
    fn fills_invoices_in_selection_order() {
        let table =
            AllocationTable::auto_allocate(dec("300"), &selection(&["inv1", "inv2", "inv3"]), totals);
        assert_eq!(table.get("inv1"), Some(dec("100")));
        assert_eq!(table.get("inv2"), Some(dec("200")));
        assert_eq!(table.get("inv3"), Some(Decimal::ZERO));
        assert_eq!(table.total(), dec("300"));
    }

    #[test]
    fn surplus_stays_unassigned() {
        let table = AllocationTable::auto_allocate(dec("1000"), &selection(&["inv1", "inv3"]), totals);
        assert_eq!(table.get("inv1"), Some(dec("100")));
        assert_eq!(table.get("inv3"), Some(dec("89.99")));
        assert_eq!(table.total(), dec("189.99"));
    }

    #[test]
    fn unknown_ids_are_skipped() {
        let table = AllocationTable::auto_allocate(dec("50"), &selection(&["ghost", "inv1"]), totals);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("inv1"), Some(dec("50")));
    }

    #[test]
    fn zero_amount_allocates_zeros() {
        let table = AllocationTable::auto_allocate(Decimal::ZERO, &selection(&["inv1", "inv2"]), totals);
        assert_eq!(table.get("inv1"), Some(Decimal::ZERO));
        assert_eq!(table.get("inv2"), Some(Decimal::ZERO));
    }

    #[test]
    fn retain_drops_deselected_entries() {
        let mut table = AllocationTable::new();
        table.set("inv1", dec("10"));
        table.set("inv2", dec("20"));

        let selected = selection(&["inv2"]);
        table.retain(&selected);
        assert!(table.keys_within(&selected));
        assert_eq!(table.total(), dec("20"));
    }

    #[test]
    fn set_clamps_negative_amounts() {
        let mut table = AllocationTable::new();
        table.set("inv1", dec("-5"));
        assert_eq!(table.get("inv1"), Some(Decimal::ZERO));
    }
}
