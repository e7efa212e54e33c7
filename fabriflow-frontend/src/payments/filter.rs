//! Narrowing the invoice list down to what can be paid.

use crate::models::Invoice;

use super::selection::SelectionSet;

pub fn is_eligible(invoice: &Invoice) -> bool {
    invoice.status.is_payable()
}

/// Pending invoices, in their original order.
pub fn eligible_invoices(invoices: &[Invoice]) -> Vec<Invoice> {
    invoices.iter().filter(|i| is_eligible(i)).cloned().collect()
}

/// Case-insensitive substring match on folio, company or issuer name.
pub fn matches_search(invoice: &Invoice, term: &str) -> bool {
    let needle = term.to_lowercase();
    invoice.folio.to_lowercase().contains(&needle)
        || invoice.company.to_lowercase().contains(&needle)
        || invoice.issuer_name.to_lowercase().contains(&needle)
}

pub fn search<'a>(invoices: &'a [Invoice], term: &str) -> Vec<&'a Invoice> {
    invoices
        .iter()
        .filter(|invoice| matches_search(invoice, term))
        .collect()
}

/// Selected invoices first, otherwise keeping the given order.
pub fn display_order<'a>(mut visible: Vec<&'a Invoice>, selection: &SelectionSet) -> Vec<&'a Invoice> {
    visible.sort_by_key(|invoice| !selection.contains(&invoice.uuid));
    visible
}
