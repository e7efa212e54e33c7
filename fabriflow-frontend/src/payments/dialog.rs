use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::allocation::AllocationTable;
use super::batch::{Attachment, PaymentBatch, PaymentMethod};
use super::filter;
use super::reconciliation::Reconciliation;
use super::selection::{SelectionSet, Toggle};
use crate::models::money::{parse_allocation, parse_decimal, saturating_sum};
use crate::models::Invoice;

/// State of one multi-payment dialog session.
///
/// Created by [`PaymentDialog::open`] and thrown away on close. Every mutation
/// keeps the allocation keys inside the selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentDialog {
    invoices: Vec<Invoice>,
    search_term: String,
    selection: SelectionSet,
    allocations: AllocationTable,
    payment_amount: Option<Decimal>,
    payment_method: Option<PaymentMethod>,
    payment_reference: String,
    attachment: Option<Attachment>,
}

impl PaymentDialog {
    /// Starts a fresh dialog over the pending subset of `invoices`.
    pub fn open(invoices: &[Invoice]) -> Self {
        Self {
            invoices: filter::eligible_invoices(invoices),
            ..Self::default()
        }
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn allocations(&self) -> &AllocationTable {
        &self.allocations
    }

    pub fn payment_amount(&self) -> Option<Decimal> {
        self.payment_amount
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn payment_reference(&self) -> &str {
        &self.payment_reference
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn invoice(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| invoice.uuid == id)
    }

    /// Selects or deselects one invoice. Deselecting drops its allocation.
    /// Ids outside the dialog's invoices are ignored.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.invoice(id).is_none() {
            return false;
        }

        match self.selection.toggle(id) {
            Toggle::Added => {}
            Toggle::Removed => {
                self.allocations.remove(id);
            }
        }
        true
    }

    /// Replaces the selection with every invoice matching the current search.
    pub fn select_all_visible(&mut self) {
        let ids: Vec<String> = filter::search(&self.invoices, &self.search_term)
            .into_iter()
            .map(|invoice| invoice.uuid.clone())
            .collect();
        self.selection.replace(ids);
        self.allocations.retain(&self.selection);
    }

    /// Header checkbox: checking selects all visible rows, unchecking clears.
    pub fn set_all_visible(&mut self, checked: bool) {
        if checked {
            self.select_all_visible();
        } else {
            self.clear_selection();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.allocations.clear();
    }

    pub fn set_search(&mut self, term: &str) {
        self.search_term = term.trim().to_string();
    }

    pub fn set_payment_amount(&mut self, raw: &str) {
        self.payment_amount = parse_decimal(raw);
    }

    pub fn set_payment_method(&mut self, raw: &str) {
        self.payment_method = PaymentMethod::from_form(raw);
    }

    pub fn set_payment_reference(&mut self, raw: &str) {
        self.payment_reference = raw.trim().to_string();
    }

    pub fn set_attachment(&mut self, attachment: Option<Attachment>) {
        self.attachment = attachment;
    }

    /// Overwrites one invoice's allocation; unparsable input counts as zero.
    /// Unselected invoices cannot hold an allocation, so those are ignored.
    pub fn set_allocation(&mut self, id: &str, raw: &str) -> bool {
        if !self.selection.contains(id) {
            return false;
        }
        self.allocations.set(id, parse_allocation(raw));
        true
    }

    /// Recomputes every allocation with the greedy algorithm, discarding
    /// manual edits. Does nothing without an amount or a selection.
    pub fn auto_allocate(&mut self) -> bool {
        let Some(amount) = self.payment_amount else {
            return false;
        };
        if self.selection.is_empty() {
            return false;
        }

        let invoices = &self.invoices;
        self.allocations = AllocationTable::auto_allocate(amount, &self.selection, |id| {
            invoices
                .iter()
                .find(|invoice| invoice.uuid == id)
                .map(|invoice| invoice.total)
        });
        true
    }

    pub fn selected_total(&self) -> Decimal {
        saturating_sum(
            self.selection
                .ids()
                .iter()
                .filter_map(|id| self.invoice(id))
                .map(|invoice| invoice.total),
        )
    }

    pub fn reconciliation(&self) -> Reconciliation {
        Reconciliation::compute(self.payment_amount, self.selected_total(), &self.allocations)
    }

    /// Submission gate: selection, positive amount, method, reference, and
    /// a remainder within one cent of zero.
    pub fn is_valid(&self) -> bool {
        !self.selection.is_empty()
            && self.payment_amount.is_some_and(|amount| amount > Decimal::ZERO)
            && self.payment_method.is_some()
            && !self.payment_reference.is_empty()
            && self.reconciliation().is_settled()
    }

    /// Rows to render: search matches, selected ones first.
    pub fn visible_invoices(&self) -> Vec<&Invoice> {
        filter::display_order(
            filter::search(&self.invoices, &self.search_term),
            &self.selection,
        )
    }

    pub fn all_visible_selected(&self) -> bool {
        let visible = filter::search(&self.invoices, &self.search_term);
        !visible.is_empty()
            && visible
                .iter()
                .all(|invoice| self.selection.contains(&invoice.uuid))
    }

    /// The submittable batch, or `None` while the gate is not satisfied.
    pub fn batch(&self) -> Option<PaymentBatch> {
        if !self.is_valid() {
            return None;
        }

        Some(PaymentBatch {
            selected_invoice_ids: self.selection.ids().to_vec(),
            payment_amount: self.payment_amount?,
            payment_method: self.payment_method?,
            payment_reference: self.payment_reference.clone(),
            allocations: self.allocations.to_map(),
            attachment: self.attachment.clone(),
        })
    }

    /// Drops all state, as happens when the dialog closes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
            && self.allocations.is_empty()
            && self.payment_amount.is_none()
            && self.payment_method.is_none()
            && self.payment_reference.is_empty()
            && self.attachment.is_none()
    }
}
