//! Multi-invoice payment allocation.
//!
//! A user picks several pending invoices, enters one payment amount and
//! distributes it across them, by hand or with [`AllocationTable::auto_allocate`].
//! Submission is allowed only once the amount is fully allocated.

pub mod allocation;
pub mod batch;
pub mod dialog;
pub mod filter;
pub mod reconciliation;
pub mod selection;

pub use allocation::AllocationTable;
pub use batch::{submit, Attachment, ClosePolicy, PaymentBatch, PaymentMethod, SubmitOutcome};
pub use dialog::PaymentDialog;
pub use reconciliation::Reconciliation;
pub use selection::SelectionSet;
