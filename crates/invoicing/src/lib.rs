//! Invoicing domain module.
//!
//! Invoice records plus the form schema that turns raw submissions into
//! typed mutations. Deterministic domain logic only (no IO, no HTTP, no storage).

pub mod form;
pub mod invoice;

pub use form::{FieldErrors, FormMode, InvoiceForm, ValidatedInvoice, ValidationFailure, validate_invoice_form};
pub use invoice::{
    Invoice, InvoiceChanges, InvoiceEditView, InvoiceStatus, InvoiceSummary, NewInvoice,
    cents_to_major,
};
