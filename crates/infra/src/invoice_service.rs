//! Invoice mutation service.
//!
//! Pipeline per mutation: validate → one SQL statement → invalidate the
//! invoice-list route → redirect (create/update) or status message (delete).
//! Failures come back as [`MutationError`] values, never as panics.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use invoicedesk_core::InvoiceId;
use invoicedesk_invoicing::{
    FormMode, InvoiceChanges, InvoiceForm, NewInvoice, ValidationFailure, validate_invoice_form,
};

use crate::route_cache::RouteCache;
use crate::store::InvoiceStore;

/// Route whose cached renders list invoices; also where mutations land.
pub const INVOICES_ROUTE: &str = "/dashboard/invoices";

const CREATE_FAILED: &str = "Database Error: Failed to Create Invoice.";
const UPDATE_FAILED: &str = "Database Error: Failed to Update Invoice.";
const DELETE_FAILED: &str = "Database Error: Failed to Delete Invoice.";
const DELETED: &str = "Deleted Invoice.";

/// Source of "today" for new invoices.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Navigate the client to this path.
    Redirect(String),
    Deleted { message: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// Bad input; the store was never touched.
    #[error("{}", .0.message)]
    Validation(ValidationFailure),

    /// The statement failed or the store was unreachable.
    #[error("{message}")]
    Persistence { message: String },
}

impl MutationError {
    fn persistence(message: &str) -> Self {
        Self::Persistence {
            message: message.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<dyn InvoiceStore>,
    cache: Arc<dyn RouteCache>,
    clock: Clock,
}

impl InvoiceService {
    /// Service dated by the UTC calendar.
    pub fn new(store: Arc<dyn InvoiceStore>, cache: Arc<dyn RouteCache>) -> Self {
        Self::with_clock(store, cache, Arc::new(|| Utc::now().date_naive()))
    }

    pub fn with_clock(store: Arc<dyn InvoiceStore>, cache: Arc<dyn RouteCache>, clock: Clock) -> Self {
        Self { store, cache, clock }
    }

    pub async fn create(&self, form: &InvoiceForm) -> Result<MutationOutcome, MutationError> {
        let valid = validate_invoice_form(form, FormMode::Create).map_err(MutationError::Validation)?;

        let invoice = NewInvoice {
            id: InvoiceId::new(),
            customer_id: valid.customer_id.clone(),
            amount: valid.amount_in_cents(),
            status: valid.status,
            date: (self.clock)(),
        };
        let invoice_id = invoice.id.clone();

        if let Err(e) = self.store.insert_invoice(invoice).await {
            tracing::error!(error = %e, "failed to create invoice");
            return Err(MutationError::persistence(CREATE_FAILED));
        }

        tracing::info!(invoice_id = %invoice_id, customer_id = %valid.customer_id, "invoice created");
        Ok(self.revalidate_and_redirect())
    }

    /// Update an invoice. An id that matches no row is still reported as
    /// success; there is no existence check.
    pub async fn update(
        &self,
        id: &InvoiceId,
        form: &InvoiceForm,
    ) -> Result<MutationOutcome, MutationError> {
        let valid = validate_invoice_form(form, FormMode::Update).map_err(MutationError::Validation)?;

        let amount = valid.amount_in_cents();
        let changes = InvoiceChanges {
            customer_id: valid.customer_id,
            amount,
            status: valid.status,
        };

        match self.store.update_invoice(id, changes).await {
            Ok(0) => tracing::debug!(invoice_id = %id, "update matched no invoice"),
            Ok(_) => tracing::info!(invoice_id = %id, "invoice updated"),
            Err(e) => {
                tracing::error!(invoice_id = %id, error = %e, "failed to update invoice");
                return Err(MutationError::persistence(UPDATE_FAILED));
            }
        }

        Ok(self.revalidate_and_redirect())
    }

    pub async fn delete(&self, id: &InvoiceId) -> Result<MutationOutcome, MutationError> {
        match self.store.delete_invoice(id).await {
            Ok(removed) => {
                tracing::info!(invoice_id = %id, removed, "invoice deleted");
                self.cache.invalidate(INVOICES_ROUTE);
                Ok(MutationOutcome::Deleted {
                    message: DELETED.to_string(),
                })
            }
            Err(e) => {
                tracing::error!(invoice_id = %id, error = %e, "failed to delete invoice");
                Err(MutationError::persistence(DELETE_FAILED))
            }
        }
    }

    fn revalidate_and_redirect(&self) -> MutationOutcome {
        self.cache.invalidate(INVOICES_ROUTE);
        MutationOutcome::Redirect(INVOICES_ROUTE.to_string())
    }
}
