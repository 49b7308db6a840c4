//! Relational store ports.
//!
//! Each mutating method maps to exactly one SQL statement; the store is
//! responsible for per-statement atomicity and uniqueness constraints.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use invoicedesk_auth::DirectoryError;
use invoicedesk_core::InvoiceId;
use invoicedesk_invoicing::{Invoice, InvoiceChanges, InvoiceSummary, NewInvoice};
use invoicedesk_parties::{CustomerField, CustomerSummary};

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Invoices shown per page of the invoice table.
pub const ITEMS_PER_PAGE: u32 = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (pool exhausted, connection refused, ...).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store was reached but rejected the statement.
    #[error("database error: {0}")]
    Database(String),

    #[error("failed to decode row: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
                StoreError::Decode(err.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

impl From<StoreError> for DirectoryError {
    fn from(err: StoreError) -> Self {
        DirectoryError(err.to_string())
    }
}

/// 1-based page of the invoice table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    /// Parse a `?page=` parameter. Missing, non-numeric or `< 1` → page 1.
    pub fn from_param(raw: Option<&str>, size: u32) -> Self {
        let number = raw
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|n| *n >= 1)
            .map(|n| n.min(u32::MAX as i64) as u32)
            .unwrap_or(1);
        Self::new(number, size)
    }

    pub fn offset(&self) -> u64 {
        (self.number as u64 - 1) * self.size as u64
    }
}

/// `ceil(count / page_size)`.
pub fn total_pages(count: u64, page_size: u32) -> u64 {
    count.div_ceil(page_size.max(1) as u64)
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// `INSERT INTO invoices ...`
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<(), StoreError>;

    /// `UPDATE invoices ... WHERE id = $id`. Returns the number of rows matched.
    async fn update_invoice(&self, id: &InvoiceId, changes: InvoiceChanges) -> Result<u64, StoreError>;

    /// `DELETE FROM invoices WHERE id = $id`. Returns the number of rows removed.
    async fn delete_invoice(&self, id: &InvoiceId) -> Result<u64, StoreError>;

    async fn fetch_invoice_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, StoreError>;

    /// Invoices joined with customers, filtered by `query`, newest first.
    async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: Page,
    ) -> Result<Vec<InvoiceSummary>, StoreError>;

    async fn count_filtered_invoices(&self, query: &str) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// All customers as `{id, name}`, ordered by name.
    async fn fetch_customers(&self) -> Result<Vec<CustomerField>, StoreError>;

    /// Customers matching name/email with invoice totals, ordered by name.
    async fn fetch_filtered_customers(&self, query: &str) -> Result<Vec<CustomerSummary>, StoreError>;
}
