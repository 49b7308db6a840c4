use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use invoicedesk_core::{CustomerId, DomainError, Entity, InvoiceId};

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for InvoiceStatus {
    type Err = DomainError;

    /// Exact, case-sensitive match on the stored literal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(DomainError::validation(format!("unknown invoice status '{other}'"))),
        }
    }
}

/// A stored invoice row. Amount is in the smallest currency unit (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Values for a single INSERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

impl NewInvoice {
    pub fn into_invoice(self) -> Invoice {
        Invoice {
            id: self.id,
            customer_id: self.customer_id,
            amount: self.amount,
            status: self.status,
            date: self.date,
        }
    }
}

/// Values for a single UPDATE. The creation date is never rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceChanges {
    pub customer_id: CustomerId,
    pub amount: i64,
    pub status: InvoiceStatus,
}

/// Invoice joined with its customer, as shown in the invoice table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
    pub name: String,
    pub email: String,
    pub image_url: String,
}

impl InvoiceSummary {
    /// Case-insensitive substring match over the searchable columns:
    /// customer name and email, amount, date and status as text.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        [
            self.name.to_lowercase(),
            self.email.to_lowercase(),
            self.amount.to_string(),
            self.date.format("%Y-%m-%d").to_string(),
            self.status.as_str().to_string(),
        ]
        .iter()
        .any(|haystack| haystack.contains(&needle))
    }
}

/// Invoice prepared for the edit form; amount in major units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceEditView {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    pub amount: f64,
    pub status: InvoiceStatus,
}

impl From<Invoice> for InvoiceEditView {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            customer_id: invoice.customer_id,
            amount: cents_to_major(invoice.amount),
            status: invoice.status,
        }
    }
}

pub fn cents_to_major(cents: i64) -> f64 {
    cents as f64 / 100.0
}
