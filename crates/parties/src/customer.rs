use serde::{Deserialize, Serialize};

use invoicedesk_core::{CustomerId, Entity};

/// A customer as stored in `customers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub image_url: String,
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Customer {
    /// Case-insensitive substring match on name or email.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.email.to_lowercase().contains(&needle)
    }

    pub fn to_field(&self) -> CustomerField {
        CustomerField {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Minimal projection used to populate the customer picker on invoice forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerField {
    pub id: CustomerId,
    pub name: String,
}

/// Customer row with invoice totals (amounts in cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub total_invoices: i64,
    pub total_pending: i64,
    pub total_paid: i64,
}

impl CustomerSummary {
    pub fn without_invoices(customer: &Customer) -> Self {
        Self {
            id: customer.id.clone(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            image_url: customer.image_url.clone(),
            total_invoices: 0,
            total_pending: 0,
            total_paid: 0,
        }
    }
}
