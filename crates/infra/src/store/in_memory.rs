//! In-memory store for tests/dev.
//!
//! Mirrors the relational behavior the service relies on: unique invoice
//! ids, the customer foreign key, exact-email user lookup and the
//! case-insensitive search over the joined invoice/customer columns.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use invoicedesk_auth::{DirectoryError, User, UserDirectory};
use invoicedesk_core::InvoiceId;
use invoicedesk_invoicing::{Invoice, InvoiceChanges, InvoiceStatus, InvoiceSummary, NewInvoice};
use invoicedesk_parties::{Customer, CustomerField, CustomerSummary};

use super::{CustomerStore, InvoiceStore, Page, StoreError};

#[derive(Debug, Default)]
struct Tables {
    invoices: Vec<Invoice>,
    customers: Vec<Customer>,
    users: Vec<User>,
}

#[derive(Debug)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    available: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the store going away: every call fails with `Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn insert_customer(&self, customer: Customer) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.customers.iter().any(|c| c.id == customer.id) {
            return Err(StoreError::Database(format!(
                "duplicate key value violates unique constraint \"customers_pkey\" ({})",
                customer.id
            )));
        }
        tables.customers.push(customer);
        Ok(())
    }

    pub fn insert_user(&self, user: User) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Database(format!(
                "duplicate key value violates unique constraint \"users_email_key\" ({})",
                user.email
            )));
        }
        tables.users.push(user);
        Ok(())
    }

    /// Snapshot of all stored invoices, in insertion order.
    pub fn invoices(&self) -> Result<Vec<Invoice>, StoreError> {
        Ok(self.read()?.invoices.clone())
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.ensure_available()?;
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.ensure_available()?;
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn filtered(tables: &Tables, query: &str) -> Vec<InvoiceSummary> {
        let mut rows: Vec<InvoiceSummary> = tables
            .invoices
            .iter()
            .filter_map(|inv| {
                let customer = tables.customers.iter().find(|c| c.id == inv.customer_id)?;
                Some(InvoiceSummary {
                    id: inv.id.clone(),
                    customer_id: inv.customer_id.clone(),
                    amount: inv.amount,
                    status: inv.status,
                    date: inv.date,
                    name: customer.name.clone(),
                    email: customer.email.clone(),
                    image_url: customer.image_url.clone(),
                })
            })
            .filter(|row| row.matches(query))
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        rows
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.invoices.iter().any(|i| i.id == invoice.id) {
            return Err(StoreError::Database(format!(
                "duplicate key value violates unique constraint \"invoices_pkey\" ({})",
                invoice.id
            )));
        }
        if !tables.customers.iter().any(|c| c.id == invoice.customer_id) {
            return Err(StoreError::Database(format!(
                "insert violates foreign key constraint \"invoices_customer_id_fkey\" ({})",
                invoice.customer_id
            )));
        }
        tables.invoices.push(invoice.into_invoice());
        Ok(())
    }

    async fn update_invoice(&self, id: &InvoiceId, changes: InvoiceChanges) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        // Like SQL, the foreign key is only checked against rows the WHERE matched.
        if !tables.invoices.iter().any(|i| &i.id == id) {
            return Ok(0);
        }
        if !tables.customers.iter().any(|c| c.id == changes.customer_id) {
            return Err(StoreError::Database(format!(
                "update violates foreign key constraint \"invoices_customer_id_fkey\" ({})",
                changes.customer_id
            )));
        }
        let mut matched = 0;
        for invoice in tables.invoices.iter_mut().filter(|i| &i.id == id) {
            invoice.customer_id = changes.customer_id.clone();
            invoice.amount = changes.amount;
            invoice.status = changes.status;
            matched += 1;
        }
        Ok(matched)
    }

    async fn delete_invoice(&self, id: &InvoiceId) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        let before = tables.invoices.len();
        tables.invoices.retain(|i| &i.id != id);
        Ok((before - tables.invoices.len()) as u64)
    }

    async fn fetch_invoice_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, StoreError> {
        Ok(self.read()?.invoices.iter().find(|i| &i.id == id).cloned())
    }

    async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: Page,
    ) -> Result<Vec<InvoiceSummary>, StoreError> {
        let tables = self.read()?;
        Ok(Self::filtered(&tables, query)
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect())
    }

    async fn count_filtered_invoices(&self, query: &str) -> Result<u64, StoreError> {
        let tables = self.read()?;
        Ok(Self::filtered(&tables, query).len() as u64)
    }
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn fetch_customers(&self) -> Result<Vec<CustomerField>, StoreError> {
        let tables = self.read()?;
        let mut fields: Vec<CustomerField> = tables.customers.iter().map(Customer::to_field).collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fields)
    }

    async fn fetch_filtered_customers(&self, query: &str) -> Result<Vec<CustomerSummary>, StoreError> {
        let tables = self.read()?;
        let mut rows: Vec<CustomerSummary> = tables
            .customers
            .iter()
            .filter(|c| c.matches(query))
            .map(|c| {
                let mut summary = CustomerSummary::without_invoices(c);
                for inv in tables.invoices.iter().filter(|i| i.customer_id == c.id) {
                    summary.total_invoices += 1;
                    match inv.status {
                        InvoiceStatus::Pending => summary.total_pending += inv.amount,
                        InvoiceStatus::Paid => summary.total_paid += inv.amount,
                    }
                }
                summary
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let tables = self.read()?;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use invoicedesk_core::{CustomerId, UserId};

    fn customer(id: &str, name: &str) -> Customer {
        Customer {
            id: CustomerId::from_string(id),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            image_url: format!("/customers/{id}.png"),
        }
    }

    fn new_invoice(id: &str, customer: &str, amount: i64, status: InvoiceStatus, day: u32) -> NewInvoice {
        NewInvoice {
            id: InvoiceId::from_string(id),
            customer_id: CustomerId::from_string(customer),
            amount,
            status,
            date: NaiveDate::from_ymd_opt(2023, 6, day).unwrap(),
        }
    }

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert_customer(customer("c1", "Lee Robinson")).unwrap();
        store.insert_customer(customer("c2", "Amy Burns")).unwrap();
        for day in 1..=8 {
            let (cust, status) = if day % 2 == 0 {
                ("c1", InvoiceStatus::Paid)
            } else {
                ("c2", InvoiceStatus::Pending)
            };
            store
                .insert_invoice(new_invoice(&format!("i{day}"), cust, 100 * day as i64, status, day))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn filtered_invoices_are_newest_first_and_paged() {
        let store = seeded().await;

        let first = store.fetch_filtered_invoices("", Page::new(1, 6)).await.unwrap();
        assert_eq!(first.len(), 6);
        assert_eq!(first[0].id.as_str(), "i8");
        assert_eq!(first[5].id.as_str(), "i3");

        let second = store.fetch_filtered_invoices("", Page::new(2, 6)).await.unwrap();
        let ids: Vec<&str> = second.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["i2", "i1"]);
    }

    #[tokio::test]
    async fn search_matches_customer_and_invoice_columns() {
        let store = seeded().await;
        assert_eq!(store.count_filtered_invoices("lee").await.unwrap(), 4);
        assert_eq!(store.count_filtered_invoices("PENDING").await.unwrap(), 4);
        assert_eq!(store.count_filtered_invoices("2023-06-05").await.unwrap(), 1);
        assert_eq!(store.count_filtered_invoices("800").await.unwrap(), 1);
        assert_eq!(store.count_filtered_invoices("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_invoice_id_is_rejected() {
        let store = seeded().await;
        let err = store
            .insert_invoice(new_invoice("i1", "c1", 1, InvoiceStatus::Paid, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[tokio::test]
    async fn unknown_customer_violates_foreign_key() {
        let store = seeded().await;
        let err = store
            .insert_invoice(new_invoice("i9", "ghost", 1, InvoiceStatus::Paid, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(msg) if msg.contains("foreign key")));
    }

    #[tokio::test]
    async fn update_checks_foreign_key_only_on_matched_rows() {
        let store = seeded().await;
        let changes = InvoiceChanges {
            customer_id: CustomerId::from_string("ghost"),
            amount: 1,
            status: InvoiceStatus::Paid,
        };

        let matched = store
            .update_invoice(&InvoiceId::from_string("missing"), changes.clone())
            .await
            .unwrap();
        assert_eq!(matched, 0);

        let err = store
            .update_invoice(&InvoiceId::from_string("i1"), changes)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(msg) if msg.contains("foreign key")));
    }

    #[tokio::test]
    async fn update_and_delete_report_affected_rows() {
        let store = seeded().await;
        let changes = InvoiceChanges {
            customer_id: CustomerId::from_string("c1"),
            amount: 42,
            status: InvoiceStatus::Paid,
        };
        assert_eq!(store.update_invoice(&InvoiceId::from_string("i1"), changes.clone()).await.unwrap(), 1);
        assert_eq!(store.update_invoice(&InvoiceId::from_string("missing"), changes).await.unwrap(), 0);

        let updated = store.fetch_invoice_by_id(&InvoiceId::from_string("i1")).await.unwrap().unwrap();
        assert_eq!(updated.amount, 42);
        assert_eq!(updated.date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());

        assert_eq!(store.delete_invoice(&InvoiceId::from_string("i1")).await.unwrap(), 1);
        assert_eq!(store.delete_invoice(&InvoiceId::from_string("i1")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn customer_totals_split_by_status() {
        let store = seeded().await;
        let rows = store.fetch_filtered_customers("").await.unwrap();
        assert_eq!(rows[0].name, "Amy Burns");
        assert_eq!(rows[0].total_invoices, 4);
        assert_eq!(rows[0].total_pending, 100 + 300 + 500 + 700);
        assert_eq!(rows[0].total_paid, 0);
        assert_eq!(rows[1].total_paid, 200 + 400 + 600 + 800);

        let fields = store.fetch_customers().await.unwrap();
        assert_eq!(fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["Amy Burns", "Lee Robinson"]);
    }

    #[tokio::test]
    async fn user_lookup_is_exact_on_email() {
        let store = InMemoryStore::new();
        store
            .insert_user(User {
                id: UserId::from_string("u1"),
                name: "User".to_string(),
                email: "user@nextmail.com".to_string(),
                password_hash: "x".to_string(),
            })
            .unwrap();
        assert!(store.find_user_by_email("user@nextmail.com").await.unwrap().is_some());
        assert!(store.find_user_by_email("USER@nextmail.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = seeded().await;
        store.set_available(false);
        assert!(matches!(
            store.count_filtered_invoices("").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.find_user_by_email("user@nextmail.com").await.is_err());
    }
}
