//! Postgres-backed store.
//!
//! One parameterized statement per operation. Search uses `ILIKE` over the
//! joined invoice/customer columns, so a single `%query%` pattern is bound
//! once and reused.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use invoicedesk_auth::{DirectoryError, User, UserDirectory};
use invoicedesk_core::{CustomerId, InvoiceId, UserId};
use invoicedesk_invoicing::{Invoice, InvoiceChanges, InvoiceStatus, InvoiceSummary, NewInvoice};
use invoicedesk_parties::{CustomerField, CustomerSummary};

use super::{CustomerStore, InvoiceStore, Page, StoreError};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id        TEXT PRIMARY KEY,
        name      TEXT NOT NULL,
        email     TEXT NOT NULL,
        image_url TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invoices (
        id          TEXT PRIMARY KEY,
        customer_id TEXT NOT NULL REFERENCES customers (id),
        amount      BIGINT NOT NULL,
        status      TEXT NOT NULL CHECK (status IN ('pending', 'paid')),
        date        DATE NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id       TEXT PRIMARY KEY,
        name     TEXT NOT NULL,
        email    TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL
    )
    "#,
];

/// Postgres store over a shared connection pool.
///
/// `PgPool` is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("database schema ready");
        Ok(())
    }
}

fn like_pattern(query: &str) -> String {
    format!("%{query}%")
}

fn decode_status(raw: &str) -> Result<InvoiceStatus, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Decode(format!("unknown invoice status '{raw}'")))
}

fn invoice_from_row(row: &PgRow) -> Result<Invoice, StoreError> {
    Ok(Invoice {
        id: InvoiceId::from_string(row.try_get::<String, _>("id")?),
        customer_id: CustomerId::from_string(row.try_get::<String, _>("customer_id")?),
        amount: row.try_get("amount")?,
        status: decode_status(&row.try_get::<String, _>("status")?)?,
        date: row.try_get("date")?,
    })
}

fn summary_from_row(row: &PgRow) -> Result<InvoiceSummary, StoreError> {
    Ok(InvoiceSummary {
        id: InvoiceId::from_string(row.try_get::<String, _>("id")?),
        customer_id: CustomerId::from_string(row.try_get::<String, _>("customer_id")?),
        amount: row.try_get("amount")?,
        status: decode_status(&row.try_get::<String, _>("status")?)?,
        date: row.try_get("date")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        image_url: row.try_get("image_url")?,
    })
}

fn customer_field_from_row(row: &PgRow) -> Result<CustomerField, StoreError> {
    Ok(CustomerField {
        id: CustomerId::from_string(row.try_get::<String, _>("id")?),
        name: row.try_get("name")?,
    })
}

fn customer_summary_from_row(row: &PgRow) -> Result<CustomerSummary, StoreError> {
    Ok(CustomerSummary {
        id: CustomerId::from_string(row.try_get::<String, _>("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        image_url: row.try_get("image_url")?,
        total_invoices: row.try_get("total_invoices")?,
        total_pending: row.try_get("total_pending")?,
        total_paid: row.try_get("total_paid")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    Ok(User {
        id: UserId::from_string(row.try_get::<String, _>("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password")?,
    })
}

#[async_trait]
impl InvoiceStore for PostgresStore {
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO invoices (id, customer_id, amount, status, date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(invoice.id.as_str())
        .bind(invoice.customer_id.as_str())
        .bind(invoice.amount)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_invoice(&self, id: &InvoiceId, changes: InvoiceChanges) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET customer_id = $1, amount = $2, status = $3
            WHERE id = $4
            "#,
        )
        .bind(changes.customer_id.as_str())
        .bind(changes.amount)
        .bind(changes.status.as_str())
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_invoice(&self, id: &InvoiceId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn fetch_invoice_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, amount, status, date
            FROM invoices
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(invoice_from_row).transpose()
    }

    async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: Page,
    ) -> Result<Vec<InvoiceSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                invoices.id,
                invoices.customer_id,
                invoices.amount,
                invoices.status,
                invoices.date,
                customers.name,
                customers.email,
                customers.image_url
            FROM invoices
            JOIN customers ON invoices.customer_id = customers.id
            WHERE
                customers.name ILIKE $1 OR
                customers.email ILIKE $1 OR
                invoices.amount::text ILIKE $1 OR
                invoices.date::text ILIKE $1 OR
                invoices.status ILIKE $1
            ORDER BY invoices.date DESC, invoices.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(like_pattern(query))
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(summary_from_row).collect()
    }

    async fn count_filtered_invoices(&self, query: &str) -> Result<u64, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM invoices
            JOIN customers ON invoices.customer_id = customers.id
            WHERE
                customers.name ILIKE $1 OR
                customers.email ILIKE $1 OR
                invoices.amount::text ILIKE $1 OR
                invoices.date::text ILIKE $1 OR
                invoices.status ILIKE $1
            "#,
        )
        .bind(like_pattern(query))
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl CustomerStore for PostgresStore {
    async fn fetch_customers(&self) -> Result<Vec<CustomerField>, StoreError> {
        let rows = sqlx::query("SELECT id, name FROM customers ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(customer_field_from_row).collect()
    }

    async fn fetch_filtered_customers(&self, query: &str) -> Result<Vec<CustomerSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                customers.id,
                customers.name,
                customers.email,
                customers.image_url,
                COUNT(invoices.id) AS total_invoices,
                COALESCE(SUM(CASE WHEN invoices.status = 'pending' THEN invoices.amount ELSE 0 END), 0)::BIGINT AS total_pending,
                COALESCE(SUM(CASE WHEN invoices.status = 'paid' THEN invoices.amount ELSE 0 END), 0)::BIGINT AS total_paid
            FROM customers
            LEFT JOIN invoices ON customers.id = invoices.customer_id
            WHERE
                customers.name ILIKE $1 OR
                customers.email ILIKE $1
            GROUP BY customers.id, customers.name, customers.email, customers.image_url
            ORDER BY customers.name ASC
            "#,
        )
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(customer_summary_from_row).collect()
    }
}

#[async_trait]
impl UserDirectory for PostgresStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let row = sqlx::query("SELECT id, name, email, password FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_query() {
        assert_eq!(like_pattern("lee"), "%lee%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        assert!(matches!(decode_status("void"), Err(StoreError::Decode(_))));
        assert_eq!(decode_status("paid").unwrap(), InvoiceStatus::Paid);
    }
}
