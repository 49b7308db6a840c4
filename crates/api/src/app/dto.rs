use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use url::{Position, Url};

use invoicedesk_infra::Page;
use invoicedesk_invoicing::{InvoiceSummary, cents_to_major};
use invoicedesk_parties::CustomerSummary;

// -------------------------
// Request DTOs
// -------------------------

/// `?query=&page=` on the invoice list. Both stay raw strings so a bad page
/// number falls back to page 1 instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListInvoicesQuery {
    pub query: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPageQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

/// Cache variant key for one rendering of the invoice list.
pub fn invoice_list_cache_key(query: &str, page: Page) -> String {
    format!("query={query}&page={}", page.number)
}

pub fn invoice_summary_to_json(row: &InvoiceSummary) -> JsonValue {
    json!({
        "id": row.id,
        "customerId": row.customer_id,
        "name": row.name,
        "email": row.email,
        "imageUrl": row.image_url,
        "amount": cents_to_major(row.amount),
        "amountInCents": row.amount,
        "status": row.status,
        "date": row.date.format("%Y-%m-%d").to_string(),
    })
}

pub fn invoice_page_to_json(rows: &[InvoiceSummary], total_pages: u64, page: Page, query: &str) -> JsonValue {
    json!({
        "items": rows.iter().map(invoice_summary_to_json).collect::<Vec<_>>(),
        "totalPages": total_pages,
        "currentPage": page.number,
        "query": query,
    })
}

pub fn customer_summary_to_json(row: &CustomerSummary) -> JsonValue {
    json!({
        "id": row.id,
        "name": row.name,
        "email": row.email,
        "imageUrl": row.image_url,
        "totalInvoices": row.total_invoices,
        "totalPending": cents_to_major(row.total_pending),
        "totalPaid": cents_to_major(row.total_paid),
    })
}

/// Origin that callback paths are resolved against; never sent to clients.
const CALLBACK_BASE: &str = "http://callback.invalid/";

/// Where to send a user after sign-in. Only same-origin paths are honored.
///
/// The value is resolved the way a browser would (`\` counts as `/`, tabs
/// and newlines are dropped), and anything that lands on another origin
/// falls back to `default`. The normalized path is returned.
pub fn safe_callback(raw: Option<&str>, default: &str) -> String {
    let Some(raw) = raw.map(str::trim).filter(|p| p.starts_with('/')) else {
        return default.to_string();
    };
    if raw.chars().any(char::is_control) {
        return default.to_string();
    }

    let Ok(base) = Url::parse(CALLBACK_BASE) else {
        return default.to_string();
    };
    match base.join(raw) {
        Ok(resolved) if resolved.origin() == base.origin() => resolved[Position::BeforePath..].to_string(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use invoicedesk_core::{CustomerId, InvoiceId};
    use invoicedesk_invoicing::InvoiceStatus;

    #[test]
    fn cache_key_includes_query_and_page() {
        assert_eq!(invoice_list_cache_key("lee", Page::new(2, 6)), "query=lee&page=2");
        assert_eq!(invoice_list_cache_key("", Page::new(1, 6)), "query=&page=1");
    }

    #[test]
    fn summary_json_shows_major_units_and_iso_date() {
        let row = InvoiceSummary {
            id: InvoiceId::from_string("i1"),
            customer_id: CustomerId::from_string("c1"),
            amount: 1550,
            status: InvoiceStatus::Pending,
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            name: "Lee Robinson".to_string(),
            email: "lee@robinson.com".to_string(),
            image_url: "/customers/lee-robinson.png".to_string(),
        };
        let json = invoice_summary_to_json(&row);
        assert_eq!(json["amount"], 15.5);
        assert_eq!(json["amountInCents"], 1550);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["date"], "2024-03-09");
        assert_eq!(json["id"], "i1");
    }

    #[test]
    fn callback_must_be_a_local_path() {
        assert_eq!(safe_callback(Some("/dashboard/invoices"), "/dashboard"), "/dashboard/invoices");
        assert_eq!(safe_callback(Some("https://evil.example"), "/dashboard"), "/dashboard");
        assert_eq!(safe_callback(Some("//evil.example"), "/dashboard"), "/dashboard");
        assert_eq!(safe_callback(None, "/dashboard"), "/dashboard");
    }

    #[test]
    fn callback_that_browsers_read_as_another_host_is_refused() {
        for raw in ["/\\evil.example", "/\\/evil.example", "\\\\evil.example", "/\t/evil.example", "/\n/evil.example"] {
            assert_eq!(safe_callback(Some(raw), "/dashboard"), "/dashboard", "input {raw:?}");
        }
    }

    #[test]
    fn accepted_callback_keeps_path_and_query() {
        assert_eq!(
            safe_callback(Some("/dashboard/invoices?query=lee&page=2"), "/dashboard"),
            "/dashboard/invoices?query=lee&page=2"
        );
        assert_eq!(safe_callback(Some("/dashboard/../login"), "/dashboard"), "/login");
    }
}
