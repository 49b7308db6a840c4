//! Invoice form schema.
//!
//! Raw submissions arrive as a flat map of optional strings. Validation
//! coerces them into a [`ValidatedInvoice`] or reports every failing field
//! at once, together with a single summary message for the form banner.

use serde::{Deserialize, Serialize};

use invoicedesk_core::CustomerId;

use crate::invoice::InvoiceStatus;

pub const CUSTOMER_REQUIRED: &str = "Please select a customer.";
pub const AMOUNT_NOT_POSITIVE: &str = "Please enter an amount greater than $0.";
pub const AMOUNT_TOO_LARGE: &str = "Amount is too large.";
pub const STATUS_REQUIRED: &str = "Please select an invoice status.";

/// Raw invoice form fields, exactly as posted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceForm {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Which mutation the form feeds; only changes the summary message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update,
}

impl FormMode {
    fn failure_message(&self) -> &'static str {
        match self {
            FormMode::Create => "Missing Fields. Failed to Create Invoice.",
            FormMode::Update => "Missing Fields. Failed to Update Invoice.",
        }
    }
}

/// A form that passed the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInvoice {
    pub customer_id: CustomerId,
    /// Major currency units, strictly positive.
    pub amount: f64,
    pub status: InvoiceStatus,
    amount_in_cents: i64,
}

impl ValidatedInvoice {
    /// `round(amount * 100)`.
    pub fn amount_in_cents(&self) -> i64 {
        self.amount_in_cents
    }
}

/// Per-field error lists. Empty lists are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub customer_id: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub amount: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    #[serde(rename = "errors")]
    pub field_errors: FieldErrors,
    pub message: String,
}

/// Validate a raw invoice form.
pub fn validate_invoice_form(
    form: &InvoiceForm,
    mode: FormMode,
) -> Result<ValidatedInvoice, ValidationFailure> {
    let mut errors = FieldErrors::default();

    let customer_id = match form.customer_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Some(CustomerId::from_string(id)),
        _ => {
            errors.customer_id.push(CUSTOMER_REQUIRED.to_string());
            None
        }
    };

    let amount = match coerce_amount(form.amount.as_deref()) {
        Ok(amount) => Some(amount),
        Err(msg) => {
            errors.amount.push(msg.to_string());
            None
        }
    };

    let status = match form.status.as_deref().map(str::parse::<InvoiceStatus>) {
        Some(Ok(status)) => Some(status),
        _ => {
            errors.status.push(STATUS_REQUIRED.to_string());
            None
        }
    };

    match (customer_id, amount, status) {
        (Some(customer_id), Some((amount, amount_in_cents)), Some(status)) => Ok(ValidatedInvoice {
            customer_id,
            amount,
            status,
            amount_in_cents,
        }),
        _ => Err(ValidationFailure {
            field_errors: errors,
            message: mode.failure_message().to_string(),
        }),
    }
}

/// Coerce a raw amount into `(major units, cents)`.
///
/// Absent and blank inputs coerce to zero and therefore fail the `> 0` rule.
fn coerce_amount(raw: Option<&str>) -> Result<(f64, i64), &'static str> {
    let trimmed = raw.map(str::trim).unwrap_or("");
    let amount = if trimmed.is_empty() {
        0.0
    } else {
        trimmed.parse::<f64>().map_err(|_| AMOUNT_NOT_POSITIVE)?
    };

    if !amount.is_finite() || amount <= 0.0 {
        return Err(AMOUNT_NOT_POSITIVE);
    }

    let cents = (amount * 100.0).round();
    if cents >= i64::MAX as f64 {
        return Err(AMOUNT_TOO_LARGE);
    }

    Ok((amount, cents as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn form(customer_id: Option<&str>, amount: Option<&str>, status: Option<&str>) -> InvoiceForm {
        InvoiceForm {
            customer_id: customer_id.map(str::to_string),
            amount: amount.map(str::to_string),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn valid_form_converts_amount_to_cents() {
        let v = validate_invoice_form(&form(Some("c1"), Some("15.50"), Some("pending")), FormMode::Create)
            .unwrap();
        assert_eq!(v.customer_id.as_str(), "c1");
        assert_eq!(v.amount, 15.5);
        assert_eq!(v.amount_in_cents(), 1550);
        assert_eq!(v.status, InvoiceStatus::Pending);
    }

    #[test]
    fn float_noise_is_rounded_away() {
        let v = validate_invoice_form(&form(Some("c1"), Some("0.29"), Some("paid")), FormMode::Update)
            .unwrap();
        assert_eq!(v.amount_in_cents(), 29);
    }

    #[test]
    fn empty_form_reports_every_field() {
        let err = validate_invoice_form(&InvoiceForm::default(), FormMode::Create).unwrap_err();
        assert_eq!(err.message, "Missing Fields. Failed to Create Invoice.");
        assert_eq!(err.field_errors.customer_id, vec![CUSTOMER_REQUIRED.to_string()]);
        assert_eq!(err.field_errors.amount, vec![AMOUNT_NOT_POSITIVE.to_string()]);
        assert_eq!(err.field_errors.status, vec![STATUS_REQUIRED.to_string()]);
    }

    #[test]
    fn summary_message_follows_mode() {
        let err = validate_invoice_form(&form(Some("c1"), Some("0"), Some("paid")), FormMode::Update)
            .unwrap_err();
        assert_eq!(err.message, "Missing Fields. Failed to Update Invoice.");
        assert!(err.field_errors.customer_id.is_empty());
        assert!(err.field_errors.status.is_empty());
    }

    #[test]
    fn blank_customer_is_rejected() {
        let err = validate_invoice_form(&form(Some("   "), Some("10"), Some("paid")), FormMode::Create)
            .unwrap_err();
        assert_eq!(err.field_errors.customer_id, vec![CUSTOMER_REQUIRED.to_string()]);
    }

    #[test]
    fn non_numeric_and_non_finite_amounts_are_rejected() {
        for raw in ["abc", "NaN", "inf", "-inf", "", "   "] {
            let err = validate_invoice_form(&form(Some("c1"), Some(raw), Some("paid")), FormMode::Create)
                .unwrap_err();
            assert_eq!(err.field_errors.amount, vec![AMOUNT_NOT_POSITIVE.to_string()], "input {raw:?}");
        }
    }

    #[test]
    fn huge_amount_is_rejected() {
        let err = validate_invoice_form(&form(Some("c1"), Some("1e300"), Some("paid")), FormMode::Create)
            .unwrap_err();
        assert_eq!(err.field_errors.amount, vec![AMOUNT_TOO_LARGE.to_string()]);
    }

    #[test]
    fn status_must_be_an_exact_literal() {
        for raw in ["PAID", "overdue", ""] {
            let err = validate_invoice_form(&form(Some("c1"), Some("1"), Some(raw)), FormMode::Create)
                .unwrap_err();
            assert_eq!(err.field_errors.status, vec![STATUS_REQUIRED.to_string()]);
        }
    }

    #[test]
    fn failure_serializes_with_camel_case_field_keys() {
        let err = validate_invoice_form(&form(None, Some("5"), Some("paid")), FormMode::Create).unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["errors"]["customerId"][0], CUSTOMER_REQUIRED);
        assert!(json["errors"].get("amount").is_none());
        assert_eq!(json["message"], "Missing Fields. Failed to Create Invoice.");
    }

    #[test]
    fn form_deserializes_from_camel_case_keys() {
        let f: InvoiceForm =
            serde_json::from_value(serde_json::json!({ "customerId": "c9", "amount": "3" })).unwrap();
        assert_eq!(f.customer_id.as_deref(), Some("c9"));
        assert_eq!(f.amount.as_deref(), Some("3"));
        assert_eq!(f.status, None);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: non-positive amounts always fail on the amount field.
        #[test]
        fn non_positive_amounts_are_rejected(a in -1_000_000.0f64..=0.0f64) {
            let raw = a.to_string();
            let err = validate_invoice_form(&form(Some("c1"), Some(&raw), Some("pending")), FormMode::Create)
                .unwrap_err();
            prop_assert_eq!(err.field_errors.amount, vec![AMOUNT_NOT_POSITIVE.to_string()]);
        }

        /// Property: valid inputs succeed and cents are `round(a * 100)`.
        #[test]
        fn positive_amounts_round_to_cents(
            a in 0.000_001f64..1_000_000_000.0f64,
            paid in any::<bool>(),
            customer in "[a-z0-9-]{1,12}",
        ) {
            let raw = a.to_string();
            let status = if paid { "paid" } else { "pending" };
            let v = validate_invoice_form(&form(Some(&customer), Some(&raw), Some(status)), FormMode::Create)
                .unwrap();
            prop_assert_eq!(v.amount_in_cents(), (a * 100.0).round() as i64);
            prop_assert_eq!(v.customer_id.as_str(), customer.as_str());
        }
    }
}
