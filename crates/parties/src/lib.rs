//! Parties domain module (customers).
//!
//! Customers are read-only from the dashboard's point of view: they are
//! listed, searched and referenced by invoices, never mutated here.

pub mod customer;

pub use customer::{Customer, CustomerField, CustomerSummary};
