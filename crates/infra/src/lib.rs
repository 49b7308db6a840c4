//! Infrastructure layer: relational store adapters, route cache and the
//! invoice mutation service that ties them together.

pub mod invoice_service;
pub mod route_cache;
pub mod store;

pub use invoice_service::{Clock, INVOICES_ROUTE, InvoiceService, MutationError, MutationOutcome};
pub use route_cache::{InMemoryRouteCache, RouteCache};
pub use store::{
    CustomerStore, ITEMS_PER_PAGE, InMemoryStore, InvoiceStore, Page, PostgresStore, StoreError,
    total_pages,
};
