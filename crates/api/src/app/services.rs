//! Service wiring: picks the store backend and assembles everything the
//! handlers need behind one shared [`AppServices`].

use std::sync::Arc;

use anyhow::Context;

use invoicedesk_auth::{Authenticator, Hs256SessionCodec, User, UserDirectory, hash_password};
use invoicedesk_core::{CustomerId, UserId};
use invoicedesk_infra::{
    CustomerStore, InMemoryRouteCache, InMemoryStore, InvoiceService, InvoiceStore, PostgresStore,
};
use invoicedesk_parties::Customer;

use crate::config::AppConfig;

/// bcrypt cost for the seeded demo user.
const DEMO_PASSWORD_COST: u32 = 10;

#[derive(Clone)]
pub struct AppServices {
    pub invoices: Arc<dyn InvoiceStore>,
    pub customers: Arc<dyn CustomerStore>,
    pub authenticator: Authenticator,
    pub invoice_service: InvoiceService,
    pub route_cache: Arc<InMemoryRouteCache>,
    pub sessions: Hs256SessionCodec,
}

impl AppServices {
    /// Wire every port to one backend that implements all three.
    pub fn with_store<S>(store: Arc<S>, sessions: Hs256SessionCodec) -> Self
    where
        S: InvoiceStore + CustomerStore + UserDirectory + 'static,
    {
        let route_cache = Arc::new(InMemoryRouteCache::new());
        let invoice_service = InvoiceService::new(store.clone(), route_cache.clone());

        Self {
            invoices: store.clone(),
            customers: store.clone(),
            authenticator: Authenticator::new(store),
            invoice_service,
            route_cache,
            sessions,
        }
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let sessions = Hs256SessionCodec::new(config.session_secret.as_bytes(), config.session_ttl);

    match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            store.ensure_schema().await.context("failed to prepare schema")?;
            tracing::info!("using postgres store");
            Ok(AppServices::with_store(Arc::new(store), sessions))
        }
        None => {
            let store = Arc::new(InMemoryStore::new());
            seed_demo_data(&store, DEMO_PASSWORD_COST)?;
            tracing::info!("using in-memory store");
            Ok(AppServices::with_store(store, sessions))
        }
    }
}

/// Demo customers plus one user (`user@nextmail.com` / `123456`).
pub fn seed_demo_data(store: &InMemoryStore, password_cost: u32) -> anyhow::Result<()> {
    let customers = [
        ("evil-rabbit", "Evil Rabbit", "evil@rabbit.com"),
        ("delba-de-oliveira", "Delba de Oliveira", "delba@oliveira.com"),
        ("lee-robinson", "Lee Robinson", "lee@robinson.com"),
        ("michael-novotny", "Michael Novotny", "michael@novotny.com"),
    ];
    for (id, name, email) in customers {
        store
            .insert_customer(Customer {
                id: CustomerId::from_string(id),
                name: name.to_string(),
                email: email.to_string(),
                image_url: format!("/customers/{id}.png"),
            })
            .with_context(|| format!("failed to seed customer {id}"))?;
    }

    let password_hash = hash_password("123456", password_cost).context("failed to hash demo password")?;
    store
        .insert_user(User {
            id: UserId::new(),
            name: "User".to_string(),
            email: "user@nextmail.com".to_string(),
            password_hash,
        })
        .context("failed to seed demo user")?;

    tracing::debug!(customers = customers.len(), "seeded demo data");
    Ok(())
}
