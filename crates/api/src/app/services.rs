//! Infrastructure wiring behind the HTTP handlers.

use std::sync::Arc;

use anyhow::Context;

use courseforge_auth::{Hs256Tokens, TokenService};
use courseforge_store::{InMemoryStore, PostgresStore, Store};

/// Shared service handles every handler reaches through an `Extension`.
pub struct AppServices {
    store: Arc<dyn Store>,
    tokens: Arc<dyn TokenService>,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<dyn TokenService>) -> Self {
        Self { store, tokens }
    }

    /// In-memory wiring: what the black-box tests and database-less
    /// development runs use.
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(Hs256Tokens::new(jwt_secret)),
        )
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn tokens(&self) -> &dyn TokenService {
        self.tokens.as_ref()
    }

    /// Shared handle for the auth middleware state.
    pub fn token_service(&self) -> Arc<dyn TokenService> {
        self.tokens.clone()
    }
}

/// Build services from the environment: Postgres when a database URL is
/// given, in-memory otherwise.
pub async fn build_services(
    jwt_secret: &str,
    database_url: Option<&str>,
) -> anyhow::Result<AppServices> {
    let store: Arc<dyn Store> = match database_url {
        Some(url) => {
            let store = PostgresStore::connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            tracing::info!("connected to postgres store");
            Arc::new(store)
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    Ok(AppServices::new(store, Arc::new(Hs256Tokens::new(jwt_secret))))
}
