//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::ai::{PromptRunner, Recommender};
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::db::{MemoryOrderStore, OrderStore, PgOrderStore};
use crate::services::auth::{AuthProvider, MemoryAuthProvider, PgAuthProvider};

/// The external collaborators the storefront talks to.
pub struct Backends {
    pub orders: Arc<dyn OrderStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub prompts: Arc<dyn PromptRunner>,
}

impl Backends {
    /// `PostgreSQL`-backed orders and accounts.
    #[must_use]
    pub fn postgres(pool: PgPool, prompts: Arc<dyn PromptRunner>) -> Self {
        Self {
            orders: Arc::new(PgOrderStore::new(pool.clone())),
            auth: Arc::new(PgAuthProvider::new(pool)),
            prompts,
        }
    }

    /// Process-local orders and accounts.
    #[must_use]
    pub fn in_memory(prompts: Arc<dyn PromptRunner>) -> Self {
        Self {
            orders: Arc::new(MemoryOrderStore::new()),
            auth: Arc::new(MemoryAuthProvider::new()),
            prompts,
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Per-visitor state (cart,
/// identity) lives in the session, never here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    orders: Arc<dyn OrderStore>,
    auth: Arc<dyn AuthProvider>,
    recommender: Recommender,
}

impl AppState {
    /// Create a new application state with the built-in catalog.
    #[must_use]
    pub fn new(config: StorefrontConfig, backends: Backends) -> Self {
        let recommender = Recommender::new(backends.prompts, config.recommendation_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: Catalog::builtin(),
                orders: backends.orders,
                auth: backends.auth,
                recommender,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get the order store.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderStore {
        self.inner.orders.as_ref()
    }

    /// Get the auth provider.
    #[must_use]
    pub fn auth(&self) -> &dyn AuthProvider {
        self.inner.auth.as_ref()
    }

    /// Get the recommendation service.
    #[must_use]
    pub fn recommender(&self) -> &Recommender {
        &self.inner.recommender
    }

    /// Get the prompt runner used by the chatbot.
    #[must_use]
    pub fn prompts(&self) -> &dyn PromptRunner {
        self.inner.recommender.runner()
    }
}
