//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::gateway::GatewayClient;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to build gateway HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    pool: PgPool,
    gateway: GatewayClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway HTTP client cannot be built.
    pub fn new(config: Config, pool: PgPool) -> Result<Self, StateError> {
        let gateway = GatewayClient::new(&config.gateway)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                gateway,
            }),
        })
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the commerce gateway client.
    #[must_use]
    pub fn gateway(&self) -> &GatewayClient {
        &self.inner.gateway
    }
}
