//! Application state

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::{JwtConfig, JwtService};
use crate::config::Config;
use crate::db;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Access token issuer / validator
    pub jwt: JwtService,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect, run migrations and seed the bootstrap admin
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        if let Some((username, password)) = &config.bootstrap_admin {
            if db::users::bootstrap_admin(&pool, username, password).await? {
                tracing::info!(username = %username, "Bootstrap admin created");
            }
        }

        Ok(Self::with_pool(pool, config))
    }

    /// Wrap an existing pool; nothing is connected or migrated
    pub fn with_pool(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            jwt: JwtService::with_config(JwtConfig::from_config(config)),
            config: Arc::new(config.clone()),
        }
    }

    /// State whose pool only connects on first use
    pub fn lazy(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect_lazy(&config.database_url)?;
        Ok(Self::with_pool(pool, config))
    }
}
