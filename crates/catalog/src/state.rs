//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::middleware::language::{LanguageNegotiator, default_negotiators};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Configured UI languages.
    known_languages: Vec<String>,

    /// Fallback language.
    default_language: String,

    /// Language negotiators, sorted by priority (highest first).
    language_negotiators: Vec<Arc<dyn LanguageNegotiator>>,

    /// Items per list page.
    page_size: u32,
}

impl AppState {
    /// Connect to the database and apply migrations when configured.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        if config.run_migrations {
            db::run_migrations(&pool).await?;
            info!("Catalog migrations applied");
        }

        Ok(Self::with_pool(pool, config))
    }

    /// Build state around an existing pool.
    pub fn with_pool(pool: PgPool, config: &Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db: pool,
                known_languages: config.locales.clone(),
                default_language: config.default_language.clone(),
                language_negotiators: default_negotiators(&config.locales),
                page_size: config.pagination_page_size,
            }),
        }
    }

    /// State with a pool that only connects on first use.
    pub fn lazy(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect_lazy(&config.database_url)
            .context("invalid DATABASE_URL")?;
        Ok(Self::with_pool(pool, config))
    }

    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub fn known_languages(&self) -> &[String] {
        &self.inner.known_languages
    }

    pub fn default_language(&self) -> &str {
        &self.inner.default_language
    }

    pub fn language_negotiators(&self) -> &[Arc<dyn LanguageNegotiator>] {
        &self.inner.language_negotiators
    }

    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }
}
