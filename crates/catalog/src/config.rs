//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result, bail};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 5001).
    pub port: u16,

    /// PostgreSQL connection URL. The database needs PostGIS.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// UI languages, in preference order (default: "pt,en").
    pub locales: Vec<String>,

    /// Language used when a request expresses no usable preference (default: "en").
    pub default_language: String,

    /// Items per list page (default: 20).
    pub pagination_page_size: u32,

    /// Apply pending migrations at startup (default: true).
    pub run_migrations: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .unwrap_or_else(|| "5001".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            lookup("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let locales = parse_locales(&lookup("LOCALES").unwrap_or_else(|| "pt,en".to_string()));
        if locales.is_empty() {
            bail!("LOCALES must name at least one language");
        }

        let default_language = lookup("DEFAULT_LANGUAGE")
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|| "en".to_string());
        if !locales.contains(&default_language) {
            bail!("DEFAULT_LANGUAGE {default_language:?} is not one of LOCALES {locales:?}");
        }

        let pagination_page_size: u32 = lookup("PAGINATION_PAGE_SIZE")
            .unwrap_or_else(|| "20".to_string())
            .parse()
            .context("PAGINATION_PAGE_SIZE must be a valid u32")?;
        if pagination_page_size == 0 {
            bail!("PAGINATION_PAGE_SIZE must be at least 1");
        }

        let run_migrations = lookup("RUN_MIGRATIONS")
            .map(|v| parse_bool(&v))
            .transpose()
            .context("RUN_MIGRATIONS must be true or false")?
            .unwrap_or(true);

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            locales,
            default_language,
            pagination_page_size,
            run_migrations,
        })
    }
}

/// Split a comma-separated locale list, dropping blanks and duplicates.
pub fn parse_locales(raw: &str) -> Vec<String> {
    let mut locales: Vec<String> = Vec::new();
    for locale in raw.split(',').map(|s| s.trim().to_lowercase()) {
        if !locale.is_empty() && !locales.contains(&locale) {
            locales.push(locale);
        }
    }
    locales
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: {other:?}"),
    }
}
