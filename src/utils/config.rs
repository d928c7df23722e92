use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::info;

use crate::models::error::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub media_root: PathBuf,
    pub db_max_connections: u32,
    pub log_level: String,
    /// Settings that fell back to their default, as `(key, default)`.
    pub defaulted: Vec<(&'static str, &'static str)>,
}

impl Config {
    pub fn init() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Nothing is logged here since
    /// tracing is not installed yet; see [`Config::log_defaults`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut loader = Loader {
            lookup,
            defaulted: Vec::new(),
        };
        Ok(Config {
            database_url: (loader.lookup)("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            jwt_secret: (loader.lookup)("JWT_SECRET")
                .ok_or_else(|| Error::Config("JWT_SECRET not set".to_string()))?,
            host: loader.load("HOST", "127.0.0.1")?,
            port: loader.load("PORT", "3000")?,
            media_root: loader.load("MEDIA_ROOT", "public")?,
            db_max_connections: loader.load("DB_MAX_CONNECTIONS", "5")?,
            log_level: loader.load::<String>("LOG_LEVEL", "info")?.to_lowercase(),
            defaulted: loader.defaulted,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn log_defaults(&self) {
        for (key, default) in &self.defaulted {
            info!("{key} not set, using default: {default}");
        }
    }
}

struct Loader<F> {
    lookup: F,
    defaulted: Vec<(&'static str, &'static str)>,
}

impl<F: Fn(&str) -> Option<String>> Loader<F> {
    fn load<T: FromStr>(&mut self, key: &'static str, default: &'static str) -> Result<T, Error>
    where
        T::Err: Display,
    {
        let raw = (self.lookup)(key).unwrap_or_else(|| {
            self.defaulted.push((key, default));
            default.to_string()
        });
        raw.parse()
            .map_err(|e| Error::Config(format!("Invalid {key} value '{raw}': {e}")))
    }
}
