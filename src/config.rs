use std::{env, str::FromStr};

use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub db_max_connections: u32,

    // Rate limiting
    pub rate_api_per_min: u32,

    pub api_prefix: String,

    // Logging
    pub log_dir: String,
    pub log_level: tracing::Level,
}

/// Reads `key`, falling back to `default` when unset. A set but unparsable
/// value is a startup error.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{} has an invalid value: {}", key, raw)),
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5),

            rate_api_per_min: env_or("RATE_API_PER_MIN", 1000),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: env_or("LOG_LEVEL", tracing::Level::DEBUG),
        }
    }
}
