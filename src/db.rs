use std::time::Duration;

use sqlx::{MySqlPool, mysql::MySqlPoolOptions};

use crate::config::Config;

pub async fn init_db(config: &Config) -> Result<MySqlPool, sqlx::Error> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await?;

    tracing::info!("Database connection established");
    Ok(pool)
}
