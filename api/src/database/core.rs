use super::types::Database;
use anyhow::{Context, Result};
use sqlx::SqlitePool;

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to {}", database_url))?;
        sqlx::migrate!()
            .run(&pool)
            .await
            .context("Failed to apply migrations")?;
        Ok(Self { pool })
    }

    /// Counts listings; fails if the schema is not in place
    pub async fn count_listings(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM servers")
            .fetch_one(&self.pool)
            .await
            .context("servers table is not readable")?;
        Ok(count.0)
    }

    /// Test helper method to access the underlying pool
    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
