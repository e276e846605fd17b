use tracing::info;

use super::Database;
use crate::error::Result;

impl Database {
    /// Create the clients and phones tables if they do not exist yet
    ///
    /// Safe to run repeatedly. Phones reference clients without an
    /// `ON DELETE` rule; `delete_client` removes dependents itself.
    pub async fn create_tables(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id SERIAL PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS phones (
                id SERIAL PRIMARY KEY,
                client_id INTEGER NOT NULL REFERENCES clients(id),
                phone_number TEXT NOT NULL
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("client tables ready");
        Ok(())
    }

    /// Drop both tables, phones first
    pub async fn drop_tables(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DROP TABLE IF EXISTS phones")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS clients")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("client tables dropped");
        Ok(())
    }
}
