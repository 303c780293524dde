//! SQLite-backed persistent player variables.

use std::sync::Arc;

use async_trait::async_trait;
use iobj_domain::{ObjectId, PlayerId};
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::{ClockPort, RepoError, VariableRepo};

/// SQLite implementation of the variable store.
pub struct SqliteVariableRepo {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteVariableRepo {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("player_vars", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS player_vars (
                var_name TEXT NOT NULL,
                player_id TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (var_name, player_id, owner_id)
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("player_vars", e))?;

        Ok(Self { pool, clock })
    }
}

#[async_trait]
impl VariableRepo for SqliteVariableRepo {
    async fn read_var(
        &self,
        name: &str,
        player_id: &PlayerId,
        owner: &ObjectId,
    ) -> Result<Option<String>, RepoError> {
        let row = sqlx::query(
            "SELECT value FROM player_vars WHERE var_name = ? AND player_id = ? AND owner_id = ?",
        )
        .bind(name)
        .bind(player_id.as_str())
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("read_var", e))?;

        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    async fn write_var(
        &self,
        name: &str,
        player_id: &PlayerId,
        owner: &ObjectId,
        value: &str,
    ) -> Result<(), RepoError> {
        let now = self.clock.now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO player_vars (var_name, player_id, owner_id, value, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(var_name, player_id, owner_id) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(name)
        .bind(player_id.as_str())
        .bind(owner.as_str())
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("write_var", e))?;

        Ok(())
    }
}
