use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::OptimizationResult;
use crate::error::EngineResult;

/// A persisted run, as read back from the store.
#[derive(Debug, Clone)]
pub struct StoredRun {
    pub id: Uuid,
    pub algorithm: String,
    pub created_at: DateTime<Utc>,
    pub total_distance: f64,
    pub coverage_percentage: f64,
    pub payload: Value,
}

/// Optimisation results keyed by an opaque run id.
#[derive(Debug, Clone)]
pub struct RunStore {
    pool: SqlitePool,
}

impl RunStore {
    pub async fn connect(database_url: &str) -> EngineResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every in-memory connection is its own database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        info!("Connected to SQLite database at {database_url}");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS optimization_runs (
                id TEXT PRIMARY KEY,
                algorithm TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                total_distance REAL NOT NULL,
                coverage_percentage REAL NOT NULL,
                payload TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub async fn save_run(&self, result: &OptimizationResult) -> EngineResult<Uuid> {
        let id = Uuid::new_v4();
        let payload = serde_json::to_string(result)?;

        sqlx::query(
            "INSERT INTO optimization_runs \
             (id, algorithm, created_at, total_distance, coverage_percentage, payload) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(result.algorithm.as_str())
        .bind(Utc::now().timestamp())
        .bind(result.summary.total_distance)
        .bind(result.summary.coverage_percentage)
        .bind(payload)
        .execute(&self.pool)
        .await?;

        debug!("Stored run {} ({})", id, result.algorithm);
        Ok(id)
    }

    pub async fn load_run(&self, id: Uuid) -> EngineResult<Option<StoredRun>> {
        let row = sqlx::query(
            "SELECT algorithm, created_at, total_distance, coverage_percentage, payload \
             FROM optimization_runs WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row.try_get("payload")?;
        let created_at: i64 = row.try_get("created_at")?;
        Ok(Some(StoredRun {
            id,
            algorithm: row.try_get("algorithm")?,
            created_at: DateTime::from_timestamp(created_at, 0).unwrap_or_default(),
            total_distance: row.try_get("total_distance")?,
            coverage_percentage: row.try_get("coverage_percentage")?,
            payload: serde_json::from_str(&payload)?,
        }))
    }
}
