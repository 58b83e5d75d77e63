//! Local catalogue database: pool construction, pragmas, embedded
//! migrations and client settings.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Configure SQLite pragmas for the catalogue workload.
/// These are set per-connection via the after_connect callback.
async fn configure_sqlite_pragmas(conn: &mut sqlx::SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Executor;

    // WAL keeps reads open while a download transaction commits
    conn.execute("PRAGMA journal_mode = WAL").await?;
    conn.execute("PRAGMA synchronous = NORMAL").await?;
    conn.execute("PRAGMA busy_timeout = 5000").await?;
    conn.execute("PRAGMA temp_store = MEMORY").await?;
    conn.execute("PRAGMA foreign_keys = ON").await?;

    Ok(())
}

/// Open (or create) the catalogue database under `data_dir` and run the
/// embedded migrations.
pub async fn init_db(data_dir: &Path) -> Result<SqlitePool> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data dir: {}", data_dir.display()))?;

    let db_path = data_dir.join("catalogue.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::info!("catalogue database at {}", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .after_connect(|conn, _meta| {
            Box::pin(async move { configure_sqlite_pragmas(conn).await })
        })
        .connect(&db_url)
        .await
        .with_context(|| format!("failed to connect to database at {}", db_path.display()))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    Ok(pool)
}

/// Client preference columns; the settings table is a single row with
/// id = 1.
fn settings_column(key: &str) -> Option<&'static str> {
    match key {
        "display_mode" => Some("display_mode"),
        "default_category_filter" => Some("default_category_filter"),
        "favorites_order" => Some("favorites_order"),
        _ => None,
    }
}

/// Get a client setting. Unknown keys read as unset.
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let Some(column) = settings_column(key) else {
        tracing::warn!("unknown setting key requested: {key}");
        return Ok(None);
    };

    let query = format!("SELECT {column} FROM settings WHERE id = 1");
    let value = sqlx::query_scalar::<_, Option<String>>(&query)
        .fetch_optional(pool)
        .await
        .context("Failed to get setting from database")?;

    Ok(value.flatten())
}

/// Set a client setting.
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    let Some(column) = settings_column(key) else {
        anyhow::bail!("unknown setting key: {key}");
    };

    let query = format!(
        "INSERT INTO settings (id, {column}) VALUES (1, ?)
         ON CONFLICT(id) DO UPDATE SET {column} = ?, updated_at = datetime('now')"
    );
    sqlx::query(&query)
        .bind(value)
        .bind(value)
        .execute(pool)
        .await
        .context("Failed to set setting in database")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;

    #[tokio::test]
    async fn unset_setting_reads_as_none() {
        let pool = fixtures::setup_test_db().await;

        let value = get_setting(&pool, "display_mode").await.unwrap();
        assert!(value.is_none() || value.as_deref() == Some(""));
    }

    #[tokio::test]
    async fn unknown_key_reads_as_none() {
        let pool = fixtures::setup_test_db().await;

        let value = get_setting(&pool, "nonexistent_key").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn unknown_key_cannot_be_written() {
        let pool = fixtures::setup_test_db().await;

        assert!(set_setting(&pool, "nonexistent_key", "x").await.is_err());
    }

    #[tokio::test]
    async fn set_and_get_setting_round_trips() {
        let pool = fixtures::setup_test_db().await;

        set_setting(&pool, "display_mode", "compact").await.unwrap();
        let value = get_setting(&pool, "display_mode").await.unwrap();
        assert_eq!(value, Some("compact".to_string()));
    }

    #[tokio::test]
    async fn set_setting_updates_existing_value() {
        let pool = fixtures::setup_test_db().await;

        set_setting(&pool, "favorites_order", "posted").await.unwrap();
        set_setting(&pool, "favorites_order", "favorited").await.unwrap();

        let value = get_setting(&pool, "favorites_order").await.unwrap();
        assert_eq!(value, Some("favorited".to_string()));
    }

    #[tokio::test]
    async fn init_db_creates_the_schema_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_db(dir.path()).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert!(tables.iter().any(|t| t == "downloads"));
        assert!(tables.iter().any(|t| t == "tags"));
        assert!(tables.iter().any(|t| t == "settings"));
    }
}
