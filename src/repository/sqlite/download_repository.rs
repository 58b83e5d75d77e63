//! SQLite-backed catalogue store.
//!
//! `downloads` and `tags` always change together: every write path runs in
//! a single transaction so a gallery can never exist with half its tags.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::domain::models::{Category, DownloadEntry, TagGroup};
use crate::repository::DownloadRepository as DownloadStore;
use crate::search::{CompiledQuery, QueryArg};

pub struct DownloadRepository {
    pool: SqlitePool,
}

impl DownloadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DownloadStore for DownloadRepository {
    async fn put(&self, entry: &DownloadEntry) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO downloads (gid, token, category, english_title, japanese_title,
                                   length, posted, rating, uploader)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(gid) DO UPDATE SET
                token = excluded.token,
                category = excluded.category,
                english_title = excluded.english_title,
                japanese_title = excluded.japanese_title,
                length = excluded.length,
                posted = excluded.posted,
                rating = excluded.rating,
                uploader = excluded.uploader
            "#,
        )
        .bind(entry.gid)
        .bind(&entry.token)
        .bind(entry.category.as_str())
        .bind(&entry.english_title)
        .bind(&entry.japanese_title)
        .bind(entry.length)
        .bind(&entry.posted)
        .bind(f64::from(entry.rating))
        .bind(&entry.uploader)
        .execute(&mut *tx)
        .await
        .context("Failed to upsert download row")?;

        sqlx::query("DELETE FROM tags WHERE gid = ?")
            .bind(entry.gid)
            .execute(&mut *tx)
            .await
            .context("Failed to clear tag rows")?;

        for group in &entry.tags {
            for tag in &group.tags {
                sqlx::query("INSERT INTO tags (gid, namespace, tag) VALUES (?, ?, ?)")
                    .bind(entry.gid)
                    .bind(&group.namespace)
                    .bind(tag)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to insert tag row")?;
            }
        }

        tx.commit().await?;
        tracing::debug!(gid = entry.gid, "stored catalogue entry");
        Ok(())
    }

    async fn remove(&self, gid: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM tags WHERE gid = ?")
            .bind(gid)
            .execute(&mut *tx)
            .await
            .context("Failed to delete tag rows")?;
        sqlx::query("DELETE FROM downloads WHERE gid = ?")
            .bind(gid)
            .execute(&mut *tx)
            .await
            .context("Failed to delete download row")?;

        tx.commit().await?;
        tracing::debug!(gid, "removed catalogue entry");
        Ok(())
    }

    async fn get(&self, gid: i64) -> Result<Option<DownloadEntry>> {
        let row = sqlx::query(
            r#"
            SELECT gid, token, category, english_title, japanese_title,
                   length, posted, rating, uploader
            FROM downloads
            WHERE gid = ?
            "#,
        )
        .bind(gid)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch download row")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tag_rows = sqlx::query("SELECT namespace, tag FROM tags WHERE gid = ? ORDER BY rowid")
            .bind(gid)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch tag rows")?;

        let category: String = row.get("category");
        Ok(Some(DownloadEntry {
            gid: row.get("gid"),
            token: row.get("token"),
            category: Category::from_site_name(&category)
                .context("unknown category in catalogue")?,
            english_title: row.get("english_title"),
            japanese_title: row.get("japanese_title"),
            length: row.get("length"),
            posted: row.get("posted"),
            rating: row.get::<f64, _>("rating") as f32,
            uploader: row.get("uploader"),
            tags: group_tags(
                tag_rows
                    .into_iter()
                    .map(|r| (r.get("namespace"), r.get("tag"))),
            ),
        }))
    }

    async fn search(&self, query: &CompiledQuery) -> Result<Vec<String>> {
        let mut prepared = sqlx::query_scalar::<_, String>(&query.sql);
        for arg in &query.args {
            prepared = match arg {
                QueryArg::Text(text) => prepared.bind(text.as_str()),
                QueryArg::Int(number) => prepared.bind(*number),
            };
        }
        prepared
            .fetch_all(&self.pool)
            .await
            .context("Failed to execute catalogue search")
    }
}

/// Rebuild namespace groups from flat rows, in row order.
fn group_tags(rows: impl Iterator<Item = (String, String)>) -> Vec<TagGroup> {
    let mut groups: Vec<TagGroup> = Vec::new();
    for (namespace, tag) in rows {
        match groups.iter_mut().find(|g| g.namespace == namespace) {
            Some(group) => group.tags.push(tag),
            None => groups.push(TagGroup {
                namespace,
                tags: vec![tag],
            }),
        }
    }
    groups
}
