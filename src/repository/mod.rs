//! Repository traits over the local catalogue store.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::DownloadEntry;
use crate::search::CompiledQuery;

pub mod sqlite;

/// Persistent store for downloaded galleries and their tags.
///
/// `downloads` and `tags` always change together; implementations must
/// keep every write path transactional across both tables.
#[async_trait]
pub trait DownloadRepository: Send + Sync {
    /// Insert or replace a gallery and its tag rows.
    async fn put(&self, entry: &DownloadEntry) -> Result<()>;

    /// Remove a gallery and its tag rows.
    async fn remove(&self, gid: i64) -> Result<()>;

    /// Fetch a single catalogue entry with its tags.
    async fn get(&self, gid: i64) -> Result<Option<DownloadEntry>>;

    /// Execute a compiled search, returning distinct `"<gid>_<token>"`
    /// keys.
    async fn search(&self, query: &CompiledQuery) -> Result<Vec<String>>;
}
