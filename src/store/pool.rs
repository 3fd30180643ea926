// Stockbot - Async access to the stock database
//
// rusqlite connections are blocking and not `Sync`, so every operation opens
// a fresh connection on tokio's blocking pool. Concurrent writers queue on
// the SQLite write lock via the connection busy timeout. The schema is
// created once by `ensure_schema`; per-operation opens skip migrations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::db::Database;
use super::models::{AccountPayload, Credential, Restock, ServiceName};
use super::repository::{SqliteStockStore, StockStore};
use super::StoreError;

/// Cheap-to-clone handle used by the command handlers.
#[derive(Clone)]
pub struct StockPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    db_path: PathBuf,
    password: Option<String>,
}

impl StockPool {
    pub fn new(db_path: PathBuf, password: Option<String>) -> Self {
        Self {
            inner: Arc::new(PoolInner { db_path, password }),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.inner.db_path
    }

    /// Create the schema. Must run before any other operation.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            Database::open(&inner.db_path, inner.password.as_deref())?.migrate()
        })
        .await?
    }

    pub async fn claim_one(&self, service: ServiceName) -> Result<Option<Credential>, StoreError> {
        self.with_store(move |store| store.claim_one(&service)).await
    }

    pub async fn count_by_service(&self) -> Result<BTreeMap<String, u64>, StoreError> {
        self.with_store(|store| store.count_by_service()).await
    }

    pub async fn restock(
        &self,
        service: ServiceName,
        payloads: Vec<AccountPayload>,
    ) -> Result<Restock, StoreError> {
        self.with_store(move |store| store.restock(&service, &payloads))
            .await
    }

    async fn with_store<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteStockStore<'_>) -> Result<T, StoreError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let db = Database::open(&inner.db_path, inner.password.as_deref())?;
            let store = SqliteStockStore::new(&db);
            op(&store)
        })
        .await?
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
