// Stockbot - Stock Store Repository
//
// Claiming an account is a single write transaction: the random pick and the
// delete run under SQLite's write lock, so two claimers can never be handed
// the same row. Bulk adds are all-or-nothing.

use std::collections::BTreeMap;

use rand::Rng;
use rusqlite::{params, OptionalExtension, Transaction, TransactionBehavior};

use super::db::Database;
use super::models::{AccountPayload, Credential, Restock, ServiceName};
use super::StoreError;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over stock storage operations.
pub trait StockStore {
    /// Remove one random account for `service` and return it, or `None` when
    /// the service is out of stock.
    fn claim_one(&self, service: &ServiceName) -> Result<Option<Credential>, StoreError>;

    /// Live count of available accounts per service. Services with no stock
    /// do not appear in the map.
    fn count_by_service(&self) -> Result<BTreeMap<String, u64>, StoreError>;

    /// Live count of available accounts for one service.
    fn count_for(&self, service: &ServiceName) -> Result<u64, StoreError>;

    /// Insert every payload under `service` in one transaction. Returns the
    /// number of rows inserted.
    fn add_many(&self, service: &ServiceName, payloads: &[AccountPayload])
        -> Result<usize, StoreError>;

    /// `add_many` followed by `count_for`, both inside the same transaction.
    fn restock(&self, service: &ServiceName, payloads: &[AccountPayload])
        -> Result<Restock, StoreError>;
}

// ─── SQLite Implementation ──────────────────────────────────────────────────

pub struct SqliteStockStore<'a> {
    db: &'a Database,
}

impl<'a> SqliteStockStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Start a write transaction up front so the lock is held from the first read.
    fn begin_write(&self) -> Result<Transaction<'_>, StoreError> {
        Ok(Transaction::new_unchecked(
            self.db.conn(),
            TransactionBehavior::Immediate,
        )?)
    }

    fn insert_batch(
        tx: &Transaction<'_>,
        service: &ServiceName,
        payloads: &[AccountPayload],
    ) -> Result<usize, StoreError> {
        if payloads.is_empty() {
            return Err(StoreError::EmptyBatch);
        }

        let mut stmt = tx.prepare("INSERT INTO accounts (service, account) VALUES (?1, ?2)")?;
        for payload in payloads {
            stmt.execute(params![service.as_str(), payload.as_str()])?;
        }
        Ok(payloads.len())
    }

    fn count_in(tx: &Transaction<'_>, service: &ServiceName) -> Result<u64, StoreError> {
        let count: i64 = tx.query_row(
            "SELECT count(*) FROM accounts WHERE service = ?1",
            params![service.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl<'a> StockStore for SqliteStockStore<'a> {
    fn claim_one(&self, service: &ServiceName) -> Result<Option<Credential>, StoreError> {
        let tx = self.begin_write()?;

        let available = Self::count_in(&tx, service)?;
        if available == 0 {
            return Ok(None);
        }

        let offset = rand::thread_rng().gen_range(0..available) as i64;
        let claimed = tx
            .query_row(
                "DELETE FROM accounts
                 WHERE id = (
                     SELECT id FROM accounts WHERE service = ?1
                     ORDER BY id LIMIT 1 OFFSET ?2
                 )
                 RETURNING id, account",
                params![service.as_str(), offset],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        tx.commit()?;

        Ok(claimed.map(|(id, account)| {
            tracing::info!(
                credential_id = id,
                service = %service,
                remaining = available - 1,
                "Account claimed"
            );
            Credential::new(id, service.clone(), account)
        }))
    }

    fn count_by_service(&self) -> Result<BTreeMap<String, u64>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT service, count(*) FROM accounts GROUP BY service ORDER BY service",
        )?;

        let rows = stmt.query_map([], |row| {
            let service: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((service, count as u64))
        })?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let (service, count) = row?;
            counts.insert(service, count);
        }

        Ok(counts)
    }

    fn count_for(&self, service: &ServiceName) -> Result<u64, StoreError> {
        let count: i64 = self.db.conn().query_row(
            "SELECT count(*) FROM accounts WHERE service = ?1",
            params![service.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn add_many(
        &self,
        service: &ServiceName,
        payloads: &[AccountPayload],
    ) -> Result<usize, StoreError> {
        let tx = self.begin_write()?;
        let added = Self::insert_batch(&tx, service, payloads)?;
        tx.commit()?;

        tracing::info!(service = %service, added, "Accounts added");
        Ok(added)
    }

    fn restock(
        &self,
        service: &ServiceName,
        payloads: &[AccountPayload],
    ) -> Result<Restock, StoreError> {
        let tx = self.begin_write()?;
        let added = Self::insert_batch(&tx, service, payloads)?;
        let total = Self::count_in(&tx, service)?;
        tx.commit()?;

        tracing::info!(service = %service, added, total, "Service restocked");
        Ok(Restock { added, total })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
