// Stockbot - Store Module
//
// Durable stock of account credentials in SQLite (optionally SQLCipher
// encrypted). Claims are exactly-once; adds are all-or-nothing.

mod db;
mod error;
mod models;
mod pool;
mod repository;

pub use db::Database;
pub use error::StoreError;
pub use models::{capitalize, AccountPayload, Credential, Restock, ServiceName};
pub use pool::StockPool;
pub use repository::{SqliteStockStore, StockStore};
