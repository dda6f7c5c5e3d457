pub mod schema;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod txn;
mod kv;
pub mod mem;
pub mod disk;

// Re-export main types for convenience
pub use schema::{Schema, Column};
pub use catalog::Catalog;
pub use engine::{KvEntry, StorageCursor, StorageEngine};
pub use error::{CatalogError, StorageError, StorageResult};
pub use txn::Txn;
pub use mem::MemStorage;
pub use disk::DiskStorage;
