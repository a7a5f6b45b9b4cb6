//! Storage engines for the four record tables
//!
//! A [`Storage`] is a set of string-keyed byte maps. Reads go straight to the
//! backend; writes are staged in a [`WriteBatch`] and applied as one unit by
//! [`Storage::commit`], so an operation touching a train, a ticket and a user
//! never leaves half of its writes behind.

use thiserror::Error;
use train_booking_core::StorageConfig;

mod disk;
mod memory;

pub use self::disk::RedbStorage;
pub use self::memory::MemoryStorage;

/// One of the four record tables
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Table {
    Operators,
    Trains,
    Tickets,
    Users,
}

impl Table {
    pub const ALL: [Table; 4] = [Table::Operators, Table::Trains, Table::Tickets, Table::Users];

    /// Name of the table inside a persistent database
    pub const fn name(self) -> &'static str {
        match self {
            Table::Operators => "operators",
            Table::Trains => "trains",
            Table::Tickets => "tickets",
            Table::Users => "users",
        }
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<StoreError> for train_booking_core::Error {
    fn from(err: StoreError) -> Self {
        train_booking_core::Error::Storage(err.to_string())
    }
}

/// A single staged write
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum WriteOp {
    Put {
        table: Table,
        key: String,
        value: Vec<u8>,
    },
    Remove {
        table: Table,
        key: String,
    },
}

/// Writes applied together by [`Storage::commit`], in insertion order
#[derive(Clone, Default, Debug)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn put_raw(&mut self, table: Table, key: impl Into<String>, value: Vec<u8>) {
        self.ops.push(WriteOp::Put {
            table,
            key: key.into(),
            value,
        });
    }

    pub fn remove_raw(&mut self, table: Table, key: impl Into<String>) {
        self.ops.push(WriteOp::Remove {
            table,
            key: key.into(),
        });
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// A keyed persistent map per [`Table`]
pub trait Storage: Send + Sync {
    /// Get the value stored under `key`
    fn get(&self, table: Table, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Get all values of `table`, in no particular order
    fn values(&self, table: Table) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Apply all writes of `batch` or none of them
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

/// Open the backend selected by `config`
pub fn open(config: &StorageConfig) -> Result<Box<dyn Storage>, StoreError> {
    match config {
        StorageConfig::Memory => Ok(Box::new(MemoryStorage::new())),
        StorageConfig::Redb { path } => Ok(Box::new(RedbStorage::open(path)?)),
    }
}
