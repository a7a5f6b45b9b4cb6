//! Persistent backend on a single `redb` database file
//!
//! Tables:
//! - operators: name → Operator JSON
//! - trains: id → Train JSON
//! - tickets: id → Ticket JSON
//! - users: id → User JSON

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use super::{Storage, StoreError, Table, WriteBatch, WriteOp};

/// Records keyed by id (or operator name), stored as JSON
const fn definition(table: Table) -> TableDefinition<'static, &'static str, &'static [u8]> {
    TableDefinition::new(table.name())
}

pub struct RedbStorage {
    db: Database,
}

impl RedbStorage {
    /// Open or create the database file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let db = Database::create(path)?;

        // Ensure tables exist so that reads never hit a missing table
        let write_txn = db.begin_write()?;
        for table in Table::ALL {
            let _ = write_txn.open_table(definition(table))?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

impl Storage for RedbStorage {
    fn get(&self, table: Table, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(definition(table))?;

        match table.get(key)? {
            Some(value) => Ok(Some(value.value().to_vec())),
            None => Ok(None),
        }
    }

    fn values(&self, table: Table) -> Result<Vec<Vec<u8>>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(definition(table))?;

        let mut values = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            values.push(value.value().to_vec());
        }
        Ok(values)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { table, key, value } => {
                    let mut table = write_txn.open_table(definition(table))?;
                    table.insert(key.as_str(), value.as_slice())?;
                }
                WriteOp::Remove { table, key } => {
                    let mut table = write_txn.open_table(definition(table))?;
                    table.remove(key.as_str())?;
                }
            }
        }
        // Dropping an uncommitted transaction aborts every staged write
        write_txn.commit()?;
        Ok(())
    }
}
