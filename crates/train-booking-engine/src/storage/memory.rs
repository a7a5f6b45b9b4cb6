//! In-memory backend, lost when the process exits

use dashmap::DashMap;
use parking_lot::Mutex;

use super::{Storage, StoreError, Table, WriteBatch, WriteOp};

pub struct MemoryStorage {
    tables: [DashMap<String, Vec<u8>>; 4],
    /// Serializes commits so that batches do not interleave
    commit_lock: Mutex<()>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            tables: std::array::from_fn(|_| DashMap::new()),
            commit_lock: Mutex::new(()),
        }
    }

    #[inline]
    fn table(&self, table: Table) -> &DashMap<String, Vec<u8>> {
        &self.tables[table.index()]
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, table: Table, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.table(table).get(key).map(|entry| entry.value().clone()))
    }

    fn values(&self, table: Table) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self
            .table(table)
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let _guard = self.commit_lock.lock();
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { table, key, value } => {
                    self.table(table).insert(key, value);
                }
                WriteOp::Remove { table, key } => {
                    self.table(table).remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        super::super::tests::exercise(&MemoryStorage::new());
    }
}
