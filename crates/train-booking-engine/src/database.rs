//! Typed access to the record tables

use serde::de::DeserializeOwned;
use serde::Serialize;
use train_booking_core::{Operator, Ticket, Train, User};

use crate::storage::{Storage, StoreError, Table, WriteBatch};

/// A record living in exactly one table under exactly one key
pub trait Record: Serialize + DeserializeOwned {
    const TABLE: Table;

    fn key(&self) -> &str;
}

impl Record for Operator {
    const TABLE: Table = Table::Operators;

    fn key(&self) -> &str {
        &self.name
    }
}

impl Record for Train {
    const TABLE: Table = Table::Trains;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for Ticket {
    const TABLE: Table = Table::Tickets;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for User {
    const TABLE: Table = Table::Users;

    fn key(&self) -> &str {
        &self.id
    }
}

impl WriteBatch {
    /// Stage `record` to be written under its key
    pub fn put<R: Record>(&mut self, record: &R) -> Result<(), StoreError> {
        let value = serde_json::to_vec(record)?;
        self.put_raw(R::TABLE, record.key(), value);
        Ok(())
    }

    /// Stage the removal of the record of type `R` stored under `key`
    pub fn remove<R: Record>(&mut self, key: &str) {
        self.remove_raw(R::TABLE, key);
    }
}

/// Implementation of the central database for operators, trains, tickets and users
pub struct Database {
    storage: Box<dyn Storage>,
}

impl Database {
    /// Create a new [`Database`] on top of `storage`.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Look up the record stored under `key`.
    pub fn get<R: Record>(&self, key: &str) -> Result<Option<R>, StoreError> {
        match self.storage.get(R::TABLE, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get all records of one type.
    pub fn all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        self.storage
            .values(R::TABLE)?
            .iter()
            .map(|bytes| serde_json::from_slice(bytes).map_err(StoreError::from))
            .collect()
    }

    /// Apply `batch` atomically.
    pub fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.storage.commit(batch)
    }
}
