//! 🚆 The train booking system.
//!
//! Four components share one [database]: the [operator registry][operators],
//! the [train catalog][trains], the [ticket ledger][tickets] and the
//! [user directory][users]. [`Booking`] serves requests against them, one
//! operation at a time, on top of an injected [storage] engine.

#![allow(rustdoc::private_intra_doc_links)]

mod booking;
pub mod database;
pub mod operators;
pub mod storage;
pub mod tickets;
pub mod trains;
pub mod users;

pub use booking::Booking;
pub use storage::{MemoryStorage, RedbStorage, Storage, StoreError};
use train_booking_core::Config;

/// Entrypoint of the booking system
///
/// Opens the storage backend selected by `config` and constructs the request
/// handler served by the surrounding infrastructure.
pub fn launch(config: &Config) -> Result<Booking, StoreError> {
    let storage = storage::open(&config.storage)?;
    tracing::info!(storage = ?config.storage, "booking system launched");
    Ok(Booking::new(storage))
}
