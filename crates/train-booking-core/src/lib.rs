//! 🏗 Infrastructure for handling booking requests, plus the records they carry.
#![warn(missing_docs)]

use std::path::PathBuf;

mod error;
mod model;
mod principal;
mod request;

pub use error::{Error, Result};
pub use model::{
    CancelTicket, Operator, OperatorPayload, Ticket, TicketInfo, TicketPayload, Train,
    TrainPayload, User, UserPayload,
};
pub use principal::Principal;
pub use request::{RawRequest, Request, RequestHandler, RequestKind, RequestMethod};

/// Configuration of the train booking system
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Where the four record tables live
    pub storage: StorageConfig,
}

/// Storage backend selection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StorageConfig {
    /// Process-local maps, lost on restart
    #[default]
    Memory,
    /// A `redb` database file that survives restarts
    Redb {
        /// Path of the database file
        path: PathBuf,
    },
}
