use std::path::PathBuf;

use eyre::Result;
use tempfile::TempDir;
use train_booking_core::{Config, StorageConfig};

mod api;
pub use api::{
    random_principal, Api, ApiError, ApiResponse, OperatorSession, RequestOptions,
};

/// Storage the system under test runs on
#[derive(Clone, Debug)]
pub enum StorageCfg {
    Memory,
    /// A fresh database file in a temporary directory
    TempRedb,
    /// A database file at the given path, kept after the test
    Redb(PathBuf),
}

pub struct TestCtxBuilder {
    /// Count of worker threads serving requests
    pub workers: u16,

    pub storage: StorageCfg,
}

impl TestCtxBuilder {
    /// Create a new test context builder initialized with environment defaults
    ///
    /// Setting `BOOKING_TEST_STORAGE=redb` runs against a temporary `redb`
    /// database instead of in-memory storage.
    pub fn from_env() -> Result<Self> {
        let storage = match std::env::var("BOOKING_TEST_STORAGE") {
            Ok(v) if v.eq_ignore_ascii_case("redb") => StorageCfg::TempRedb,
            _ => StorageCfg::Memory,
        };

        Ok(TestCtxBuilder {
            workers: 2,
            storage,
        })
    }

    /// Set the number of worker threads to use
    pub fn with_workers(mut self, workers: u16) -> Self {
        assert_ne!(workers, 0);
        self.workers = workers;
        self
    }

    /// Persist records in the `redb` database at `path`
    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage = StorageCfg::Redb(path.into());
        self
    }

    /// Build the test context
    pub async fn build(self) -> Result<TestCtx> {
        let (storage, data_dir) = match self.storage {
            StorageCfg::Memory => (StorageConfig::Memory, None),
            StorageCfg::TempRedb => {
                let dir = tempfile::tempdir()?;
                let path = dir.path().join("booking.redb");
                (StorageConfig::Redb { path }, Some(dir))
            }
            StorageCfg::Redb(path) => (StorageConfig::Redb { path }, None),
        };
        let config = Config { storage };
        tracing::debug!(?config, workers = self.workers, "starting booking system");

        let (server, api) = api::mock::start(self.workers, config).await?;

        Ok(TestCtx {
            api,
            server,
            workers: self.workers,
            _data_dir: data_dir,
            drop_bomb: DropBomb,
        })
    }
}

/// Test context
pub struct TestCtx {
    /// API allowing to interact with the booking system
    pub api: Api,
    server: api::mock::MockServer,
    /// Number of worker threads
    pub workers: u16,

    _data_dir: Option<TempDir>,
    drop_bomb: DropBomb,
}

impl TestCtx {
    /// Shut down the booking system and finish the test
    pub async fn finish(self) -> Result<()> {
        std::mem::forget(self.drop_bomb);
        drop(self.api);
        self.server.shutdown().await
    }
}

struct DropBomb;

impl Drop for DropBomb {
    fn drop(&mut self) {
        eprintln!("@TestAuthor: You should call `ctx.finish().await` to shut the booking system down");
    }
}
