//! Local store implementations

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::entity::SyncEntity;
use crate::error::Result;
use crate::traits::LocalStore;

/// Open the local store for `E` described by `config`
pub async fn open_store<E: SyncEntity>(config: &StoreConfig) -> Result<Arc<dyn LocalStore<E>>> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::<E>::new())),
        StoreConfig::File { dir } => Ok(Arc::new(FileStore::<E>::in_dir(dir).await?)),
    }
}
