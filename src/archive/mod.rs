//! Write-only object archive holding a JSON copy of every reading.

use async_trait::async_trait;

use crate::error::StorageError;

mod fs;
mod http;
#[cfg(test)]
pub mod memory;

pub use fs::FsArchive;
pub use http::HttpArchive;

// ---

#[async_trait]
pub trait Archive: Send + Sync {
    /// Store `body` under `key`, e.g. `sensors/{sensorId}/{timestamp}.json`.
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError>;
}
