//! Key-value store for sensor readings.
//!
//! Readings are partitioned by `sensorId` and sorted by `timestamp`. Reads
//! walk a partition newest first and hand back the store's native start key
//! when more items remain; callers treat that key as opaque.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageError;
use crate::SensorReading;

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgStore;

// ---

/// One page of a partition read.
#[derive(Debug, Default)]
pub struct StorePage {
    pub items: Vec<SensorReading>,

    /// Native key to resume from. Present iff more items remain.
    pub last_evaluated_key: Option<Value>,
}

#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Insert a reading. An existing `(sensorId, timestamp)` is a conflict,
    /// never an overwrite.
    async fn put_reading(&self, reading: &SensorReading) -> Result<(), StorageError>;

    /// Read up to `limit` readings for `sensor_id`, newest first, strictly
    /// older than `start_key` when one is given.
    async fn query_readings(
        &self,
        sensor_id: &str,
        start_key: Option<&Value>,
        limit: u32,
    ) -> Result<StorePage, StorageError>;
}

/// Native start key shared by the store implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct StartKey {
    pub sensor_id: String,
    pub timestamp: String,
}

impl StartKey {
    pub(crate) fn of(reading: &SensorReading) -> Self {
        StartKey {
            sensor_id: reading.sensor_id.clone(),
            timestamp: reading.timestamp.clone(),
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        serde_json::json!({ "sensorId": self.sensor_id, "timestamp": self.timestamp })
    }

    /// Validate a start key handed back by a caller for a read of `sensor_id`.
    pub(crate) fn parse(value: &Value, sensor_id: &str) -> Result<Self, StorageError> {
        // ---
        let key: StartKey =
            serde_json::from_value(value.clone()).map_err(|_| StorageError::InvalidStartKey)?;

        if key.sensor_id != sensor_id || key.timestamp.is_empty() {
            return Err(StorageError::InvalidStartKey);
        }
        Ok(key)
    }
}
