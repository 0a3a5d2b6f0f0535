//! Ingestion path: validate, stamp, store, archive.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::archive::Archive;
use crate::error::{ApiError, StorageError};
use crate::store::ReadingStore;
use crate::{NewReading, SensorReading};

// ---

/// Body returned for an accepted reading.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Ack {
    pub message: &'static str,
}

impl Ack {
    pub const PROCESSED: Ack = Ack {
        message: "Data processed successfully",
    };
}

/// Ingest one raw request body.
///
/// The store write happens first; when it fails nothing is archived. An
/// archive failure after a successful store write still fails the request,
/// leaving the reading stored but not archived. Nothing is retried.
pub async fn ingest(
    raw: &[u8],
    store: &dyn ReadingStore,
    archive: &dyn Archive,
    now: DateTime<Utc>,
) -> Result<(Ack, SensorReading), ApiError> {
    // ---
    let reading = NewReading::parse(raw)?.stamp(now);

    store.put_reading(&reading).await?;
    tracing::debug!(
        "Stored reading for sensor '{}' at {}",
        reading.sensor_id,
        reading.timestamp
    );

    let key = reading.archive_key();
    let body = serde_json::to_vec(&reading).map_err(|e| StorageError::Archive {
        key: key.clone(),
        reason: e.to_string(),
    })?;
    if let Err(e) = archive.put_object(&key, body).await {
        tracing::warn!(
            "Reading for sensor '{}' at {} stored but not archived",
            reading.sensor_id,
            reading.timestamp
        );
        return Err(e.into());
    }

    tracing::info!("Ingested reading {}", key);
    Ok((Ack::PROCESSED, reading))
}
