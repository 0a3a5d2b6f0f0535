//! Query path: newest-first paginated reads for one sensor.

use serde::Serialize;

use crate::cursor::Cursor;
use crate::error::{ApiError, ValidationError};
use crate::store::ReadingStore;
use crate::SensorReading;

// ---

/// One page of readings as returned to clients.
///
/// `last_evaluated_key` is the only end-of-results signal: a page may hold
/// fewer than the requested number of items while more remain.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub items: Vec<SensorReading>,
    pub last_evaluated_key: Option<Cursor>,
}

pub async fn query(
    store: &dyn ReadingStore,
    sensor_id: &str,
    cursor: Option<&Cursor>,
    page_size: u32,
) -> Result<Page, ApiError> {
    // ---
    if sensor_id.trim().is_empty() {
        return Err(ValidationError::MissingSensorId.into());
    }

    let start_key = cursor.map(Cursor::decode).transpose()?;

    let page = store
        .query_readings(sensor_id, start_key.as_ref(), page_size)
        .await?;

    tracing::debug!(
        "Query for sensor '{}' returned {} items (resumed: {}, more: {})",
        sensor_id,
        page.items.len(),
        cursor.is_some(),
        page.last_evaluated_key.is_some()
    );

    Ok(Page {
        items: page.items,
        last_evaluated_key: page.last_evaluated_key.as_ref().map(Cursor::from_start_key),
    })
}
