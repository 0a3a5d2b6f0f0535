//! In-memory store used by tests.

use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use serde_json::Value;

use super::{ReadingStore, StartKey, StorePage};
use crate::error::StorageError;
use crate::SensorReading;

// ---

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<(String, String), SensorReading>>,
    fail: AtomicBool,
    /// When set, pages stop short of `limit` by this many items.
    short_page_by: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails.
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    /// A store that returns fewer than `limit` items even when more exist.
    pub fn short_paging(by: usize) -> Self {
        MemoryStore {
            short_page_by: Some(by),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<SensorReading> {
        self.items.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn put_reading(&self, reading: &SensorReading) -> Result<(), StorageError> {
        // ---
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Write("store unavailable".into()));
        }

        let key = (reading.sensor_id.clone(), reading.timestamp.clone());
        let mut items = self.items.lock().unwrap();
        if items.contains_key(&key) {
            return Err(StorageError::Conflict {
                sensor_id: key.0,
                timestamp: key.1,
            });
        }
        items.insert(key, reading.clone());
        Ok(())
    }

    async fn query_readings(
        &self,
        sensor_id: &str,
        start_key: Option<&Value>,
        limit: u32,
    ) -> Result<StorePage, StorageError> {
        // ---
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Read("store unavailable".into()));
        }

        let after = start_key
            .map(|key| StartKey::parse(key, sensor_id))
            .transpose()?
            .map(|key| key.timestamp);

        let limit = match self.short_page_by {
            Some(by) => (limit as usize).saturating_sub(by).max(1),
            None => limit as usize,
        };

        let items = self.items.lock().unwrap();
        let mut remaining = items
            .values()
            .rev()
            .filter(|r| r.sensor_id == sensor_id)
            .filter(|r| after.as_ref().map_or(true, |ts| r.timestamp < *ts));

        let page: Vec<SensorReading> = remaining.by_ref().take(limit).cloned().collect();
        let last_evaluated_key = match remaining.next() {
            Some(_) => page.last().map(|last| StartKey::of(last).to_value()),
            None => None,
        };

        Ok(StorePage {
            items: page,
            last_evaluated_key,
        })
    }
}
