//! In-memory archive used by tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::Archive;
use crate::error::StorageError;

// ---

#[derive(Debug, Default)]
pub struct MemoryArchive {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    fail: bool,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        MemoryArchive {
            fail: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl Archive for MemoryArchive {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        // ---
        if self.fail {
            return Err(StorageError::Archive {
                key: key.to_string(),
                reason: "bucket unavailable".into(),
            });
        }
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }
}
