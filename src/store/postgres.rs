//! PostgreSQL-backed reading store.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;

use super::{ReadingStore, StartKey, StorePage};
use crate::error::StorageError;
use crate::SensorReading;

// ---

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    table: String,
}

#[derive(sqlx::FromRow)]
struct ReadingRow {
    sensor_id: String,
    timestamp: String,
    temperature: Decimal,
    humidity: Decimal,
    water_level: Decimal,
    ttl: i64,
}

impl From<ReadingRow> for SensorReading {
    fn from(row: ReadingRow) -> Self {
        SensorReading {
            sensor_id: row.sensor_id,
            timestamp: row.timestamp,
            temperature: row.temperature,
            humidity: row.humidity,
            water_level: row.water_level,
            ttl: row.ttl,
        }
    }
}

impl PgStore {
    /// `table` must already be a validated SQL identifier (see `config`).
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        PgStore {
            pool,
            table: table.into(),
        }
    }
}

#[async_trait]
impl ReadingStore for PgStore {
    async fn put_reading(&self, reading: &SensorReading) -> Result<(), StorageError> {
        // ---
        let sql = format!(
            r#"
            INSERT INTO "{}" (
                sensor_id, "timestamp", temperature, humidity, water_level, ttl
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
            self.table
        );

        sqlx::query(&sql)
            .bind(&reading.sensor_id)
            .bind(&reading.timestamp)
            .bind(reading.temperature)
            .bind(reading.humidity)
            .bind(reading.water_level)
            .bind(reading.ttl)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict {
                    sensor_id: reading.sensor_id.clone(),
                    timestamp: reading.timestamp.clone(),
                },
                other => StorageError::Write(other.to_string()),
            })?;

        Ok(())
    }

    async fn query_readings(
        &self,
        sensor_id: &str,
        start_key: Option<&Value>,
        limit: u32,
    ) -> Result<StorePage, StorageError> {
        // ---
        let after = start_key
            .map(|key| StartKey::parse(key, sensor_id))
            .transpose()?
            .map(|key| key.timestamp);

        let sql = format!(
            r#"
            SELECT sensor_id, "timestamp", temperature, humidity, water_level, ttl
              FROM "{}"
             WHERE sensor_id = $1
               AND ($2::TEXT IS NULL OR "timestamp" < $2)
             ORDER BY "timestamp" DESC
             LIMIT $3
            "#,
            self.table
        );

        // One extra row tells us whether another page exists.
        let rows: Vec<ReadingRow> = sqlx::query_as(&sql)
            .bind(sensor_id)
            .bind(after)
            .bind(i64::from(limit) + 1)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Read(e.to_string()))?;

        let mut items: Vec<SensorReading> = rows.into_iter().map(SensorReading::from).collect();
        let last_evaluated_key = if items.len() > limit as usize {
            items.truncate(limit as usize);
            items.last().map(|last| StartKey::of(last).to_value())
        } else {
            None
        };

        tracing::debug!(
            "Read {} readings for sensor '{}' (more: {})",
            items.len(),
            sensor_id,
            last_evaluated_key.is_some()
        );

        Ok(StorePage {
            items,
            last_evaluated_key,
        })
    }
}
