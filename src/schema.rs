//! Database schema management for `water-sensor-tracker`.
//!
//! Ensures the reading table exists before serving requests.
//! Applied once on startup from `main.rs`.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create the reading table if it does not exist (idempotent).
///
/// `(sensor_id, "timestamp")` is the primary key, which doubles as the
/// descending partition index used by reads. Timestamps are fixed-width
/// RFC 3339 strings compared bytewise (`COLLATE "C"`), and measurements are
/// `NUMERIC` so decimal values round-trip exactly.
///
/// `table` must already be validated as a plain identifier.
pub async fn create_schema(pool: &PgPool, table: &str) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{table}" (
            sensor_id    TEXT    NOT NULL,
            "timestamp"  TEXT    COLLATE "C" NOT NULL,
            temperature  NUMERIC NOT NULL,
            humidity     NUMERIC NOT NULL,
            water_level  NUMERIC NOT NULL,
            ttl          BIGINT  NOT NULL,
            PRIMARY KEY (sensor_id, "timestamp")
        );
        "#
    ))
    .execute(&mut *tx)
    .await?;

    // Lets the store's own expiry job find expired rows cheaply.
    sqlx::query(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS "idx_{table}_ttl"
            ON "{table}" (ttl);
        "#
    ))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
