//! End-to-end checks against a running deployment.
//!
//! Start the service (with its database) and run:
//! `BASE_URL=http://localhost:8080 cargo test -- --ignored`

use anyhow::Result;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensorReading {
    sensor_id: String,
    timestamp: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    temperature: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    humidity: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    water_level: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    items: Vec<SensorReading>,
    last_evaluated_key: Option<String>,
}

fn base_url() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into())
}

/// A sensor id nobody else writes to, so counts are predictable.
fn unique_sensor(prefix: &str) -> String {
    format!("{}-{}", prefix, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn post_reading(client: &Client, sensor_id: &str) -> Result<()> {
    // ---
    let body = json!({
        "sensorId": sensor_id,
        "temperature": 25.5,
        "humidity": 60,
        "waterLevel": 10.2
    });
    let response = client
        .post(format!("{}/sensors", base_url()))
        .json(&body)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running service (BASE_URL)"]
async fn ingest_then_query_preserves_decimals() -> Result<()> {
    // ---
    let client = Client::new();
    let sensor_id = unique_sensor("it-decimal");
    post_reading(&client, &sensor_id).await?;

    let url = format!("{}/sensors/{}", base_url(), sensor_id);
    let page: Page = client.get(&url).send().await?.json().await?;

    assert_eq!(page.items.len(), 1, "expected one reading from {}", url);
    let reading = &page.items[0];
    assert_eq!(reading.sensor_id, sensor_id);
    assert!(!reading.timestamp.is_empty());
    assert_eq!(reading.temperature, Decimal::from_str("25.5")?);
    assert_eq!(reading.humidity, Decimal::from(60));
    assert_eq!(reading.water_level, Decimal::from_str("10.2")?);
    assert!(page.last_evaluated_key.is_none());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running service (BASE_URL)"]
async fn paging_walks_every_reading_once() -> Result<()> {
    // ---
    let client = Client::new();
    let sensor_id = unique_sensor("it-paging");
    for _ in 0..5 {
        post_reading(&client, &sensor_id).await?;
    }

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let mut request = client
            .get(format!("{}/sensors/data", base_url()))
            .query(&[("sensor_id", sensor_id.as_str()), ("limit", "2")]);
        if let Some(c) = &cursor {
            request = request.query(&[("last_evaluated_key", c.as_str())]);
        }

        let response = request.send().await?;
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*",
            "paged reads must carry CORS headers"
        );

        let page: Page = response.json().await?;
        seen.extend(page.items.into_iter().map(|r| r.timestamp));
        match page.last_evaluated_key {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(seen.len(), 5);
    assert!(seen.windows(2).all(|w| w[0] > w[1]), "not newest first: {:?}", seen);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running service (BASE_URL)"]
async fn bad_requests_are_reported() -> Result<()> {
    // ---
    let client = Client::new();

    let response = client
        .put(format!("{}/sensors", base_url()))
        .body("{}")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Unsupported HTTP method");

    let response = client
        .post(format!("{}/sensors", base_url()))
        .json(&json!({ "sensorId": "it-missing" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{}/sensors/data", base_url()))
        .query(&[("sensor_id", "it-cursor"), ("last_evaluated_key", "garbage")])
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "invalid cursor");

    Ok(())
}
