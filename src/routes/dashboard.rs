// src/routes/dashboard.rs
//! Static dashboard page. It reads `/sensors/data` and renders a table with
//! Next/Previous controls; the server only hands out the HTML.

use axum::{response::Html, routing::get, Router};

use super::sensors::unsupported;

const DASHBOARD_HTML: &str = include_str!("../../static/dashboard.html");

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // ---
    Router::new()
        .route("/", get(dashboard).fallback(unsupported))
        .route("/dashboard", get(dashboard).fallback(unsupported))
}
