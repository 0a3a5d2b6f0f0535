use std::{any::Any, sync::Arc};

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};

use crate::archive::Archive;
use crate::error::{ApiError, ErrorBody};
use crate::store::ReadingStore;
use crate::Config;

mod dashboard;
mod health;
mod sensors;

// ---

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReadingStore>,
    pub archive: Arc<dyn Archive>,
    pub config: Arc<Config>,
}

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(sensors::router())
        .merge(dashboard::router())
        .merge(health::router())
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer())
        .with_state(state)
}

/// Permissive CORS for the browser dashboard. Answers every `OPTIONS` as a
/// preflight with an empty 200.
fn cors_layer() -> CorsLayer {
    // ---
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-amz-date"),
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-amz-security-token"),
        ])
}

/// Unknown paths.
async fn fallback() -> ApiError {
    ApiError::UnsupportedMethod
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    // ---
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "internal server error".to_string()
    };

    tracing::error!("Request handler panicked: {}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(message)),
    )
        .into_response()
}
