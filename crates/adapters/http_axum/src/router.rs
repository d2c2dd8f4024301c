//! Axum router assembly.

use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;
use axum::routing::get;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use rentalhub_app::ports::{
    AssignmentRepository, DeviceRepository, OwnerRepository, PropertyRepository,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts the JSON API under `/api` and the WebSocket channel at `/ws`.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<DR, OR, PR, AR>(state: AppState<DR, OR, PR, AR>) -> Router
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(crate::ws::upgrade::<DR, OR, PR, AR>))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer for `origins`: `*` or a comma-separated list of origins.
///
/// # Errors
///
/// Returns [`InvalidHeaderValue`] when one of the origins is not a valid
/// header value.
pub fn cors(origins: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let origins = origins.trim();
    let allow = if origins == "*" {
        AllowOrigin::from(Any)
    } else {
        let list = origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(HeaderValue::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(list)
    };
    Ok(CorsLayer::new()
        .allow_origin(allow)
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn health_check() -> &'static str {
    "OK"
}
