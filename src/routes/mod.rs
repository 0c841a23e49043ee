//! API Routes
//!
//! - `/photos` - Authenticated photo upload into the Drive folder
//! - `/health` - Liveness check

pub mod health;
pub mod photos;

use axum::Router;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::info;

use crate::models::AppState;

/// Create the main application router
///
/// Every route is logged by the trace layer, and a panicking handler
/// becomes a 500 instead of taking the connection down.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(photos::router(state))
        .merge(health::router())
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}
