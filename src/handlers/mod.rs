pub mod api_handlers;

pub use api_handlers::{api_handler, options_handler};

use crate::AppState;
use axum::{routing::post, Router};

/// The action endpoint plus its CORS preflight route. Shared by the server
/// binary and the integration tests.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api", post(api_handler).options(options_handler))
        .with_state(state)
}
