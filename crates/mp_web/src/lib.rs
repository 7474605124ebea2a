use std::sync::Arc;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use mp_core::{Error, Result};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

pub mod handlers;
pub mod state;

pub use state::AppState;

pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

pub fn create_app(state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(cors_origin)
        .map_err(|e| Error::Config(format!("Invalid CORS origin '{}': {}", cors_origin, e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Ok(Router::new()
        .route("/process", post(handlers::process))
        .route("/news", get(handlers::list_news))
        .route("/general_query", post(handlers::general_query))
        .route("/overview", get(handlers::overview))
        .layer(cors)
        .with_state(Arc::new(state)))
}

pub mod prelude {
    pub use mp_core::{Article, Result, Error};
    pub use crate::{create_app, AppState};
}
