use axum::{
    response::IntoResponse,
    routing::{get, on},
    Json, Router,
};
use serde_json::json;
use tower_http::services::ServeDir;

pub mod tours;
pub mod waypoints;

use crate::{
    common::{route_not_found, METHOD_FILTER_ALL},
    WebState,
};

pub fn routes(state: WebState, max_upload_bytes: usize) -> Router {
    let upload_directory = state.tour_client.uploads().directory().to_path_buf();

    Router::new()
        .route("/", get(welcome))
        .route("/ping", get(ping))
        .nest_service("/tours", tours::routes(state, max_upload_bytes))
        .nest_service("/uploads", ServeDir::new(upload_directory))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn welcome() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the Tour App API"
    }))
}

async fn ping() -> impl IntoResponse {
    Json(json!({
        "message": "pong!"
    }))
}
