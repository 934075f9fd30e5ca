pub use crate::common::RouteResult;

use std::net::SocketAddr;

use axum::{extract::FromRef, Router};
use database::SqliteDatabase;
use log::info;
use tokio::net::TcpListener;
use tours::client::Client;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub mod api;
pub mod base_url;
pub mod common;
pub mod config;
pub mod hateoas;

#[derive(Clone, FromRef)]
pub struct WebState {
    pub tour_client: Client<SqliteDatabase>,
}

/// All routes of the server. Request bodies larger than `max_upload_bytes`
/// are rejected.
pub fn router(state: WebState, max_upload_bytes: usize) -> Router {
    api::routes(state, max_upload_bytes).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

pub async fn start_web_server(
    state: WebState,
    address: SocketAddr,
    max_upload_bytes: usize,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    info!("Listening on http://{}.", listener.local_addr()?);

    axum::serve(listener, router(state, max_upload_bytes).into_make_service()).await
}
