//! pdfdesk API server - PDF manipulation over HTTP
//!
//! Provides REST endpoints for:
//! - Merging, splitting, rotating, and compressing uploaded PDFs
//! - Stamping drawn signatures onto a page
//! - Downloading produced artifacts

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

mod error;
mod handlers;
mod models;
mod state;

use state::AppState;

/// Transport-level cap on uploaded request bodies.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

fn app(state: Arc<AppState>) -> Router {
    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads = ServeDir::new(state.store.root());

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        .route("/api/pdfs/test", get(handlers::test))
        // Transform endpoints
        .route("/api/pdfs/merge", post(handlers::merge))
        .route("/api/pdfs/split", post(handlers::split))
        .route("/api/pdfs/rotate", post(handlers::rotate))
        .route("/api/pdfs/compress", post(handlers::compress))
        .route("/api/pdfs/stamp-signature", post(handlers::stamp_signature))
        // Artifact downloads
        .nest_service("/uploads", uploads)
        // Add middleware
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pdfdesk_api=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("Initializing pdfdesk API...");
    let state = Arc::new(AppState::new()?);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting pdfdesk API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
