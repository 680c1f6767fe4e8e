//! HTTP server.
//!
//! Binds the API router to a TCP listener and runs it until the supplied
//! cancellation token fires.

use crate::services::http_api::{api_routes, ApiState};
use axum::Router;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

/// Build the full application router over a shared review service.
pub fn build_router(state: ApiState) -> Router {
    api_routes().with_state(state)
}

/// Serve the API on `addr` until `cancel_token` is cancelled.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve(
    addr: SocketAddr,
    state: ApiState,
    cancel_token: CancellationToken,
) -> Result<(), String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("[server] Listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    log::info!("[server] Server stopped");
    Ok(())
}
