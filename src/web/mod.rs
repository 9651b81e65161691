// HTTP surface
// Serves the single-page UI and a JSON API over the command layer

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post, put};
use log::info;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};

use crate::commands::AppState;
use crate::errors::AppResult;

mod error;
mod handlers;

pub use error::ApiError;

pub type SharedState = Arc<AppState>;

pub async fn serve(state: SharedState) -> AppResult<()> {
    let addr = state.config.bind_addr;
    let sweeper = spawn_idle_sweeper(state.clone());
    let router = build_router(state);

    info!("Binding HTTP listener on http://{}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("HTTP server exited");
    Ok(())
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::health))
        .route("/api/options", get(handlers::options))
        .route("/api/app-image", get(handlers::app_image))
        .route("/api/sessions", post(handlers::create_session))
        .route(
            "/api/sessions/:id",
            get(handlers::get_session).delete(handlers::end_session),
        )
        .route("/api/sessions/:id/settings", put(handlers::update_settings))
        .route("/api/sessions/:id/examples", post(handlers::select_example))
        .route("/api/sessions/:id/messages", post(handlers::submit_message))
        .route("/api/sessions/:id/clear", post(handlers::clear_chat))
        .route("/api/sessions/:id/transcript", get(handlers::save_chat))
        .route("/api/sessions/:id/end", post(handlers::end_session))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new()),
        )
}

/// Drops sessions whose browser went away without ending them
fn spawn_idle_sweeper(state: SharedState) -> tokio::task::JoinHandle<()> {
    let ttl = state.config.session_ttl;
    let period = (ttl / 4).max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            state.sessions.evict_idle(ttl).await;
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
