pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod party;
pub mod rate_limit;
pub mod relay;
pub mod session;
pub mod state;
pub mod ws;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let web_root = config.web_root.clone();
    let state = AppState::new(config);

    let json_routes = Router::new()
        .route("/state", get(api::get_state))
        .route("/health", get(health::health_check))
        .route("/api/join-info", get(api::join_info))
        .layer(CorsLayer::permissive());

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .merge(json_routes)
        .fallback_service(ServeDir::new(&web_root))
        .with_state(state.clone());

    (app, state)
}
