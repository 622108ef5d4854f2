pub mod config;
pub mod health;
pub mod http;
pub mod presence;
pub mod registry;
pub mod relay;
pub mod room_manager;
pub mod session;
pub mod state;
pub mod ws;

use axum::Router;
use axum::routing::get;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let chat_page = http::chat_page(&config.web_root);
    let home_page = http::home_page(&config.web_root);
    let static_files = ServeDir::new(&config.web_root).not_found_service(ServeFile::new(&home_page));
    let state = AppState::new(config);

    let app = Router::new()
        .route("/socket", get(ws::ws_handler))
        .route("/create", get(http::create_room))
        .route("/health", get(health::health_check))
        .route_service("/", ServeFile::new(home_page))
        .route_service("/chat/{id}", ServeFile::new(chat_page))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}
