//! HTTP + WebSocket surface: an Axum router wiring every REST endpoint and
//! the two WebSocket upgrades onto the core/ambient modules via [`AppState`].
//!
//! ## Submodules
//!
//! | Module | Responsibility |
//! |--------|------------------|
//! | [`state`] | Shared application state (`AppState`, `ScanTaskStatus`) |
//! | [`events`] | Wire types for `/ws/processing` and `/ws/chat/{session_id}` |
//! | [`handlers`] | One Axum handler module per resource group |

pub mod events;
pub mod handlers;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Builds the application router. `state.settings` supplies the CORS
/// allow-list and `state.covers_dir` backs the static `/covers` mount.
pub fn create_router(state: AppState) -> Router {
    let covers_dir = state.covers_dir.clone();
    let cors = cors_layer(&state);

    let api = Router::new()
        .route("/books", get(handlers::books::list_books))
        .route("/books/recent", get(handlers::books::recent_books))
        .route("/books/continue-reading", get(handlers::books::continue_reading))
        .route(
            "/books/{id}",
            get(handlers::books::get_book).patch(handlers::books::patch_book).delete(handlers::books::delete_book),
        )
        .route("/books/{id}/file", get(handlers::books::book_file))
        .route("/books/{id}/cover", get(handlers::books::book_cover))
        .route("/library/scan", post(handlers::library::scan))
        .route("/library/scan/{task_id}", get(handlers::library::scan_status))
        .route("/library/import", post(handlers::library::import))
        .route("/library/stats", get(handlers::library::stats))
        .route("/library/processing", get(handlers::library::processing))
        .route("/search", get(handlers::search::search))
        .route("/search/suggest", get(handlers::search::suggest))
        .route("/search/books", get(handlers::search::search_books))
        .route("/insights/book/{id}", get(handlers::insights::by_book))
        .route("/insights/book/{id}/regenerate", post(handlers::insights::regenerate))
        .route("/insights/concepts", get(handlers::insights::concepts))
        .route("/insights/frameworks", get(handlers::insights::frameworks))
        .route("/insights/{id}", get(handlers::insights::get_insight))
        .route("/insights/{id}/connections", get(handlers::insights::connections))
        .route("/chat/sessions", post(handlers::chat::create_session).get(handlers::chat::list_sessions))
        .route("/chat/sessions/{sid}/messages", get(handlers::chat::list_messages).post(handlers::chat::send_message))
        .route("/feed", get(handlers::feed::get_feed))
        .route("/feed/generate", post(handlers::feed::generate))
        .route("/feed/daily-digest", get(handlers::feed::daily_digest))
        .route("/feed/{id}", patch(handlers::feed::patch_item))
        .route("/topics", get(handlers::topics::list_topics))
        .route("/topics/graph", get(handlers::topics::graph))
        .route("/topics/{id}", get(handlers::topics::get_topic))
        .route("/recommendations", get(handlers::recommendations::recommendations_handler))
        .route("/recommendations/similar/{id}", get(handlers::recommendations::similar))
        .route("/reading/progress/{id}", get(handlers::reading::get_progress).put(handlers::reading::put_progress))
        .route("/reading/sessions/{id}/start", post(handlers::reading::start_session))
        .route("/reading/sessions/{id}/end", post(handlers::reading::end_session))
        .route("/reading/stats", get(handlers::reading::stats))
        .route("/knowledge/connections", get(handlers::knowledge::connections))
        .route("/knowledge/learning-paths", get(handlers::knowledge::learning_paths))
        .route("/knowledge/learning-paths/{id}", get(handlers::knowledge::learning_path))
        .route("/knowledge/map", get(handlers::knowledge::map))
        .route("/config", get(handlers::config::get_config).patch(handlers::config::patch_config))
        .route("/config/models", get(handlers::config::get_models).put(handlers::config::put_models))
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api/v1", api)
        .route("/ws/processing", get(handlers::ws::ws_processing))
        .route("/ws/chat/{session_id}", get(handlers::chat::ws_chat))
        .nest_service("/covers", ServeDir::new(covers_dir))
        .layer(DefaultBodyLimit::max(200 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<_> = state
        .settings
        .read()
        .cors_origins_list()
        .into_iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
