use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Team endpoints
        .route("/api/teams", get(handlers::list_teams))
        .route("/api/teams/:abbr/stats", get(handlers::team_stats))
        // Player endpoints
        .route("/api/players/search", get(handlers::search_players))
        .route("/api/players/:id/profile", get(handlers::player_profile))
        // Prediction endpoints
        .route("/api/predict", get(handlers::predict))
        .route("/api/model/train", post(handlers::train_model))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
