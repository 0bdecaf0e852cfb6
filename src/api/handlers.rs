use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::engine::teams::{self, TeamInfo};
use crate::engine::{players, FeatureVector, TrainingSummary};
use crate::error::StatsError;
use crate::feed::cache::CacheStats;
use crate::feed::StatRow;

type ApiResult<T> = std::result::Result<Json<T>, StatsError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub season: String,
    pub model_trained: bool,
    pub cache: CacheStatsBody,
    pub uptime_seconds: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStatsBody {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub expiry_secs: u64,
}

impl CacheStatsBody {
    fn new(stats: CacheStats, expiry_secs: u64) -> Self {
        Self {
            entries: stats.entries,
            hits: stats.hits,
            misses: stats.misses,
            expiry_secs,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlayerSearchParams {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PredictParams {
    pub team: Option<String>,
    pub opponent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub team: String,
    pub opponent: String,
    pub season: String,
    pub features: FeatureVector,
    pub win_probability: f64,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        season: state.season.clone(),
        model_trained: state.predictor.is_trained(),
        cache: CacheStatsBody::new(state.cache.stats(), state.cache.expiry().as_secs()),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// GET /api/teams
pub async fn list_teams() -> Json<Vec<TeamInfo>> {
    Json(teams::all_teams())
}

/// GET /api/teams/:abbr/stats
pub async fn team_stats(
    State(state): State<AppState>,
    Path(abbr): Path<String>,
) -> ApiResult<StatRow> {
    Ok(Json(state.features.team_record(&abbr).await?))
}

/// GET /api/players/search?name=
pub async fn search_players(
    State(state): State<AppState>,
    Query(params): Query<PlayerSearchParams>,
) -> ApiResult<Vec<StatRow>> {
    let name = params.name.ok_or(StatsError::MissingParam("name"))?;
    let rows = players::search_players(state.feed.as_ref(), &state.season, &name).await?;
    Ok(Json(rows))
}

/// GET /api/players/:id/profile
pub async fn player_profile(
    State(state): State<AppState>,
    Path(player_id): Path<u64>,
) -> ApiResult<Vec<StatRow>> {
    Ok(Json(players::player_seasons(state.feed.as_ref(), player_id).await?))
}

/// GET /api/predict?team=&opponent=
pub async fn predict(
    State(state): State<AppState>,
    Query(params): Query<PredictParams>,
) -> ApiResult<PredictionResponse> {
    let team = params
        .team
        .filter(|t| !t.trim().is_empty())
        .ok_or(StatsError::MissingParam("team"))?;
    let opponent = params
        .opponent
        .filter(|t| !t.trim().is_empty())
        .ok_or(StatsError::MissingParam("opponent"))?;

    let features = state.features.build_features(&team, &opponent).await?;
    let win_probability = state.predictor.predict(&features)?;

    Ok(Json(PredictionResponse {
        team: team.trim().to_uppercase(),
        opponent: opponent.trim().to_uppercase(),
        season: state.season.clone(),
        features,
        win_probability,
    }))
}

/// POST /api/model/train
///
/// Gradient descent is CPU bound, so it runs on the blocking pool.
pub async fn train_model(State(state): State<AppState>) -> ApiResult<TrainingSummary> {
    let summary = state.predictor.train_blocking().await?;
    Ok(Json(summary))
}
