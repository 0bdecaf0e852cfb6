use super::{query, QueryParams, StatsFeed};
use crate::config::StatsApiConfig;
use crate::error::{body_excerpt, StatsError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, HOST, ORIGIN, REFERER};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const TEAM_DASHBOARD: &str = "teamdashboardbygeneralsplits";
pub const PLAYER_PROFILE: &str = "playerprofilev2";
pub const PLAYER_INDEX: &str = "commonallplayers";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// stats.nba.com rejects requests that do not look like they came from the
/// nba.com site.
fn provider_headers(base_url: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(host) = Url::parse(base_url).ok().as_ref().and_then(Url::host_str) {
        if let Ok(v) = HeaderValue::from_str(host) {
            headers.insert(HOST, v);
        }
    }
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers.insert("x-nba-stats-origin", HeaderValue::from_static("stats"));
    headers.insert("x-nba-stats-token", HeaderValue::from_static("true"));
    headers
}

pub struct NbaStatsClient {
    client: Client,
    base_url: String,
}

impl NbaStatsClient {
    pub fn new(config: &StatsApiConfig) -> Result<Self, StatsError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(USER_AGENT)
            .default_headers(provider_headers(&config.base_url))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StatsFeed for NbaStatsClient {
    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, StatsError> {
        let url = self.endpoint_url(endpoint);
        debug!(endpoint, "requesting stats");

        let resp = self.client.get(&url).query(params).send().await.map_err(|e| {
            warn!(endpoint, error = %e, "stats request failed");
            StatsError::from(e)
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = body_excerpt(&resp.text().await.unwrap_or_default());
            warn!(endpoint, status = status.as_u16(), body = %body, "stats provider rejected request");
            return Err(StatsError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|e| StatsError::Decode(format!("{} response: {}", endpoint, e)))
    }
}

// ── Endpoint queries ─────────────────────────────────────────────────

/// Per-game base stats for one team over a regular season. The provider
/// insists on every filter being present, even when blank.
pub fn team_dashboard_query(team_id: u64, season: &str) -> QueryParams {
    let team_id = team_id.to_string();
    query(&[
        ("DateFrom", ""),
        ("DateTo", ""),
        ("GameSegment", ""),
        ("LastNGames", "0"),
        ("LeagueID", "00"),
        ("Location", ""),
        ("MeasureType", "Base"),
        ("Month", "0"),
        ("OpponentTeamID", "0"),
        ("Outcome", ""),
        ("PORound", "0"),
        ("PaceAdjust", "N"),
        ("PerMode", "PerGame"),
        ("Period", "0"),
        ("PlusMinus", "N"),
        ("Rank", "N"),
        ("Season", season),
        ("SeasonSegment", ""),
        ("SeasonType", "Regular Season"),
        ("ShotClockRange", ""),
        ("TeamID", team_id.as_str()),
        ("VsConference", ""),
        ("VsDivision", ""),
    ])
}

pub fn player_profile_query(player_id: u64) -> QueryParams {
    let player_id = player_id.to_string();
    query(&[
        ("LeagueID", "00"),
        ("PerMode", "PerGame"),
        ("PlayerID", player_id.as_str()),
    ])
}

pub fn player_index_query(season: &str) -> QueryParams {
    query(&[
        ("IsOnlyCurrentSeason", "1"),
        ("LeagueID", "00"),
        ("Season", season),
    ])
}
