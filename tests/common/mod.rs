#![allow(dead_code)]

use async_trait::async_trait;
use nba_predict::feed::nba_stats::{PLAYER_INDEX, PLAYER_PROFILE, TEAM_DASHBOARD};
use nba_predict::feed::StatsFeed;
use nba_predict::StatsError;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const BOS: u64 = 1610612738;
pub const LAL: u64 = 1610612747;

/// Team dashboard fixture in the provider's tabular shape.
pub fn dashboard(pts: f64) -> Value {
    json!({
        "resource": "teamdashboardbygeneralsplits",
        "resultSets": [
            {
                "name": "OverallTeamDashboard",
                "headers": ["GROUP_SET", "GROUP_VALUE", "GP", "W", "L", "PTS", "AST", "REB", "STL", "BLK", "FG_PCT", "FT_PCT", "FG3_PCT"],
                "rowSet": [["Overall", "2024-25", 82, 50, 32, pts, 25.0, 44.0, 7.5, 5.0, 0.47, 0.79, 0.36]]
            },
            {
                "name": "LocationTeamDashboard",
                "headers": ["GROUP_SET", "PTS"],
                "rowSet": [["Location", 0.0]]
            }
        ]
    })
}

/// In-memory provider. Counts every fetch it serves so tests can assert on
/// cache behaviour through the public feed interface.
#[derive(Clone, Default)]
pub struct MockFeed {
    calls: Arc<AtomicUsize>,
    team_points: Arc<HashMap<u64, f64>>,
    failing_team: Option<u64>,
}

impl MockFeed {
    pub fn new() -> Self {
        let mut points = HashMap::new();
        points.insert(BOS, 110.0);
        points.insert(LAL, 105.0);
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            team_points: Arc::new(points),
            failing_team: None,
        }
    }

    pub fn failing_for(mut self, team_id: u64) -> Self {
        self.failing_team = Some(team_id);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

#[async_trait]
impl StatsFeed for MockFeed {
    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("https://stats.test/{}", endpoint)
    }

    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, StatsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match endpoint {
            TEAM_DASHBOARD => {
                let team_id: u64 = param(params, "TeamID")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_default();
                if self.failing_team == Some(team_id) {
                    return Err(StatsError::Upstream { status: 503, body: "try later".into() });
                }
                match self.team_points.get(&team_id) {
                    Some(&pts) => Ok(dashboard(pts)),
                    None => Ok(json!({
                        "resultSets": [{ "name": "OverallTeamDashboard", "headers": ["PTS"], "rowSet": [] }]
                    })),
                }
            }
            PLAYER_INDEX => Ok(json!({
                "resultSets": [{
                    "name": "CommonAllPlayers",
                    "headers": ["PERSON_ID", "DISPLAY_LAST_COMMA_FIRST", "DISPLAY_FIRST_LAST", "TEAM_ABBREVIATION"],
                    "rowSet": [
                        [2544, "James, LeBron", "LeBron James", "LAL"],
                        [1628369, "Tatum, Jayson", "Jayson Tatum", "BOS"],
                        [201939, "Curry, Stephen", "Stephen Curry", "GSW"]
                    ]
                }]
            })),
            PLAYER_PROFILE => Ok(json!({
                "resultSets": [{
                    "name": "SeasonTotalsRegularSeason",
                    "headers": ["PLAYER_ID", "SEASON_ID", "TEAM_ABBREVIATION", "PTS"],
                    "rowSet": [[2544, "2023-24", "LAL", 25.7]]
                }]
            })),
            other => Err(StatsError::Upstream { status: 404, body: format!("no endpoint {}", other) }),
        }
    }
}
