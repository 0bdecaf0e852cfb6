//! Team-vs-opponent feature vectors for the win predictor.
//!
//! The vector is the subject team's eight season averages followed by the
//! opponent's eight, always in [`FEATURE_COLUMNS`] order. The predictor is
//! fitted on that layout, so the order must never change.

use super::teams;
use crate::error::StatsError;
use crate::feed::nba_stats::{team_dashboard_query, TEAM_DASHBOARD};
use crate::feed::{StatRow, StatTable, StatsFeed};
use serde::Serialize;
use std::ops::Index;
use std::sync::Arc;
use tracing::{debug, warn};

/// Provider columns, in canonical feature order.
pub const FEATURE_COLUMNS: [&str; 8] = [
    "PTS", "AST", "REB", "STL", "BLK", "FG_PCT", "FT_PCT", "FG3_PCT",
];

pub const TEAM_FEATURES: usize = FEATURE_COLUMNS.len();
pub const FEATURE_LEN: usize = TEAM_FEATURES * 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_LEN]);

impl FeatureVector {
    pub fn from_teams(team: [f64; TEAM_FEATURES], opponent: [f64; TEAM_FEATURES]) -> Self {
        let mut values = [0.0; FEATURE_LEN];
        values[..TEAM_FEATURES].copy_from_slice(&team);
        values[TEAM_FEATURES..].copy_from_slice(&opponent);
        Self(values)
    }

    /// Checked construction from an arbitrary slice (e.g. request input).
    pub fn from_slice(values: &[f64]) -> Result<Self, StatsError> {
        let values: [f64; FEATURE_LEN] = values.try_into().map_err(|_| {
            StatsError::InvalidFeatures(format!(
                "expected {} values, got {}",
                FEATURE_LEN,
                values.len()
            ))
        })?;
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(StatsError::InvalidFeatures(format!("value {} is not finite", i)));
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn team(&self) -> &[f64] {
        &self.0[..TEAM_FEATURES]
    }

    pub fn opponent(&self) -> &[f64] {
        &self.0[TEAM_FEATURES..]
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

/// The eight canonical columns of one team row.
pub fn team_features(row: &StatRow) -> Result<[f64; TEAM_FEATURES], StatsError> {
    let mut out = [0.0; TEAM_FEATURES];
    for (slot, column) in out.iter_mut().zip(FEATURE_COLUMNS) {
        *slot = row.require_f64(column)?;
    }
    Ok(out)
}

fn resolve_team(abbr: &str) -> Result<u64, StatsError> {
    teams::team_id(abbr).ok_or_else(|| StatsError::UnknownTeam(abbr.to_string()))
}

pub struct FeatureBuilder {
    feed: Arc<dyn StatsFeed>,
    season: String,
}

impl FeatureBuilder {
    pub fn new(feed: Arc<dyn StatsFeed>, season: impl Into<String>) -> Self {
        Self {
            feed,
            season: season.into(),
        }
    }

    /// Current-season dashboard row for a team. Provider and extraction
    /// failures come back as `DataUnavailable` with the cause as the reason.
    pub async fn team_record(&self, abbr: &str) -> Result<StatRow, StatsError> {
        let team_id = resolve_team(abbr)?;
        self.fetch_team_row(abbr, team_id).await
    }

    async fn load_team_row(&self, team_id: u64) -> Result<StatRow, StatsError> {
        let params = team_dashboard_query(team_id, &self.season);
        let response = self.feed.fetch(TEAM_DASHBOARD, &params).await?;
        let table = StatTable::from_response(&response)?;
        table.first_row().cloned()
    }

    async fn fetch_team_row(&self, abbr: &str, team_id: u64) -> Result<StatRow, StatsError> {
        self.load_team_row(team_id).await.map_err(|e| {
            if e.is_upstream() {
                warn!(team = abbr, error = %e, "stats provider failed for team");
            } else {
                debug!(team = abbr, error = %e, "team stats missing");
            }
            StatsError::DataUnavailable {
                team: abbr.to_uppercase(),
                reason: e.to_string(),
            }
        })
    }

    async fn fetch_team_features(
        &self,
        abbr: &str,
        team_id: u64,
    ) -> Result<[f64; TEAM_FEATURES], StatsError> {
        let row = self.fetch_team_row(abbr, team_id).await?;
        team_features(&row).map_err(|e| StatsError::DataUnavailable {
            team: abbr.to_uppercase(),
            reason: e.to_string(),
        })
    }

    /// Feature vector for `team` against `opponent`. Both abbreviations are
    /// resolved before anything is fetched.
    pub async fn build_features(
        &self,
        team: &str,
        opponent: &str,
    ) -> Result<FeatureVector, StatsError> {
        let team_id = resolve_team(team)?;
        let opponent_id = resolve_team(opponent)?;

        let (team_stats, opponent_stats) = tokio::join!(
            self.fetch_team_features(team, team_id),
            self.fetch_team_features(opponent, opponent_id),
        );
        let features = FeatureVector::from_teams(team_stats?, opponent_stats?);
        debug!(team, opponent, "built feature vector");
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    /// Serves a dashboard whose PTS depends on the requested team.
    struct DashboardFeed;

    fn dashboard(pts: f64) -> Value {
        json!({
            "resultSets": [{
                "name": "OverallTeamDashboard",
                "headers": ["GROUP_SET", "GP", "PTS", "AST", "REB", "STL", "BLK", "FG_PCT", "FT_PCT", "FG3_PCT"],
                "rowSet": [["Overall", 40, pts, 26.1, 44.3, 7.4, 5.2, 0.474, 0.801, 0.371]]
            }]
        })
    }

    #[async_trait]
    impl StatsFeed for DashboardFeed {
        fn endpoint_url(&self, endpoint: &str) -> String {
            format!("mock://{}", endpoint)
        }

        async fn fetch(&self, _endpoint: &str, params: &[(String, String)]) -> Result<Value, StatsError> {
            let team_id = params
                .iter()
                .find(|(k, _)| k == "TeamID")
                .map(|(_, v)| v.as_str())
                .unwrap_or_default();
            match team_id {
                "1610612738" => Ok(dashboard(110.0)),
                "1610612747" => Ok(dashboard(105.0)),
                "1610612744" => Ok(json!({ "resultSets": [{ "headers": ["PTS"], "rowSet": [] }] })),
                _ => Err(StatsError::Upstream {
                    status: 500,
                    body: "<html><h1>Internal Server Error</h1></html>".into(),
                }),
            }
        }
    }

    fn builder() -> FeatureBuilder {
        FeatureBuilder::new(Arc::new(DashboardFeed), "2024-25")
    }

    #[tokio::test]
    async fn test_build_features_orders_team_then_opponent() {
        let fv = builder().build_features("BOS", "LAL").await.unwrap();
        assert_eq!(fv.as_slice().len(), 16);
        assert_eq!(fv[0], 110.0);
        assert_eq!(fv[8], 105.0);
        assert_eq!(fv[1], 26.1);
        assert_eq!(fv[7], 0.371);
        assert_eq!(fv.team()[5], 0.474);
        assert_eq!(fv.opponent()[6], 0.801);
    }

    #[tokio::test]
    async fn test_lowercase_abbreviations_resolve() {
        let fv = builder().build_features("bos", "lal").await.unwrap();
        assert_eq!(fv[0], 110.0);
    }

    #[tokio::test]
    async fn test_unknown_team() {
        let err = builder().build_features("XXX", "LAL").await.unwrap_err();
        assert!(matches!(err, StatsError::UnknownTeam(ref t) if t == "XXX"));
        let err = builder().build_features("BOS", "ZZZ").await.unwrap_err();
        assert!(matches!(err, StatsError::UnknownTeam(ref t) if t == "ZZZ"));
    }

    #[tokio::test]
    async fn test_empty_dashboard_is_data_unavailable() {
        let err = builder().build_features("BOS", "GSW").await.unwrap_err();
        match err {
            StatsError::DataUnavailable { team, reason } => {
                assert_eq!(team, "GSW");
                assert!(reason.contains("no rows"), "reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_is_data_unavailable() {
        let err = builder().build_features("MIA", "BOS").await.unwrap_err();
        match err {
            StatsError::DataUnavailable { team, reason } => {
                assert_eq!(team, "MIA");
                assert!(reason.contains("500"), "reason: {reason}");
                assert!(!reason.contains("<html>"), "reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_team_record_returns_dashboard_row() {
        let row = builder().team_record("LAL").await.unwrap();
        assert_eq!(row.get_f64("PTS"), Some(105.0));
        assert_eq!(row.get_str("GROUP_SET"), Some("Overall"));
    }

    #[test]
    fn test_from_slice_validates() {
        assert!(FeatureVector::from_slice(&[1.0; 16]).is_ok());
        assert!(matches!(
            FeatureVector::from_slice(&[1.0; 15]),
            Err(StatsError::InvalidFeatures(_))
        ));
        let mut values = [1.0; 16];
        values[3] = f64::NAN;
        assert!(matches!(
            FeatureVector::from_slice(&values),
            Err(StatsError::InvalidFeatures(_))
        ));
    }

    #[test]
    fn test_missing_column_is_no_data() {
        let resp = json!({ "resultSets": [{ "headers": ["PTS"], "rowSet": [[101.0]] }] });
        let table = StatTable::from_response(&resp).unwrap();
        let err = team_features(table.first_row().unwrap()).unwrap_err();
        assert!(err.to_string().contains("AST"));
    }
}
