use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors surfaced by the stats feed, the feature pipeline and the predictor.
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("unknown team abbreviation: {0}")]
    UnknownTeam(String),

    /// `body` is a clipped excerpt for logs and is left out of `Display`,
    /// which reaches API clients.
    #[error("stats provider returned status {status}")]
    Upstream { status: u16, body: String },

    #[error("stats provider request failed: {0}")]
    Network(String),

    #[error("failed to decode stats provider response: {0}")]
    Decode(String),

    #[error("no data: {0}")]
    NoData(String),

    #[error("stats unavailable for {team}: {reason}")]
    DataUnavailable { team: String, reason: String },

    #[error("model has not been trained")]
    ModelNotTrained,

    #[error("invalid feature vector: {0}")]
    InvalidFeatures(String),

    #[error("missing query parameter: {0}")]
    MissingParam(&'static str),

    #[error("model training failed: {0}")]
    Training(String),
}

const BODY_EXCERPT_CHARS: usize = 200;

/// First few hundred characters of an upstream error body.
pub fn body_excerpt(body: &str) -> String {
    let mut excerpt: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
    if excerpt.len() < body.len() {
        excerpt.push_str("...");
    }
    excerpt
}

impl StatsError {
    /// True for transport, status and decode failures from the provider.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            StatsError::Upstream { .. } | StatsError::Network(_) | StatsError::Decode(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            StatsError::UnknownTeam(_) | StatsError::NoData(_) => StatusCode::NOT_FOUND,
            StatsError::MissingParam(_) | StatsError::InvalidFeatures(_) => StatusCode::BAD_REQUEST,
            StatsError::Upstream { .. }
            | StatsError::Network(_)
            | StatsError::Decode(_)
            | StatsError::DataUnavailable { .. } => StatusCode::BAD_GATEWAY,
            StatsError::ModelNotTrained => StatusCode::SERVICE_UNAVAILABLE,
            StatsError::Training(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for StatsError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return StatsError::Upstream {
                status: status.as_u16(),
                body: String::new(),
            };
        }
        if e.is_decode() {
            return StatsError::Decode(e.to_string());
        }
        StatsError::Network(e.to_string())
    }
}

impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(StatsError::UnknownTeam("XXX".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(StatsError::ModelNotTrained.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(StatsError::MissingParam("team").status_code(), StatusCode::BAD_REQUEST);
        let unavailable = StatsError::DataUnavailable {
            team: "BOS".into(),
            reason: "timeout".into(),
        };
        assert_eq!(unavailable.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            StatsError::Training("panicked".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_family() {
        assert!(StatsError::Upstream { status: 500, body: String::new() }.is_upstream());
        assert!(StatsError::Network("reset".into()).is_upstream());
        assert!(!StatsError::NoData("empty".into()).is_upstream());
    }

    #[test]
    fn test_upstream_display_omits_body() {
        let e = StatsError::Upstream {
            status: 503,
            body: "<html><body>Service Unavailable</body></html>".into(),
        };
        assert_eq!(e.to_string(), "stats provider returned status 503");
    }

    #[test]
    fn test_body_excerpt_is_clipped() {
        assert_eq!(body_excerpt("short"), "short");
        let long = "é".repeat(500);
        let excerpt = body_excerpt(&long);
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), BODY_EXCERPT_CHARS + 3);
    }

    #[test]
    fn test_display_carries_reason() {
        let e = StatsError::DataUnavailable {
            team: "LAL".into(),
            reason: "stats provider returned status 503".into(),
        };
        assert!(e.to_string().contains("LAL"));
        assert!(e.to_string().contains("503"));
    }
}
