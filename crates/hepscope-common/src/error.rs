use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HepscopeError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("Security policy violation: {0}")]
    SecurityError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, HepscopeError>;

/// Error returned by HTTP handlers. Rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_)   => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_)   => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_)   => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<HepscopeError> for ApiError {
    fn from(err: HepscopeError) -> Self {
        match err {
            HepscopeError::NotFound(msg) => ApiError::NotFound(msg),
            HepscopeError::SecurityError(msg) => ApiError::BadRequest(msg),
            HepscopeError::Url(e) => ApiError::BadRequest(e.to_string()),
            e @ (HepscopeError::Http(_) | HepscopeError::UpstreamStatus { .. }) => {
                ApiError::Upstream(e.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_maps_to_bad_gateway() {
        let err: ApiError = HepscopeError::UpstreamStatus {
            status: 503,
            url: "https://inspirehep.net/api/literature/1".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_not_found_and_security_mapping() {
        let nf: ApiError = HepscopeError::NotFound("session abc".to_string()).into();
        assert_eq!(nf.status(), StatusCode::NOT_FOUND);

        let sec: ApiError = HepscopeError::SecurityError("blocked".to_string()).into();
        assert_eq!(sec.status(), StatusCode::BAD_REQUEST);

        let cfg: ApiError = HepscopeError::Config("bad".to_string()).into();
        assert_eq!(cfg.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
