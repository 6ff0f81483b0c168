use reqwest::StatusCode;
use serde::Deserialize;
use wasm_bindgen::JsValue;

const FALLBACK_DETAIL: &str = "Request failed";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("{detail}")]
    Status { status: StatusCode, detail: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Browser error {0}")]
    Browser(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

impl ApiError {
    /// Non-2xx response, carrying the backend's `detail` message when the body has one.
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let detail = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.detail)
            .filter(|detail| !detail.is_empty())
            .unwrap_or_else(|| FALLBACK_DETAIL.to_owned());
        ApiError::Status { status, detail }
    }
}

impl From<JsValue> for ApiError {
    fn from(value: JsValue) -> Self {
        ApiError::Browser(format!("{value:?}"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid url {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid user id {0:?}")]
    UserId(String),

    #[error("Browser error {0}")]
    Browser(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_detail_from_body() {
        let err = ApiError::from_status(
            StatusCode::NOT_FOUND,
            br#"{"detail": "Not found or not permitted"}"#,
        );
        assert_eq!(err.to_string(), "Not found or not permitted");
    }

    #[test]
    fn status_detail_fallback() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert_eq!(err.to_string(), "Request failed");
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, br#"{"to_user": ["bad"]}"#);
        assert_eq!(err.to_string(), "Request failed");
    }
}
