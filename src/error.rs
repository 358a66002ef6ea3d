use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer from the API.
    #[error("API error {status}: {message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The refresh token was rejected; local auth state has been cleared.
    #[error("session expired: {reason}")]
    SessionExpired { reason: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. }) || self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Builds a `Status` error out of a failed response body.
    pub fn from_body(status: u16, reason: Option<&str>, body: &str) -> Self {
        let (code, message) = parse_error_body(body);
        let message = message
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
            })
            .or_else(|| reason.map(str::to_string))
            .unwrap_or_else(|| format!("request failed with status {}", status));
        ApiError::Status {
            status,
            code,
            message,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: ErrorDetail },
    Detail { detail: DetailValue },
    Flat {
        message: String,
        #[serde(default)]
        code: Option<String>,
    },
    Bare { error: String },
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DetailValue {
    Text(String),
    Other(serde_json::Value),
}

fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Nested { error }) => (error.code, error.message),
        Ok(ErrorBody::Detail { detail }) => match detail {
            DetailValue::Text(text) => (None, Some(text)),
            DetailValue::Other(value) => (None, Some(value.to_string())),
        },
        Ok(ErrorBody::Flat { message, code }) => (code, Some(message)),
        Ok(ErrorBody::Bare { error }) => (None, Some(error)),
        Err(_) => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_error_body_keeps_code() {
        let err = ApiError::from_body(
            409,
            Some("Conflict"),
            r#"{"success":false,"error":{"code":"EMAIL_TAKEN","message":"Email already registered"}}"#,
        );
        match err {
            ApiError::Status {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code.as_deref(), Some("EMAIL_TAKEN"));
                assert_eq!(message, "Email already registered");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn detail_and_plain_bodies() {
        let err = ApiError::from_body(404, None, r#"{"detail":"Pet not found"}"#);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "API error 404: Pet not found");

        let err = ApiError::from_body(502, Some("Bad Gateway"), "upstream down");
        assert_eq!(err.to_string(), "API error 502: upstream down");

        let err = ApiError::from_body(500, Some("Internal Server Error"), "{}");
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");
    }

    #[test]
    fn session_expired_counts_as_unauthorized() {
        let err = ApiError::SessionExpired {
            reason: "refresh rejected".into(),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), None);
    }
}
