use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use derive_more::Display;

/// Application-level error taxonomy. Every operation boundary returns one of
/// these; nothing propagates to the HTTP layer as an uncaught failure.
#[derive(Debug, Display)]
pub enum AppError {
    /// Bad or missing input, correctable by the caller.
    #[display("{error}: {message}")]
    Validation { error: String, message: String },

    /// Per-client submission quota exhausted for the current window.
    #[display("Rate limit exceeded")]
    RateLimited,

    /// Missing server-side credentials or settings. Operator-fixable.
    #[display("{error}: {message}")]
    Configuration { error: String, message: String },

    /// A delivery provider answered with a non-success status. The provider's
    /// status is passed through; `details` carries the raw response body and
    /// is only populated for the generic-endpoint provider.
    #[display("Upstream failure ({status}): {message}")]
    Upstream {
        status: u16,
        message: String,
        details: Option<String>,
    },

    #[display("Not found: {_0}")]
    NotFound(String),

    /// Unexpected failure. The detail is logged, never surfaced.
    #[display("Internal server error: {_0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(error: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn configuration(error: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Configuration {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation { error, message }
            | AppError::Configuration { error, message } => {
                serde_json::json!({ "error": error, "message": message })
            }
            AppError::RateLimited => serde_json::json!({
                "error": "Too many requests. Please try again later.",
                "message": "Rate limit exceeded. Please wait before submitting again."
            }),
            AppError::Upstream {
                message, details, ..
            } => {
                let mut body = serde_json::json!({
                    "error": "Failed to submit form",
                    "message": message,
                });
                if let Some(details) = details {
                    body["details"] = serde_json::Value::String(details.clone());
                }
                body
            }
            AppError::NotFound(msg) => serde_json::json!({ "error": msg }),
            AppError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                serde_json::json!({
                    "error": "Internal server error",
                    "message": "An unexpected error occurred. Please try again later."
                })
            }
        };

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Internal(format!("outbound request failed: {err}"))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_passed_through() {
        let err = AppError::Upstream {
            status: 422,
            message: "bad captcha".into(),
            details: None,
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn upstream_with_unmappable_status_falls_back_to_bad_gateway() {
        let err = AppError::Upstream {
            status: 42,
            message: "weird".into(),
            details: None,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn rate_limited_maps_to_429() {
        assert_eq!(
            AppError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
