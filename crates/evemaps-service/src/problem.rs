//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Every error leaving the service is a structured problem document.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use evemaps_lib::Error as LibError;

/// Problem type URI for unknown system names.
pub const PROBLEM_UNKNOWN_SYSTEM: &str = "/problems/unknown-system";

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// Problem type URI for service unavailable (e.g. missing universe dataset).
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

/// Problem type URI for exhausted rate limit allowances.
pub const PROBLEM_RATE_LIMITED: &str = "/problems/rate-limited";

/// Problem type URI for route computations that exceeded their deadline.
pub const PROBLEM_TIMEOUT: &str = "/problems/route-timeout";

/// RFC 9457 Problem Details response structure.
///
/// Provides a consistent format for error responses across all endpoints.
///
/// # Example
///
/// ```
/// use evemaps_service::{ProblemDetails, PROBLEM_UNKNOWN_SYSTEM};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_UNKNOWN_SYSTEM,
///     "Unknown System",
///     StatusCode::NOT_FOUND,
/// )
/// .with_detail("System 'Jjita' not found. Did you mean: Jita?")
/// .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (e.g. request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Seconds until the client may retry, for rate limit problems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ProblemDetails {
    /// Create a new ProblemDetails with required fields.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            retry_after: None,
        }
    }

    /// Add a detailed explanation of this specific problem occurrence.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add the request identifier for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// Create a 400 Bad Request problem for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 404 Not Found problem for unknown systems.
    pub fn unknown_system(
        name: &str,
        suggestions: &[String],
        request_id: impl Into<String>,
    ) -> Self {
        let detail = if suggestions.is_empty() {
            format!("System '{}' not found", name)
        } else {
            format!(
                "System '{}' not found. Did you mean: {}?",
                name,
                suggestions.join(", ")
            )
        };

        Self::new(
            PROBLEM_UNKNOWN_SYSTEM,
            "Unknown System",
            StatusCode::NOT_FOUND,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 429 Too Many Requests problem with a retry hint.
    pub fn rate_limited(retry_after_secs: u64, request_id: impl Into<String>) -> Self {
        let mut problem = Self::new(
            PROBLEM_RATE_LIMITED,
            "Too Many Requests",
            StatusCode::TOO_MANY_REQUESTS,
        )
        .with_detail(format!(
            "Rate limit exceeded, retry in {retry_after_secs} seconds"
        ))
        .with_request_id(request_id);
        problem.retry_after = Some(retry_after_secs);
        problem
    }

    /// Create a 504 Gateway Timeout problem for overrun route computations.
    pub fn timeout(seconds: u64, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_TIMEOUT, "Route Timeout", StatusCode::GATEWAY_TIMEOUT)
            .with_detail(format!("Route computation exceeded {seconds} seconds"))
            .with_request_id(request_id)
    }

    /// Create a 500 Internal Server Error problem.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 503 Service Unavailable problem.
    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.detail.as_deref().unwrap_or(""))
    }
}

impl std::error::Error for ProblemDetails {}

/// Implement IntoResponse for axum to return ProblemDetails as HTTP responses.
impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let retry_after = self.retry_after;

        // Set the content-type header to application/problem+json
        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );
        if let Some(seconds) = retry_after {
            if let Ok(value) = axum::http::HeaderValue::from_str(&seconds.to_string()) {
                response
                    .headers_mut()
                    .insert(axum::http::header::RETRY_AFTER, value);
            }
        }

        // Update status code
        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to ProblemDetails.
///
/// The `request_id` must be provided separately since library errors don't have it.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::UnknownSystem { name, suggestions } => {
            ProblemDetails::unknown_system(name, suggestions, request_id)
        }
        LibError::DataUnavailable { path, .. } => ProblemDetails::service_unavailable(
            format!("Universe dataset not available at {}", path.display()),
            request_id,
        ),
        LibError::Timeout { seconds } => ProblemDetails::timeout(*seconds, request_id),
        LibError::RateLimited { retry_after_secs } => {
            ProblemDetails::rate_limited(*retry_after_secs, request_id)
        }
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}
