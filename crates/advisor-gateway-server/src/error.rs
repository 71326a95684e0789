use axum::http::StatusCode;
use std::fmt::{Display, Formatter};

/// Error taxonomy for the gateway core. Refresh-loop failures never surface
/// through this type to request handlers; everything else maps straight to
/// an HTTP status via [`GatewayError::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Connection failure or 5xx from an upstream backend.
    UpstreamUnavailable(String),
    /// Upstream call exceeded its per-call deadline.
    UpstreamTimeout(String),
    /// Upstream payload could not be decoded.
    Decode(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    Validation(String),
    /// The content store has never been populated; serving an empty catalog
    /// as authoritative is not allowed.
    ContentNotReady,
}

impl GatewayError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ContentNotReady => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpstreamUnavailable(msg) => write!(f, "upstream unavailable: {msg}"),
            Self::UpstreamTimeout(msg) => write!(f, "upstream timeout: {msg}"),
            Self::Decode(msg) => write!(f, "malformed upstream payload: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "forbidden: {msg}"),
            Self::Validation(msg) => write!(f, "invalid request: {msg}"),
            Self::ContentNotReady => write!(f, "rule content not loaded yet"),
        }
    }
}

impl std::error::Error for GatewayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        let cases = [
            (GatewayError::UpstreamUnavailable(String::new()), 502),
            (GatewayError::UpstreamTimeout(String::new()), 504),
            (GatewayError::Decode(String::new()), 500),
            (GatewayError::NotFound(String::new()), 404),
            (GatewayError::Unauthorized(String::new()), 401),
            (GatewayError::Forbidden(String::new()), 403),
            (GatewayError::Validation(String::new()), 400),
            (GatewayError::ContentNotReady, 503),
        ];
        for (err, code) in cases {
            assert_eq!(err.status().as_u16(), code, "{err}");
        }
    }
}
