//! HTTP helpers shared by the handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Body text for a request body that does not decode.
pub const INVALID_JSON_PAYLOAD: &str = "Invalid JSON payload";

/// Parse a request body as JSON.
///
/// The `Content-Type` header is not consulted; any decoding failure becomes a
/// validation error carrying [`INVALID_JSON_PAYLOAD`].
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejecting request body");
        Error::validation(INVALID_JSON_PAYLOAD)
    })
}

/// Errors render as a plain-text body with the mapped status code.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.public_message().to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Appointment;

    #[test]
    fn test_parse_json_body() {
        let appt: Appointment = parse_json_body(br#"{"name":"Alice"}"#).unwrap();
        assert_eq!(appt.name, "Alice");

        let err = parse_json_body::<Appointment>(b"{not json").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.public_message(), INVALID_JSON_PAYLOAD);

        assert!(parse_json_body::<Appointment>(b"").is_err());
    }

    #[test]
    fn test_error_response_is_plain_text() {
        let response = Error::not_found("Appointment not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
    }
}
