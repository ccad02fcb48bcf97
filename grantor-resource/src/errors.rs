use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Bearer-token error for the protected resource, with the matching
/// `WWW-Authenticate` challenge.
pub struct BearerError {
    pub error: &'static str,
    pub error_description: &'static str,
}

impl BearerError {
    pub fn invalid_token() -> Self {
        Self {
            error: "invalid_token",
            error_description:
                "The access token provided is expired, revoked, malformed, or invalid",
        }
    }

    pub fn insufficient_scope() -> Self {
        Self {
            error: "insufficient_scope",
            error_description:
                "The request requires higher privileges than provided by the access token",
        }
    }
}

impl IntoResponse for BearerError {
    fn into_response(self) -> Response {
        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": self.error,
                "error_description": self.error_description
            })),
        )
            .into_response();

        if let Ok(value) = format!(
            r#"Bearer error="{}", error_description="{}""#,
            self.error, self.error_description
        )
        .parse()
        {
            response.headers_mut().insert("WWW-Authenticate", value);
        }

        response
    }
}
