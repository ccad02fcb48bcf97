use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use grantor_core::engine::{AuthorizeError, TokenError};
use grantor_core::models::RegistrationError;

/// JSON error response carrying an OAuth error code. The typed core
/// errors are mapped to wire form exactly once, here.
pub struct OAuthErrorResponse {
    pub status: StatusCode,
    pub error: &'static str,
}

impl IntoResponse for OAuthErrorResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(json!({ "error": self.error }))).into_response();

        if self.status == StatusCode::UNAUTHORIZED {
            if let Ok(value) = "Basic".parse() {
                response.headers_mut().insert("WWW-Authenticate", value);
            }
        }

        response
    }
}

impl From<RegistrationError> for OAuthErrorResponse {
    fn from(error: RegistrationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.code(),
        }
    }
}

impl From<AuthorizeError> for OAuthErrorResponse {
    fn from(_: AuthorizeError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "invalid_request",
        }
    }
}

impl From<TokenError> for OAuthErrorResponse {
    fn from(error: TokenError) -> Self {
        let status = match error {
            TokenError::InvalidClient => StatusCode::UNAUTHORIZED,
            TokenError::SigningFailed => StatusCode::INTERNAL_SERVER_ERROR,
            TokenError::UnsupportedGrantType
            | TokenError::MissingCode
            | TokenError::InvalidCode => StatusCode::BAD_REQUEST,
        };

        Self {
            status,
            error: error.code(),
        }
    }
}

/// Field-keyed validation problem, rendered as JSON with a 400 status.
/// Used where the protocol demands a structured error rather than a
/// redirect, such as an unknown request id on the approval endpoint.
pub struct ValidationProblem {
    errors: HashMap<&'static str, Vec<String>>,
}

impl ValidationProblem {
    pub fn field(name: &'static str, message: impl Into<String>) -> Self {
        let mut errors = HashMap::new();
        errors.insert(name, vec![message.into()]);
        Self { errors }
    }
}

impl IntoResponse for ValidationProblem {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": self.errors })),
        )
            .into_response()
    }
}
