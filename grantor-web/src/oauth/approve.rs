use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use url::Url;

use grantor_core::engine::{ApproveError, Decision};

use crate::state::AppState;

use super::errors::ValidationProblem;

/// Approval form. `approve` is a pure presence check: any value counts
/// as approval, only an absent field is a denial.
#[derive(Debug, Deserialize)]
pub struct ApproveForm {
    #[serde(rename = "reqId")]
    pub req_id: Option<String>,
    pub approve: Option<String>,
}

/// Approval endpoint: resolves a pending request exactly once and sends
/// the user-agent back to the client with either a code or an error code
/// in the query string.
pub async fn approve_handler(
    State(state): State<AppState>,
    Form(form): Form<ApproveForm>,
) -> Response {
    let req_id = match form.req_id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => {
            return ValidationProblem::field("reqId", "requestId is mandatory").into_response();
        }
    };

    let decision = Decision::from_presence(form.approve.is_some());

    match state.engine.decide(req_id, decision) {
        Ok(url) => found(&url),
        Err(ApproveError::UnknownRequestId) => {
            ValidationProblem::field("reqId", "Unknown requestId").into_response()
        }
    }
}

/// 302 Found. `axum::response::Redirect` only offers 303/307/308, and the
/// user-agent must not replay the form POST against the client.
fn found(url: &Url) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response()
}
