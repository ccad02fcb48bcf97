use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use grantor_core::engine::AuthorizeParams;

use crate::state::AppState;

use super::errors::OAuthErrorResponse;

/// Authorization request parameters. The required fields are enforced by
/// the query extractor; a missing one is a 400 before the handler runs.
#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub client_id: String,
    pub redirect_uri: String,
    pub response_type: String,
    pub state: Option<String>,
    pub scope: Option<String>,
}

/// The admitted request's handle. This is not the authorization code;
/// that one is only minted once the user approves.
#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub code: String,
}

/// Authorization-request admission endpoint
pub async fn authorize_handler(
    State(state): State<AppState>,
    Query(query): Query<AuthorizeQuery>,
) -> impl IntoResponse {
    let params = AuthorizeParams {
        client_id: query.client_id,
        redirect_uri: query.redirect_uri,
        response_type: query.response_type,
        state: query.state,
        scope: query.scope,
    };

    match state.engine.authorize(params) {
        Ok(request_id) => Json(AuthorizeResponse { code: request_id }).into_response(),
        Err(error) => OAuthErrorResponse::from(error).into_response(),
    }
}
