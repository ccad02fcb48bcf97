// Grantor - An OAuth2 authorization-code server built with Rust
// Copyright (C) 2025 Grantor Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{errors::BearerError, extract, state::AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/resource", get(resource_handler).post(resource_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// The protected resource. The token is self-contained: its validity is
/// re-derived from its own bytes and the shared secret on every call,
/// never looked up anywhere.
async fn resource_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let form_body = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .map(|_| body.as_ref());

    let Some(token) = extract::bearer_token(&headers, form_body, query.as_deref()) else {
        return BearerError::invalid_token().into_response();
    };

    let Some(claims) = state.codec.decode(&token) else {
        return BearerError::invalid_token().into_response();
    };

    let config = &state.config;
    if claims.iss != config.issuer
        || claims.aud != config.audience
        || !claims.is_current(Utc::now().timestamp())
    {
        return BearerError::invalid_token().into_response();
    }

    if !claims.has_scope(&config.required_scope) {
        return BearerError::insufficient_scope().into_response();
    }

    Json(json!({
        "message": "authorized",
        "sub": claims.sub,
        "scope": claims.scope,
    }))
    .into_response()
}
