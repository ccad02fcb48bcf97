use axum::{extract::State, response::IntoResponse, Form, Json};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use serde::{Deserialize, Serialize};

use grantor_core::engine::CredentialSource;

use crate::state::AppState;

use super::errors::OAuthErrorResponse;

/// Token request form. Credentials may arrive here (`client`/`secret`)
/// instead of the Basic header, but never in both places at once.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub grant_type: Option<String>,
    pub code: Option<String>,
    pub client: Option<String>,
    pub secret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Token endpoint. A present but non-Basic Authorization header is
/// rejected by the typed-header extractor with a 400 before we get here;
/// an absent header resolves to `None`.
pub async fn token_handler(
    State(state): State<AppState>,
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    Form(form): Form<TokenForm>,
) -> impl IntoResponse {
    let header = auth_header
        .map(|TypedHeader(auth)| (auth.username().to_string(), auth.password().to_string()));

    let credentials = CredentialSource::resolve(header, form.client, form.secret);

    match state
        .engine
        .exchange(&credentials, form.grant_type.as_deref(), form.code.as_deref())
    {
        Ok(access_token) => Json(TokenResponse {
            access_token,
            token_type: "Bearer",
        })
        .into_response(),
        Err(error) => OAuthErrorResponse::from(error).into_response(),
    }
}
