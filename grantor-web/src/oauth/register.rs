use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use grantor_core::models::{Client, ClientMetadata};

use crate::state::AppState;

use super::errors::OAuthErrorResponse;

/// Registration response: the minted credentials plus the normalized
/// metadata actually stored for the client.
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
    pub grant_types: Vec<String>,
    pub response_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub token_endpoint_auth_method: &'static str,
}

impl From<Client> for RegistrationResponse {
    fn from(client: Client) -> Self {
        Self {
            scope: client.scope_string(),
            token_endpoint_auth_method: client.token_endpoint_auth_method.as_str(),
            client_id: client.client_id,
            client_secret: client.client_secret,
            redirect_uris: client.redirect_uris,
            grant_types: client.grant_types.into_iter().collect(),
            response_types: client.response_types.into_iter().collect(),
        }
    }
}

/// Client registration endpoint
pub async fn register_handler(
    State(state): State<AppState>,
    Json(metadata): Json<ClientMetadata>,
) -> impl IntoResponse {
    match state.engine.register(&metadata) {
        Ok(client) => {
            (StatusCode::OK, Json(RegistrationResponse::from(client))).into_response()
        }
        Err(error) => OAuthErrorResponse::from(error).into_response(),
    }
}
