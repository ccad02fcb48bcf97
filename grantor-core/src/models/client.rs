use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

pub const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";
pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";
pub const RESPONSE_TYPE_CODE: &str = "code";

/// How a client proves its identity at the token endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TokenEndpointAuthMethod {
    #[default]
    #[serde(rename = "secret_basic")]
    SecretBasic,
    #[serde(rename = "secret_post")]
    SecretPost,
}

impl TokenEndpointAuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecretBasic => "secret_basic",
            Self::SecretPost => "secret_post",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "secret_basic" => Some(Self::SecretBasic),
            "secret_post" => Some(Self::SecretPost),
            _ => None,
        }
    }
}

/// Metadata supplied by a registration request. Everything is optional
/// except the redirect URIs; the server fills in the mandatory defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientMetadata {
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    #[serde(default)]
    pub grant_types: Vec<String>,
    #[serde(default)]
    pub response_types: Vec<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_endpoint_auth_method: Option<String>,
}

/// Why a registration request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    InvalidClientMetadata,
    InvalidRedirectUri,
}

impl RegistrationError {
    /// Wire-level error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidClientMetadata => "invalid_client_metadata",
            Self::InvalidRedirectUri => "invalid_redirect_uri",
        }
    }
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::error::Error for RegistrationError {}

/// A registered OAuth2 client. Immutable once created; owned by the
/// `ClientRegistry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
    pub scopes: BTreeSet<String>,
    pub grant_types: BTreeSet<String>,
    pub response_types: BTreeSet<String>,
    pub token_endpoint_auth_method: TokenEndpointAuthMethod,
}

impl Client {
    /// Validate registration metadata and build a client with freshly
    /// minted credentials.
    pub fn from_metadata(metadata: &ClientMetadata) -> Result<Self, RegistrationError> {
        let token_endpoint_auth_method = match metadata.token_endpoint_auth_method.as_deref() {
            None => TokenEndpointAuthMethod::default(),
            Some(value) => TokenEndpointAuthMethod::parse(value)
                .ok_or(RegistrationError::InvalidClientMetadata)?,
        };

        // The server always grants the authorization-code flow, even when
        // the request omitted it.
        let mut grant_types: BTreeSet<String> = metadata.grant_types.iter().cloned().collect();
        grant_types.insert(GRANT_TYPE_AUTHORIZATION_CODE.to_string());

        let mut response_types: BTreeSet<String> =
            metadata.response_types.iter().cloned().collect();
        response_types.insert(RESPONSE_TYPE_CODE.to_string());

        if !grant_types
            .iter()
            .all(|g| g == GRANT_TYPE_AUTHORIZATION_CODE || g == GRANT_TYPE_REFRESH_TOKEN)
        {
            return Err(RegistrationError::InvalidClientMetadata);
        }

        if !response_types.iter().all(|r| r == RESPONSE_TYPE_CODE) {
            return Err(RegistrationError::InvalidClientMetadata);
        }

        if metadata.redirect_uris.is_empty() {
            return Err(RegistrationError::InvalidRedirectUri);
        }

        for uri in &metadata.redirect_uris {
            if Url::parse(uri).is_err() {
                return Err(RegistrationError::InvalidRedirectUri);
            }
        }

        let scopes = metadata
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Ok(Self {
            client_id: uuid::Uuid::new_v4().to_string(),
            client_secret: uuid::Uuid::new_v4().to_string(),
            redirect_uris: metadata.redirect_uris.clone(),
            scopes,
            grant_types,
            response_types,
            token_endpoint_auth_method,
        })
    }

    /// Exact string match against the registered redirect URIs. Same-host
    /// or prefix matches do not count.
    pub fn has_redirect_uri(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Check a space-separated scope request against the registered scope
    /// set. An empty or absent request is always allowed.
    pub fn allows_scope(&self, requested: &str) -> bool {
        requested
            .split_whitespace()
            .all(|scope| self.scopes.contains(scope))
    }

    /// Space-joined registered scopes, `None` when the client has none.
    pub fn scope_string(&self) -> Option<String> {
        if self.scopes.is_empty() {
            None
        } else {
            Some(
                self.scopes
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        }
    }
}
