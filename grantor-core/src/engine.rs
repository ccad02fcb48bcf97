use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use url::Url;

use crate::models::client::{GRANT_TYPE_AUTHORIZATION_CODE, RESPONSE_TYPE_CODE};
use crate::models::{
    AuthorizationCode, Claims, Client, ClientMetadata, PendingRequest, RegistrationError,
};
use crate::stores::{AuthorizationCodeStore, ClientRegistry, PendingRequestStore};
use crate::token::TokenCodec;

/// Parameters of an authorization-request admission.
#[derive(Debug, Clone)]
pub struct AuthorizeParams {
    pub client_id: String,
    pub redirect_uri: String,
    pub response_type: String,
    pub state: Option<String>,
    pub scope: Option<String>,
}

/// Why an authorization request was not admitted. All variants surface as
/// a plain 400 at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizeError {
    UnknownClient,
    UnregisteredRedirectUri,
    ScopeNotGranted,
}

impl fmt::Display for AuthorizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownClient => f.write_str("unknown client_id"),
            Self::UnregisteredRedirectUri => f.write_str("redirect_uri is not registered"),
            Self::ScopeNotGranted => f.write_str("requested scope was not granted"),
        }
    }
}

impl std::error::Error for AuthorizeError {}

/// The user's decision on a pending request, derived from the presence of
/// the approval field. Any submitted value counts as approval; only an
/// absent field is a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Denied,
}

impl Decision {
    pub fn from_presence(present: bool) -> Self {
        if present {
            Self::Approved
        } else {
            Self::Denied
        }
    }
}

/// The only approval failure that cannot redirect: without a pending
/// request there is no redirect URI to send the user-agent back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproveError {
    UnknownRequestId,
}

impl fmt::Display for ApproveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown request id")
    }
}

impl std::error::Error for ApproveError {}

/// Where the token-endpoint caller presented its credentials. Resolved
/// once at the boundary, then matched exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Header {
        client_id: String,
        client_secret: String,
    },
    Body {
        client_id: String,
        client_secret: String,
    },
    /// Header and body credentials were both supplied.
    Ambiguous,
    Missing,
}

impl CredentialSource {
    /// Classify the supplied credentials. Exactly one source must be
    /// used; mixing the Basic header with body fields is rejected later
    /// as `invalid_client`.
    pub fn resolve(
        header: Option<(String, String)>,
        body_client: Option<String>,
        body_secret: Option<String>,
    ) -> Self {
        match (header, body_client, body_secret) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Self::Ambiguous,
            (Some((client_id, client_secret)), None, None) => Self::Header {
                client_id,
                client_secret,
            },
            (None, Some(client_id), Some(client_secret)) => Self::Body {
                client_id,
                client_secret,
            },
            _ => Self::Missing,
        }
    }
}

/// Why a token exchange failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Missing, ambiguous, or wrong credentials. Deliberately does not
    /// say which half was wrong.
    InvalidClient,
    UnsupportedGrantType,
    MissingCode,
    /// Unknown, already consumed, or issued to a different client.
    InvalidCode,
    SigningFailed,
}

impl TokenError {
    /// Wire-level error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidClient => "invalid_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::MissingCode => "invalid_request",
            Self::InvalidCode => "invalid_grant",
            Self::SigningFailed => "server_error",
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::error::Error for TokenError {}

/// Orchestrates the authorization-code protocol end to end: admission,
/// approval, and code-for-token exchange, over the shared stores.
pub struct AuthorizationEngine {
    clients: Arc<ClientRegistry>,
    requests: Arc<PendingRequestStore>,
    codes: Arc<AuthorizationCodeStore>,
    codec: TokenCodec,
    issuer: String,
    audience: String,
    token_ttl: Duration,
}

impl AuthorizationEngine {
    pub fn new(
        clients: Arc<ClientRegistry>,
        requests: Arc<PendingRequestStore>,
        codes: Arc<AuthorizationCodeStore>,
        codec: TokenCodec,
        issuer: String,
        audience: String,
        token_ttl: Duration,
    ) -> Self {
        Self {
            clients,
            requests,
            codes,
            codec,
            issuer,
            audience,
            token_ttl,
        }
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    /// Register a new client from the supplied metadata.
    pub fn register(&self, metadata: &ClientMetadata) -> Result<Client, RegistrationError> {
        let client = Client::from_metadata(metadata)?;
        tracing::info!(client_id = %client.client_id, "registered client");
        self.clients.insert(client.clone());
        Ok(client)
    }

    /// Admit an authorization request: validate the client, the redirect
    /// URI, and the requested scope, then park the request for approval.
    /// The returned value is the opaque request handle, not the later
    /// authorization code.
    pub fn authorize(&self, params: AuthorizeParams) -> Result<String, AuthorizeError> {
        let client = self
            .clients
            .find_by_id(&params.client_id)
            .ok_or(AuthorizeError::UnknownClient)?;

        if !client.has_redirect_uri(&params.redirect_uri) {
            return Err(AuthorizeError::UnregisteredRedirectUri);
        }

        if let Some(scope) = params.scope.as_deref() {
            if !client.allows_scope(scope) {
                return Err(AuthorizeError::ScopeNotGranted);
            }
        }

        // Registered URIs were parse-checked at registration.
        let redirect_uri = Url::parse(&params.redirect_uri)
            .map_err(|_| AuthorizeError::UnregisteredRedirectUri)?;

        let request = PendingRequest::new(
            client.client_id,
            redirect_uri,
            params.response_type,
            params.state,
            params.scope,
        );
        let request_id = request.request_id.clone();
        tracing::debug!(request_id = %request_id, "admitted authorization request");
        self.requests.insert(request);

        Ok(request_id)
    }

    /// Resolve a pending request. Single transition per request id: the
    /// store removes on first consumption, so a second call always fails.
    /// Every outcome other than an unknown id is a redirect back to the
    /// client, carrying either the freshly minted code or an error code
    /// in the query component.
    pub fn decide(&self, request_id: &str, decision: Decision) -> Result<Url, ApproveError> {
        let request = self
            .requests
            .take(request_id)
            .ok_or(ApproveError::UnknownRequestId)?;

        let mut url = request.redirect_uri;
        match decision {
            Decision::Denied => {
                // Denial does not echo state, per OAuth error convention.
                url.set_query(Some("error=access_denied"));
            }
            Decision::Approved if request.response_type != RESPONSE_TYPE_CODE => {
                url.set_query(Some("error=unsupported_response_type"));
            }
            Decision::Approved => {
                let code = AuthorizationCode::new(request.client_id);
                url.set_query(None);
                url.query_pairs_mut()
                    .append_pair("code", &code.code)
                    .append_pair("state", request.state.as_deref().unwrap_or(""));
                tracing::debug!(request_id = %request_id, "issued authorization code");
                self.codes.insert(code);
            }
        }

        Ok(url)
    }

    /// Authenticate a token-endpoint caller. Every failure collapses to
    /// `InvalidClient`.
    pub fn authenticate(&self, credentials: &CredentialSource) -> Result<Client, TokenError> {
        let (client_id, client_secret) = match credentials {
            CredentialSource::Header {
                client_id,
                client_secret,
            }
            | CredentialSource::Body {
                client_id,
                client_secret,
            } => (client_id, client_secret),
            CredentialSource::Ambiguous | CredentialSource::Missing => {
                return Err(TokenError::InvalidClient)
            }
        };

        let client = self
            .clients
            .find_by_id(client_id)
            .ok_or(TokenError::InvalidClient)?;

        if client.client_secret != *client_secret {
            return Err(TokenError::InvalidClient);
        }

        Ok(client)
    }

    /// Exchange a one-time authorization code for a signed bearer token.
    /// Identity is established before any grant validation.
    pub fn exchange(
        &self,
        credentials: &CredentialSource,
        grant_type: Option<&str>,
        code: Option<&str>,
    ) -> Result<String, TokenError> {
        let client = self.authenticate(credentials)?;

        if grant_type != Some(GRANT_TYPE_AUTHORIZATION_CODE) {
            return Err(TokenError::UnsupportedGrantType);
        }

        let code = code.ok_or(TokenError::MissingCode)?;

        // Removal is atomic with the lookup, so a code redeemed twice
        // concurrently succeeds exactly once.
        let owner = self.codes.take(code).ok_or(TokenError::InvalidCode)?;
        if owner != client.client_id {
            return Err(TokenError::InvalidCode);
        }

        let claims = Claims::new(
            self.issuer.clone(),
            client.client_id.clone(),
            self.audience.clone(),
            self.token_ttl,
            client.scope_string(),
        );

        tracing::info!(client_id = %client.client_id, jti = %claims.jti, "issued access token");
        self.codec.encode(&claims).map_err(|e| {
            tracing::error!("failed to sign token: {:?}", e);
            TokenError::SigningFailed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ISSUER: &str = "http://localhost:9001";
    const AUDIENCE: &str = "http://localhost:9002";
    const REDIRECT_URI: &str = "http://localhost:9000/callback";

    fn engine() -> AuthorizationEngine {
        AuthorizationEngine::new(
            Arc::new(ClientRegistry::new()),
            Arc::new(PendingRequestStore::new()),
            Arc::new(AuthorizationCodeStore::new()),
            TokenCodec::new("shared-secret"),
            ISSUER.to_string(),
            AUDIENCE.to_string(),
            Duration::seconds(3600),
        )
    }

    fn register(engine: &AuthorizationEngine, scope: Option<&str>) -> Client {
        engine
            .register(&ClientMetadata {
                redirect_uris: vec![REDIRECT_URI.to_string()],
                scope: scope.map(str::to_string),
                ..Default::default()
            })
            .unwrap()
    }

    fn authorize(engine: &AuthorizationEngine, client: &Client, response_type: &str) -> String {
        engine
            .authorize(AuthorizeParams {
                client_id: client.client_id.clone(),
                redirect_uri: REDIRECT_URI.to_string(),
                response_type: response_type.to_string(),
                state: Some("xyz".to_string()),
                scope: None,
            })
            .unwrap()
    }

    fn approved_code(engine: &AuthorizationEngine, client: &Client) -> String {
        let request_id = authorize(engine, client, "code");
        let url = engine.decide(&request_id, Decision::Approved).unwrap();
        url.query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    fn header_credentials(client: &Client) -> CredentialSource {
        CredentialSource::Header {
            client_id: client.client_id.clone(),
            client_secret: client.client_secret.clone(),
        }
    }

    #[test]
    fn test_authorize_unknown_client() {
        let engine = engine();
        let result = engine.authorize(AuthorizeParams {
            client_id: "nope".to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
            response_type: "code".to_string(),
            state: None,
            scope: None,
        });

        assert_eq!(result, Err(AuthorizeError::UnknownClient));
    }

    #[test]
    fn test_authorize_unregistered_redirect_uri() {
        let engine = engine();
        let client = register(&engine, None);

        let result = engine.authorize(AuthorizeParams {
            client_id: client.client_id,
            redirect_uri: "http://evil.example/callback".to_string(),
            response_type: "code".to_string(),
            state: None,
            scope: None,
        });

        assert_eq!(result, Err(AuthorizeError::UnregisteredRedirectUri));
    }

    #[test]
    fn test_authorize_scope_must_be_registered() {
        let engine = engine();
        let client = register(&engine, Some("a b"));

        let admitted = engine.authorize(AuthorizeParams {
            client_id: client.client_id.clone(),
            redirect_uri: REDIRECT_URI.to_string(),
            response_type: "code".to_string(),
            state: None,
            scope: Some("a".to_string()),
        });
        assert!(admitted.is_ok());

        let rejected = engine.authorize(AuthorizeParams {
            client_id: client.client_id,
            redirect_uri: REDIRECT_URI.to_string(),
            response_type: "code".to_string(),
            state: None,
            scope: Some("z".to_string()),
        });
        assert_eq!(rejected, Err(AuthorizeError::ScopeNotGranted));
    }

    #[test]
    fn test_decide_unknown_request_id() {
        let engine = engine();
        assert_eq!(
            engine.decide("nope", Decision::Approved),
            Err(ApproveError::UnknownRequestId)
        );
    }

    #[test]
    fn test_request_id_is_single_use() {
        let engine = engine();
        let client = register(&engine, None);
        let request_id = authorize(&engine, &client, "code");

        assert!(engine.decide(&request_id, Decision::Approved).is_ok());
        assert_eq!(
            engine.decide(&request_id, Decision::Approved),
            Err(ApproveError::UnknownRequestId)
        );
    }

    #[test]
    fn test_denial_redirects_with_access_denied() {
        let engine = engine();
        let client = register(&engine, None);
        let request_id = authorize(&engine, &client, "code");

        let url = engine.decide(&request_id, Decision::Denied).unwrap();

        assert_eq!(url.query(), Some("error=access_denied"));
        assert_eq!(url.path(), "/callback");
        assert_eq!(url.host_str(), Some("localhost"));
    }

    #[test]
    fn test_non_code_response_type_redirects_with_error() {
        let engine = engine();
        let client = register(&engine, None);
        let request_id = authorize(&engine, &client, "token");

        let url = engine.decide(&request_id, Decision::Approved).unwrap();

        assert_eq!(url.query(), Some("error=unsupported_response_type"));
    }

    #[test]
    fn test_approval_redirects_with_code_and_state() {
        let engine = engine();
        let client = register(&engine, None);
        let request_id = authorize(&engine, &client, "code");

        let url = engine.decide(&request_id, Decision::Approved).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "code");
        assert!(!pairs[0].1.is_empty());
        assert_eq!(pairs[1], ("state".to_string(), "xyz".to_string()));
    }

    #[test]
    fn test_approval_without_state_appends_empty_state() {
        let engine = engine();
        let client = register(&engine, None);
        let request_id = engine
            .authorize(AuthorizeParams {
                client_id: client.client_id,
                redirect_uri: REDIRECT_URI.to_string(),
                response_type: "code".to_string(),
                state: None,
                scope: None,
            })
            .unwrap();

        let url = engine.decide(&request_id, Decision::Approved).unwrap();
        let state = url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned());

        assert_eq!(state, Some(String::new()));
    }

    #[test]
    fn test_exchange_happy_path() {
        let engine = engine();
        let client = register(&engine, Some("read"));
        let code = approved_code(&engine, &client);

        let token = engine
            .exchange(
                &header_credentials(&client),
                Some("authorization_code"),
                Some(&code),
            )
            .unwrap();

        let codec = TokenCodec::new("shared-secret");
        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.aud, AUDIENCE);
        assert_eq!(claims.sub, client.client_id);
        assert_eq!(claims.scope.as_deref(), Some("read"));
        assert!(codec.verify(&token, ISSUER, AUDIENCE, "read"));
    }

    #[test]
    fn test_exchange_with_body_credentials() {
        let engine = engine();
        let client = register(&engine, None);
        let code = approved_code(&engine, &client);

        let credentials = CredentialSource::Body {
            client_id: client.client_id.clone(),
            client_secret: client.client_secret.clone(),
        };

        assert!(engine
            .exchange(&credentials, Some("authorization_code"), Some(&code))
            .is_ok());
    }

    #[test]
    fn test_exchange_rejects_ambiguous_credentials() {
        let engine = engine();
        let client = register(&engine, None);
        let code = approved_code(&engine, &client);

        let result = engine.exchange(
            &CredentialSource::Ambiguous,
            Some("authorization_code"),
            Some(&code),
        );

        assert_eq!(result, Err(TokenError::InvalidClient));
    }

    #[test]
    fn test_exchange_rejects_missing_credentials() {
        let engine = engine();
        assert_eq!(
            engine.exchange(&CredentialSource::Missing, Some("authorization_code"), None),
            Err(TokenError::InvalidClient)
        );
    }

    #[test]
    fn test_exchange_rejects_wrong_secret() {
        let engine = engine();
        let client = register(&engine, None);
        let code = approved_code(&engine, &client);

        let credentials = CredentialSource::Header {
            client_id: client.client_id.clone(),
            client_secret: "wrong".to_string(),
        };

        assert_eq!(
            engine.exchange(&credentials, Some("authorization_code"), Some(&code)),
            Err(TokenError::InvalidClient)
        );
    }

    #[test]
    fn test_exchange_rejects_unknown_client() {
        let engine = engine();
        let credentials = CredentialSource::Header {
            client_id: "nope".to_string(),
            client_secret: "nope".to_string(),
        };

        assert_eq!(
            engine.exchange(&credentials, Some("authorization_code"), Some("code")),
            Err(TokenError::InvalidClient)
        );
    }

    #[test]
    fn test_exchange_requires_authorization_code_grant() {
        let engine = engine();
        let client = register(&engine, None);
        let code = approved_code(&engine, &client);
        let credentials = header_credentials(&client);

        assert_eq!(
            engine.exchange(&credentials, Some("client_credentials"), Some(&code)),
            Err(TokenError::UnsupportedGrantType)
        );
        assert_eq!(
            engine.exchange(&credentials, None, Some(&code)),
            Err(TokenError::UnsupportedGrantType)
        );
    }

    #[test]
    fn test_exchange_requires_code() {
        let engine = engine();
        let client = register(&engine, None);

        assert_eq!(
            engine.exchange(&header_credentials(&client), Some("authorization_code"), None),
            Err(TokenError::MissingCode)
        );
    }

    #[test]
    fn test_code_is_single_use() {
        let engine = engine();
        let client = register(&engine, None);
        let code = approved_code(&engine, &client);
        let credentials = header_credentials(&client);

        assert!(engine
            .exchange(&credentials, Some("authorization_code"), Some(&code))
            .is_ok());
        assert_eq!(
            engine.exchange(&credentials, Some("authorization_code"), Some(&code)),
            Err(TokenError::InvalidCode)
        );
    }

    #[test]
    fn test_code_cannot_be_redeemed_by_another_client() {
        let engine = engine();
        let owner = register(&engine, None);
        let other = register(&engine, None);
        let code = approved_code(&engine, &owner);

        let result = engine.exchange(
            &header_credentials(&other),
            Some("authorization_code"),
            Some(&code),
        );

        assert_eq!(result, Err(TokenError::InvalidCode));
    }

    #[test]
    fn test_credential_source_resolution() {
        let header = Some(("id".to_string(), "secret".to_string()));

        assert_eq!(
            CredentialSource::resolve(header.clone(), None, None),
            CredentialSource::Header {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            }
        );
        assert_eq!(
            CredentialSource::resolve(None, Some("id".to_string()), Some("secret".to_string())),
            CredentialSource::Body {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            }
        );
        assert_eq!(
            CredentialSource::resolve(header.clone(), Some("id".to_string()), None),
            CredentialSource::Ambiguous
        );
        assert_eq!(
            CredentialSource::resolve(header, None, Some("secret".to_string())),
            CredentialSource::Ambiguous
        );
        assert_eq!(
            CredentialSource::resolve(None, None, None),
            CredentialSource::Missing
        );
        assert_eq!(
            CredentialSource::resolve(None, Some("id".to_string()), None),
            CredentialSource::Missing
        );
    }

    #[test]
    fn test_decision_from_presence() {
        assert_eq!(Decision::from_presence(true), Decision::Approved);
        assert_eq!(Decision::from_presence(false), Decision::Denied);
    }
}
