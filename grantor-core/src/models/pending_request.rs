use serde::{Deserialize, Serialize};
use url::Url;

/// An admitted authorization request waiting for the user's decision.
/// Never mutated in place; consumed exactly once by the approval step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub request_id: String,
    pub client_id: String,
    pub redirect_uri: Url,
    pub response_type: String,
    pub state: Option<String>,
    pub scope: Option<String>,
}

impl PendingRequest {
    /// Mint a pending request with a fresh opaque request id.
    pub fn new(
        client_id: String,
        redirect_uri: Url,
        response_type: String,
        state: Option<String>,
        scope: Option<String>,
    ) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            client_id,
            redirect_uri,
            response_type,
            state,
            scope,
        }
    }
}
