use serde::{Deserialize, Serialize};

/// A one-time authorization code bound to the client it was issued for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    pub code: String,
    pub client_id: String,
}

impl AuthorizationCode {
    /// Mint a fresh opaque code for a client.
    pub fn new(client_id: String) -> Self {
        Self {
            code: uuid::Uuid::new_v4().to_string(),
            client_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let a = AuthorizationCode::new("client-1".to_string());
        let b = AuthorizationCode::new("client-1".to_string());

        assert_ne!(a.code, b.code);
        assert_eq!(a.client_id, b.client_id);
    }
}
