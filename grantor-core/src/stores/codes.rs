use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::AuthorizationCode;

/// Issued one-time authorization codes mapped to their owning client.
/// Redemption removes the entry atomically with the lookup so a code can
/// never be replayed, even under concurrent redemption attempts.
#[derive(Debug, Default)]
pub struct AuthorizationCodeStore {
    codes: RwLock<HashMap<String, String>>,
}

impl AuthorizationCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, code: AuthorizationCode) {
        self.codes.write().insert(code.code, code.client_id);
    }

    /// Atomic get-and-remove; returns the owning client id.
    pub fn take(&self, code: &str) -> Option<String> {
        self.codes.write().remove(code)
    }
}
