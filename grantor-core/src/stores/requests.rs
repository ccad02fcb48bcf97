use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::PendingRequest;

/// In-flight authorization requests keyed by request id. Single-use:
/// retrieval removes the entry under one write lock, so two concurrent
/// consumers of the same id see exactly one hit.
#[derive(Debug, Default)]
pub struct PendingRequestStore {
    requests: RwLock<HashMap<String, PendingRequest>>,
}

impl PendingRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, request: PendingRequest) {
        self.requests
            .write()
            .insert(request.request_id.clone(), request);
    }

    /// Atomic get-and-remove.
    pub fn take(&self, request_id: &str) -> Option<PendingRequest> {
        self.requests.write().remove(request_id)
    }
}
