use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::Client;

/// In-memory registry of registered clients. Append-mostly and
/// read-heavy; lookups clone the stored client out of the lock.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<String, Client>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, client: Client) {
        self.clients
            .write()
            .insert(client.client_id.clone(), client);
    }

    pub fn find_by_id(&self, client_id: &str) -> Option<Client> {
        self.clients.read().get(client_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }
}
