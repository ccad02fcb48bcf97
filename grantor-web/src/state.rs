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

use std::sync::Arc;

use chrono::Duration;
use grantor_core::stores::{AuthorizationCodeStore, ClientRegistry, PendingRequestStore};
use grantor_core::{AuthorizationEngine, TokenCodec};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AuthorizationEngine>,
    pub config: Config,
}

impl AppState {
    /// Wire the shared stores and the token codec into an engine.
    pub fn new(config: Config) -> Self {
        let engine = AuthorizationEngine::new(
            Arc::new(ClientRegistry::new()),
            Arc::new(PendingRequestStore::new()),
            Arc::new(AuthorizationCodeStore::new()),
            TokenCodec::new(&config.signing_secret),
            config.issuer.clone(),
            config.audience.clone(),
            Duration::seconds(config.token_ttl_secs),
        );

        Self {
            engine: Arc::new(engine),
            config,
        }
    }
}
