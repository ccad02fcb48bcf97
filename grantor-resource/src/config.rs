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

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Must match the authorization server's signing secret, or no token
    /// will ever verify.
    pub signing_secret: String,
    /// Issuer URI expected in the `iss` claim.
    pub issuer: String,
    /// This service's own URI, expected in the `aud` claim.
    pub audience: String,
    /// Scope a caller must hold to reach the protected resource.
    pub required_scope: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "9002".to_string())
                .parse()
                .context("Invalid PORT")?,
            signing_secret: env::var("SIGNING_SECRET")
                .unwrap_or_else(|_| "development-secret".to_string()),
            issuer: env::var("ISSUER").unwrap_or_else(|_| "http://localhost:9001".to_string()),
            audience: env::var("AUDIENCE")
                .unwrap_or_else(|_| "http://localhost:9002".to_string()),
            required_scope: env::var("REQUIRED_SCOPE").unwrap_or_else(|_| "read".to_string()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
