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

use grantor_core::TokenCodec;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub codec: TokenCodec,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            codec: TokenCodec::new(&config.signing_secret),
            config,
        }
    }
}
