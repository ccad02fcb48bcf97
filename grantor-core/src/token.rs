use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::models::Claims;

type HmacSha256 = Hmac<Sha256>;

/// Fixed token header. Field order matters: the signature covers the
/// serialized bytes, so both services must produce identical JSON.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Header {
    typ: String,
    alg: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            typ: "JWT".to_string(),
            alg: "HS256".to_string(),
        }
    }
}

/// Encodes and verifies compact signed bearer tokens:
/// `base64url(header).base64url(payload).base64url(hmac_sha256)`, url-safe
/// alphabet, no padding. Shared by the issuing and the verifying service
/// so the bytes under the signature are identical on both sides.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Serialize and sign a claim set.
    pub fn encode(&self, claims: &Claims) -> Result<String> {
        let header = serde_json::to_vec(&Header::default())?;
        let payload = serde_json::to_vec(claims)?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| anyhow!("invalid signing key: {}", e))?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Check the signature and parse the claim set. Returns `None` for
    /// anything malformed; no detail leaks about which check failed.
    pub fn decode(&self, token: &str) -> Option<Claims> {
        let mut segments = token.split('.');
        let (header, payload, signature) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => return None,
            };

        if signature.is_empty() {
            return None;
        }

        let parsed_header: Header =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header).ok()?).ok()?;
        if parsed_header.alg != "HS256" {
            return None;
        }

        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(token[..token.rfind('.')?].as_bytes());
        mac.verify_slice(&signature).ok()?;

        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).ok()?).ok()
    }

    /// Full bearer-token verification: valid signature, expected issuer
    /// and audience, inside the `iat..=exp` window, and the space-split
    /// `scope` claim contains `required_scope`. No partial credit.
    pub fn verify(&self, token: &str, issuer: &str, audience: &str, required_scope: &str) -> bool {
        match self.decode(token) {
            Some(claims) => {
                claims.iss == issuer
                    && claims.aud == audience
                    && claims.is_current(Utc::now().timestamp())
                    && claims.has_scope(required_scope)
            }
            None => false,
        }
    }
}
