use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// Claim set carried by a bearer token. Never persisted; re-derived from
/// the token bytes on every verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Claims {
    /// Build a claim set issued now and expiring after `ttl`, with a
    /// fresh unguessable `jti`.
    pub fn new(
        issuer: String,
        subject: String,
        audience: String,
        ttl: Duration,
        scope: Option<String>,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            iss: issuer,
            sub: subject,
            aud: audience,
            iat: now,
            exp: now + ttl.num_seconds(),
            jti: uuid::Uuid::new_v4().to_string(),
            scope,
        }
    }

    /// True when the space-separated `scope` claim contains `scope`.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope
            .as_deref()
            .map(|granted| granted.split(' ').any(|s| s == scope))
            .unwrap_or(false)
    }

    /// Time-window check: not issued in the future, not expired.
    pub fn is_current(&self, now: i64) -> bool {
        self.iat <= now && now <= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Claims {
        Claims::new(
            "http://auth.example".to_string(),
            "client-1".to_string(),
            "http://resource.example".to_string(),
            Duration::seconds(3600),
            Some("read write".to_string()),
        )
    }

    #[test]
    fn test_expiry_follows_ttl() {
        let claims = sample();
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_jti_is_fresh() {
        assert_ne!(sample().jti, sample().jti);
    }

    #[test]
    fn test_has_scope_splits_on_spaces() {
        let claims = sample();

        assert!(claims.has_scope("read"));
        assert!(claims.has_scope("write"));
        assert!(!claims.has_scope("admin"));
        assert!(!claims.has_scope("read write"));
    }

    #[test]
    fn test_has_scope_requires_scope_claim() {
        let claims = Claims {
            scope: None,
            ..sample()
        };
        assert!(!claims.has_scope("read"));
    }

    #[test]
    fn test_time_window() {
        let claims = sample();

        assert!(claims.is_current(claims.iat));
        assert!(claims.is_current(claims.exp));
        assert!(!claims.is_current(claims.iat - 1));
        assert!(!claims.is_current(claims.exp + 1));
    }

    #[test]
    fn test_scope_is_omitted_from_json_when_absent() {
        let claims = Claims {
            scope: None,
            ..sample()
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("scope"));
    }
}
