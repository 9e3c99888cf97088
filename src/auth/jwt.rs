use chrono::{DateTime, Utc};
use jsonwebtoken::dangerous::insecure_decode;
use serde::{Deserialize, Serialize};

/// Claims the console reads from a backend-issued token. The backend owns
/// the signing key and verifies signatures itself; here they are only used
/// to reject obviously expired sessions and to label the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<serde_json::Value>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp?, 0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }

    pub fn display_name(&self) -> Option<String> {
        self.username.clone().or_else(|| self.email.clone())
    }
}

/// Decodes the payload of a JWT without checking its signature, whatever
/// algorithm the backend signed it with. Returns `None` for opaque (non-JWT)
/// tokens.
pub fn read_claims(token: &str) -> Option<TokenClaims> {
    insecure_decode::<TokenClaims>(token)
        .map(|data| data.claims)
        .ok()
}
