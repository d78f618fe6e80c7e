//! Authentication types for JWT and auth payloads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access and refresh tokens.
///
/// Hearth tokens identify only the user; roles are per group and resolved
/// on every request through the membership lookup, never cached in a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Token pair returned after successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
    /// Access token expiration in seconds.
    pub expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair.
    #[must_use]
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
        }
    }
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// User email.
    pub email: String,
    /// User password (plaintext, hashed before storage).
    pub password: String,
    /// Display name.
    pub name: String,
    /// Optional date of birth.
    pub dob: Option<NaiveDate>,
    /// Optional sex.
    pub sex: Option<String>,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Refresh request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token issued at login.
    pub refresh_token: String,
}

/// Public user details (never includes the password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Date of birth, if provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    /// Sex, if provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Response for successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Issued token pair.
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// The authenticated user.
    pub user: UserInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_carry_user_id() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Utc::now() + Duration::minutes(15));
        assert_eq!(claims.user_id(), user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_pair_new() {
        let pair = TokenPair::new("access".into(), "refresh".into(), 900);
        assert_eq!(pair.access_token, "access");
        assert_eq!(pair.refresh_token, "refresh");
        assert_eq!(pair.expires_in, 900);
    }
}
