pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::User;

pub use password::{hash_password, verify_password, MAX_PASSWORD_BYTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub token_type: TokenType,
    pub user_id: i64,
    pub username: String,
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    fn new(token_type: TokenType, user_id: i64, username: String, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            token_type,
            user_id,
            username,
            jti: Uuid::new_v4().simple().to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    MissingCredentials,
    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,
    #[error("Token is invalid or expired")]
    InvalidToken,
    #[error("Token has wrong type")]
    WrongTokenType,
    #[error("No active account found with the given credentials")]
    InvalidCredentials,
    #[error("User not found")]
    UnknownUser,
    #[error("Password is longer than bcrypt can hash")]
    PasswordTooLong,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

/// Access and refresh token pair handed out on login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and verifies signed bearer tokens (HS256)
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, access_lifetime: Duration, refresh_lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_lifetime,
            refresh_lifetime,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(
            &security.jwt_secret,
            Duration::minutes(security.access_token_minutes),
            Duration::hours(security.refresh_token_hours),
        )
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.issue(TokenType::Access, user.id, &user.username)?,
            refresh: self.issue(TokenType::Refresh, user.id, &user.username)?,
        })
    }

    /// Exchange a valid refresh token for a fresh access token
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.verify(refresh_token, TokenType::Refresh)?;
        self.issue(TokenType::Access, claims.user_id, &claims.username)
    }

    /// Check signature, expiry and token type
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default()).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            AuthError::InvalidToken
        })?;

        if token_data.claims.token_type != expected {
            return Err(AuthError::WrongTokenType);
        }

        Ok(token_data.claims)
    }

    fn issue(&self, token_type: TokenType, user_id: i64, username: &str) -> Result<String, AuthError> {
        let lifetime = match token_type {
            TokenType::Access => self.access_lifetime,
            TokenType::Refresh => self.refresh_lifetime,
        };
        let claims = Claims::new(token_type, user_id, username.to_string(), lifetime);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            email: String::new(),
            password_hash: String::new(),
            date_joined: Utc::now(),
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", Duration::minutes(5), Duration::hours(24))
    }

    #[test]
    fn issued_pair_verifies_with_matching_types() {
        let pair = issuer().issue_pair(&alice()).unwrap();

        let access = issuer().verify(&pair.access, TokenType::Access).unwrap();
        assert_eq!(access.user_id, 7);
        assert_eq!(access.username, "alice");

        let refresh = issuer().verify(&pair.refresh, TokenType::Refresh).unwrap();
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn token_types_are_not_interchangeable() {
        let pair = issuer().issue_pair(&alice()).unwrap();
        assert!(matches!(
            issuer().verify(&pair.refresh, TokenType::Access),
            Err(AuthError::WrongTokenType)
        ));
        assert!(matches!(issuer().refresh(&pair.access), Err(AuthError::WrongTokenType)));
    }

    #[test]
    fn refresh_issues_access_token() {
        let pair = issuer().issue_pair(&alice()).unwrap();
        let access = issuer().refresh(&pair.refresh).unwrap();
        let claims = issuer().verify(&access, TokenType::Access).unwrap();
        assert_eq!(claims.user_id, 7);
    }

    #[test]
    fn expired_and_foreign_tokens_are_rejected() {
        let expired = TokenIssuer::new("test-secret", Duration::hours(-2), Duration::hours(-2));
        let pair = expired.issue_pair(&alice()).unwrap();
        assert!(matches!(issuer().verify(&pair.access, TokenType::Access), Err(AuthError::InvalidToken)));
        assert!(matches!(issuer().refresh(&pair.refresh), Err(AuthError::InvalidToken)));

        let other = TokenIssuer::new("other-secret", Duration::minutes(5), Duration::hours(24));
        let pair = other.issue_pair(&alice()).unwrap();
        assert!(matches!(issuer().verify(&pair.access, TokenType::Access), Err(AuthError::InvalidToken)));
        assert!(matches!(issuer().verify("garbage", TokenType::Access), Err(AuthError::InvalidToken)));
    }
}
