use super::AuthError;

/// bcrypt only reads this many bytes of input; anything past it is ignored.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password with bcrypt on the blocking pool
pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::PasswordTooLong);
    }

    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Compare a password against a stored bcrypt hash. A malformed hash counts
/// as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    // No stored password can be this long, and bcrypt would compare only a prefix
    if password.len() > MAX_PASSWORD_BYTES {
        return Ok(false);
    }

    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

    match outcome {
        Ok(valid) => Ok(valid),
        Err(e) => {
            tracing::warn!("Stored password hash could not be checked: {}", e);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_round_trip() {
        let hash = hash_password("pw1".to_string(), 4).await.unwrap();
        assert_ne!(hash, "pw1");
        assert!(verify_password("pw1".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("pw2".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn passwords_past_the_bcrypt_limit_never_match() {
        let stored = "a".repeat(MAX_PASSWORD_BYTES);
        let hash = hash_password(stored.clone(), 4).await.unwrap();
        assert!(verify_password(stored.clone(), hash.clone()).await.unwrap());

        let longer = format!("{}TWO", stored);
        assert!(!verify_password(longer.clone(), hash).await.unwrap());
        assert!(matches!(hash_password(longer, 4).await, Err(AuthError::PasswordTooLong)));
    }

    #[tokio::test]
    async fn malformed_hash_is_a_mismatch() {
        assert!(!verify_password("pw1".to_string(), "not-a-hash".to_string()).await.unwrap());
    }
}
