use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::DomainError;
use wayfare_shared::models::{UserRecord, UserRole};

/// Claims carried by an access token. `sub` is the username.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: UserRole,
    pub user_id: Uuid,
    pub exp: usize,
}

pub fn issue_access_token(
    user: &UserRecord,
    secret: &str,
    token_minutes: i64,
) -> Result<String, DomainError> {
    let claims = Claims {
        sub: user.username.clone(),
        role: user.role,
        user_id: user.id,
        exp: (Utc::now() + Duration::minutes(token_minutes)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| DomainError::internal(format!("token encoding failed: {e}")))
}

/// Validates signature and expiry. Any failure collapses into
/// `Unauthorized` so callers cannot distinguish forged from expired tokens.
pub fn decode_access_token(token: &str, secret: &str) -> Result<Claims, DomainError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| DomainError::unauthorized("Invalid or expired token"))
}

/// Strict `Authorization` header parse: exactly two whitespace-separated
/// parts, the first being `Bearer` case-sensitively, the token non-empty
/// and free of embedded whitespace. Anything looser is rejected outright
/// rather than guessed at.
pub fn extract_bearer_token(header: &str) -> Result<&str, DomainError> {
    let parts: Vec<&str> = header.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(DomainError::unauthorized(
            "Invalid authorization format. Use 'Bearer <token>'",
        ));
    }
    if parts[0] != "Bearer" {
        return Err(DomainError::unauthorized(
            "Invalid authorization format. Use 'Bearer <token>' (case sensitive)",
        ));
    }

    Ok(parts[1])
}

/// Role policy applied at the boundary of every gated operation.
pub fn require_role(user: &UserRecord, role: UserRole) -> Result<(), DomainError> {
    if user.role == role {
        Ok(())
    } else {
        Err(DomainError::forbidden("Admin privileges required"))
    }
}

/// Salted SHA-256 digest of the password. The digest is what the store
/// persists; the plaintext never leaves the request scope.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

pub fn verify_password(password: &str, salt: &str, digest: &str) -> bool {
    hash_password(password, salt) == digest
}

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let mut halves = email.split('@');
    let local = halves.next().unwrap_or_default();
    let domain = halves.next().unwrap_or_default();
    let valid = halves.next().is_none()
        && !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(DomainError::invalid("Invalid email format"))
    }
}

pub fn validate_username(username: &str) -> Result<(), DomainError> {
    if username.len() < 3 || username.len() > 50 {
        return Err(DomainError::invalid("Username must be between 3 and 50 characters"));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DomainError::invalid(
            "Username can only contain letters, numbers and underscores",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.len() < 6 || password.len() > 100 {
        return Err(DomainError::invalid("Password must be between 6 and 100 characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user(role: UserRole) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            username: "john_doe".to_string(),
            role,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let user = sample_user(UserRole::User);
        let token = issue_access_token(&user, "test-secret", 120).unwrap();
        let claims = decode_access_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, "john_doe");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.user_id, user.id);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let user = sample_user(UserRole::User);
        let token = issue_access_token(&user, "test-secret", 120).unwrap();
        assert!(decode_access_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let user = sample_user(UserRole::User);
        // Negative validity puts exp well past the default leeway.
        let token = issue_access_token(&user, "test-secret", -120).unwrap();
        assert!(decode_access_token(&token, "test-secret").is_err());
    }

    #[test]
    fn test_bearer_happy_path() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_lowercase_scheme_rejected() {
        assert!(extract_bearer_token("bearer abc.def.ghi").is_err());
    }

    #[test]
    fn test_missing_token_rejected() {
        assert!(extract_bearer_token("Bearer").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
    }

    #[test]
    fn test_extra_parts_rejected() {
        assert!(extract_bearer_token("Bearer abc def").is_err());
        assert!(extract_bearer_token("Basic abc").is_err());
    }

    #[test]
    fn test_require_role() {
        let admin = sample_user(UserRole::Admin);
        let user = sample_user(UserRole::User);
        assert!(require_role(&admin, UserRole::Admin).is_ok());
        assert!(matches!(
            require_role(&user, UserRole::Admin),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn test_password_digest_round_trip() {
        let digest = hash_password("securepassword123", "pepper");
        assert_eq!(digest.len(), 64);
        assert!(verify_password("securepassword123", "pepper", &digest));
        assert!(!verify_password("securepassword124", "pepper", &digest));
        assert!(!verify_password("securepassword123", "other", &digest));
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user@example").is_err());
        assert!(validate_email("userexample.com").is_err());
        assert!(validate_email("us er@example.com").is_err());
        assert!(validate_email("user@@example.com").is_err());
    }

    #[test]
    fn test_username_validation() {
        assert!(validate_username("john_doe").is_ok());
        assert!(validate_username("jd").is_err());
        assert!(validate_username("john doe").is_err());
    }
}
