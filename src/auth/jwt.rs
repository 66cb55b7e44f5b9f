use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::config::AuthConfig;
use crate::error::AppError;

use super::Claims;

/// HS256 key pair for issuing and validating session tokens.
pub struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl JwtKeys {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation: Validation::default(),
            token_ttl: Duration::hours(config.token_ttl_hours),
        }
    }

    /// Issue a token for an authenticated user.
    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            exp: (now + self.token_ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-key-for-testing".to_string(),
            token_ttl_hours: 24,
        }
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let keys = JwtKeys::new(&create_test_config());

        let token = keys.issue("alice").unwrap();
        let claims = keys.validate(&token).unwrap();

        assert_eq!(claims.username(), "alice");
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_invalid_token() {
        let keys = JwtKeys::new(&create_test_config());

        let result = keys.validate("invalid-token");
        assert!(result.is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let keys = JwtKeys::new(&create_test_config());
        let other = JwtKeys::new(&AuthConfig {
            jwt_secret: "a-different-secret".to_string(),
            token_ttl_hours: 24,
        });

        let token = other.issue("alice").unwrap();
        assert!(keys.validate(&token).is_err());
    }
}
