//! Token issuance facade: signed access tokens and opaque secrets.
//!
//! Opaque tokens (refresh and password reset) are 256 random bits encoded as
//! URL-safe base64. Only their SHA-256 hex digest is ever stored or compared.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use warden_core::config::AuthConfig;
use warden_core::result::AppResult;

use crate::jwt::{AccessClaims, JwtDecoder, JwtEncoder, TokenError};

/// Number of random bytes in an opaque token.
const OPAQUE_TOKEN_BYTES: usize = 32;

/// A freshly signed access token.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedAccessToken {
    /// The encoded JWT.
    pub token: String,
    /// Its unique ID.
    pub jti: String,
    /// When it stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Mints and parses access tokens and produces opaque refresh tokens.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    issuer: String,
    access_ttl: Duration,
}

impl TokenGenerator {
    /// Build a generator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            issuer: config.jwt_issuer.clone(),
            access_ttl: Duration::minutes(config.access_token_ttl_minutes as i64),
        }
    }

    /// Sign an access token carrying the user's roles and effective permissions.
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        email: &str,
        roles: &[String],
        permissions: &[String],
    ) -> AppResult<IssuedAccessToken> {
        let now = Utc::now();
        let expires_at = now + self.access_ttl;
        let claims = AccessClaims {
            sub: user_id,
            email: email.to_string(),
            roles: roles.to_vec(),
            permissions: permissions.to_vec(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = self.encoder.encode(&claims)?;
        Ok(IssuedAccessToken {
            token,
            jti: claims.jti,
            expires_at,
        })
    }

    /// A new random refresh token. Never derived from user data.
    pub fn generate_refresh_token(&self) -> String {
        generate_opaque_token()
    }

    /// Deterministic digest used to store and look up refresh tokens.
    pub fn hash_refresh_token(&self, raw: &str) -> String {
        hash_opaque_token(raw)
    }

    /// Verify signature, issuer, and expiry, and return the claims.
    pub fn parse_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.decoder.decode(token)
    }
}

/// Generate a random opaque token.
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex SHA-256 of an opaque token.
pub fn hash_opaque_token(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-with-enough-length".to_string(),
            ..AuthConfig::default()
        }
    }

    fn roles() -> Vec<String> {
        vec!["user".to_string()]
    }

    #[test]
    fn test_access_token_carries_claims() {
        let generator = TokenGenerator::new(&config());
        let user_id = Uuid::new_v4();
        let perms = vec!["users:read".to_string()];

        let issued = generator
            .generate_access_token(user_id, "a@example.com", &roles(), &perms)
            .unwrap();
        let claims = generator.parse_access_token(&issued.token).unwrap();

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.roles, roles());
        assert_eq!(claims.permissions, perms);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert!(!claims.is_system_admin());
    }

    #[test]
    fn test_each_access_token_has_unique_jti() {
        let generator = TokenGenerator::new(&config());
        let id = Uuid::new_v4();
        let a = generator.generate_access_token(id, "a@example.com", &[], &[]).unwrap();
        let b = generator.generate_access_token(id, "a@example.com", &[], &[]).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token_is_distinguishable() {
        let config = config();
        let generator = TokenGenerator::new(&config);
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            roles: vec![],
            permissions: vec![],
            jti: Uuid::new_v4().to_string(),
            iat: now - 600,
            exp: now - 300,
            iss: config.jwt_issuer.clone(),
        };
        let token = JwtEncoder::new(&config).encode(&claims).unwrap();

        assert_eq!(
            generator.parse_access_token(&token),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let generator = TokenGenerator::new(&config());
        let other = TokenGenerator::new(&AuthConfig {
            jwt_secret: "a-completely-different-secret".to_string(),
            ..AuthConfig::default()
        });
        let issued = other
            .generate_access_token(Uuid::new_v4(), "a@example.com", &[], &[])
            .unwrap();

        assert_eq!(
            generator.parse_access_token(&issued.token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let generator = TokenGenerator::new(&config());
        assert_eq!(
            generator.parse_access_token("not-a-jwt"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_refresh_tokens_are_random_and_hashed_deterministically() {
        let generator = TokenGenerator::new(&config());
        let a = generator.generate_refresh_token();
        let b = generator.generate_refresh_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);

        let hash = generator.hash_refresh_token(&a);
        assert_eq!(hash, generator.hash_refresh_token(&a));
        assert_ne!(hash, generator.hash_refresh_token(&b));
        assert_eq!(hash.len(), 64);
        assert!(!hash.contains(&a));
    }
}
