//! JWT token service
//!
//! Issues and validates HS256 access tokens. A token only carries the user id
//! and a few display fields; role and permissions are reloaded from the
//! database on every request (see [`super::require_auth`]).

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::models::UserSummary;
use thiserror::Error;

use crate::config::Config;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret
    pub secret: String,
    /// Token lifetime (hours)
    pub expiration_hours: i64,
    /// Token issuer
    pub issuer: String,
}

impl JwtConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration_hours: config.jwt_expiry_hours,
            issuer: "seat-server".to_string(),
        }
    }
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,
    pub username: String,
    /// Role at issue time; informational only
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

impl Claims {
    /// Numeric user id from `sub`
    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::InvalidToken(format!("Malformed subject: {}", self.sub)))
    }
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT token service
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("expiration_hours", &self.config.expiration_hours)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a new token for `user`
    pub fn generate_token(&self, user: &UserSummary) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(self.config.expiration_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Authenticated caller, loaded from the users table on every request
///
/// Inserted into request extensions by [`super::require_auth`]; handlers take
/// it as an extractor.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl From<UserSummary> for CurrentUser {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            permissions: user.permissions,
        }
    }
}

impl CurrentUser {
    /// Admins (`role == "admin"`) hold every capability
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// Admin, `all`, or the exact capability
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_admin() {
            return true;
        }
        self.permissions
            .iter()
            .any(|p| p == super::permissions::ALL || p == permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig::from_config(&Config::default()))
    }

    fn summary(role: &str) -> UserSummary {
        UserSummary {
            id: 42,
            username: "desk".to_string(),
            role: role.to_string(),
            permissions: vec!["students".to_string()],
        }
    }

    fn user(role: &str, permissions: &[&str]) -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "u".to_string(),
            role: role.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let service = service();
        let token = service.generate_token(&summary("staff")).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.username, "desk");
        assert_eq!(claims.role, "staff");
        assert_eq!(claims.iss, "seat-server");
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = service().generate_token(&summary("admin")).unwrap();
        let other = JwtService::with_config(JwtConfig {
            secret: "another-secret".to_string(),
            expiration_hours: 24,
            issuer: "seat-server".to_string(),
        });

        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let service = service();
        let now = Utc::now();
        let claims = Claims {
            sub: "1".to_string(),
            username: "old".to_string(),
            role: "staff".to_string(),
            exp: (now - Duration::hours(2)).timestamp(),
            iat: (now - Duration::hours(3)).timestamp(),
            iss: "seat-server".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(service.config.secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            service().validate_token("not-a-jwt"),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }

    #[test]
    fn test_admin_has_all_permissions() {
        let admin = user("admin", &[]);
        assert!(admin.is_admin());
        assert!(admin.has_permission("collections"));
    }

    #[test]
    fn test_staff_permissions() {
        let staff = user("staff", &["students"]);
        assert!(!staff.is_admin());
        assert!(staff.has_permission("students"));
        assert!(!staff.has_permission("branches"));

        let all = user("staff", &["all"]);
        assert!(all.has_permission("branches"));
    }
}
