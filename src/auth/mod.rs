pub mod password;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub use password::{hash_password, verify_password};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Failed to issue token: {0}")]
    TokenGeneration(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Password hash error: {0}")]
    PasswordHash(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    User,
    Device,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::User => "user",
            Role::Device => "device",
        }
    }

    /// May create, change and delete components and menus
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "super_admin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "device" => Ok(Role::Device),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a token was issued to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    User,
    Device,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub kind: SubjectKind,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
}

/// Identity a token is generated for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: Uuid,
    pub kind: SubjectKind,
    pub role: Role,
    pub organization_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates HS256 session tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: Duration,
}

impl TokenService {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::hours(expiry_hours as i64),
        })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(&config.jwt_secret, config.jwt_expiry_hours)
    }

    pub fn generate_token(&self, subject: &Subject) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let expires_at = now + self.expiry;
        let claims = Claims {
            sub: subject.id,
            kind: subject.kind,
            role: subject.role,
            organization_id: subject.organization_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or(expires_at);
        Ok(IssuedToken { token, expires_at })
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }

    pub fn extract_user_id(&self, token: &str) -> Result<Uuid, AuthError> {
        self.validate_token(token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Subject {
        Subject {
            id: Uuid::new_v4(),
            kind: SubjectKind::User,
            role: Role::Admin,
            organization_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn issued_token_validates() {
        let tokens = TokenService::new("test-secret", 1).unwrap();
        let subject = admin();
        let issued = tokens.generate_token(&subject).unwrap();

        let claims = tokens.validate_token(&issued.token).unwrap();
        assert_eq!(claims.sub, subject.id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.kind, SubjectKind::User);
        assert_eq!(claims.organization_id, subject.organization_id);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert_eq!(tokens.extract_user_id(&issued.token).unwrap(), subject.id);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issued = TokenService::new("one", 1).unwrap().generate_token(&admin()).unwrap();
        let err = TokenService::new("two", 1).unwrap().validate_token(&issued.token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            kind: SubjectKind::Device,
            role: Role::Device,
            organization_id: None,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let err = TokenService::new("secret", 1).unwrap().validate_token(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = TokenService::new("secret", 1).unwrap();
        assert!(tokens.validate_token("not.a.token").is_err());
        assert!(tokens.extract_user_id("").is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(TokenService::new("", 1), Err(AuthError::MissingSecret)));
    }

    #[test]
    fn roles_parse_and_gate() {
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!(Role::SuperAdmin.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
        assert!(!Role::Device.is_admin());
        assert!("root".parse::<Role>().is_err());
    }
}
