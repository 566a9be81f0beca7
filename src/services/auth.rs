//! Scanner authentication
//!
//! Admins exchange their session for a short-lived bearer token that the
//! attendance scanner presents on every scan call. Tokens are HS256 JWTs
//! carrying the admin's identity and role; verification re-checks the role so
//! a token minted for a since-demoted admin cannot scan after expiry rotation.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::user::{SessionUser, User, UserRole};
use crate::utils::errors::{GatherlyError, Result};

/// Claims embedded in a scanner bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerClaims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
}

/// Reject callers without an admin session
pub fn require_admin(session: Option<&SessionUser>) -> Result<&SessionUser> {
    let session = session.ok_or(GatherlyError::NotLoggedIn)?;
    if !session.is_admin() {
        return Err(GatherlyError::NotAuthorized);
    }
    Ok(session)
}

#[derive(Clone)]
pub struct ScannerAuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl ScannerAuthService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validity: Duration::days(config.scanner_token_days),
        }
    }

    /// Issue a scanner token for an admin user
    pub fn issue(&self, user: &User) -> Result<String> {
        if user.role != UserRole::Admin {
            return Err(GatherlyError::NotAuthorized);
        }

        let claims = ScannerClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: (Utc::now() + self.validity).timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify a scanner token, rejecting expired tokens and non-admin claims
    pub fn verify(&self, token: &str) -> Result<ScannerClaims> {
        let data = decode::<ScannerClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        if data.claims.role != UserRole::Admin {
            return Err(GatherlyError::NotAuthorized);
        }

        Ok(data.claims)
    }

    /// Token validity in whole days, surfaced to the issuing endpoint
    pub fn validity_days(&self) -> i64 {
        self.validity.num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserStatus;
    use assert_matches::assert_matches;

    fn service() -> ScannerAuthService {
        ScannerAuthService::new(&AuthConfig {
            jwt_secret: "test-secret-at-least-32-bytes-long!".to_string(),
            scanner_token_days: 7,
        })
    }

    fn user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            picture: String::new(),
            role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = service();
        let admin = user(UserRole::Admin);

        let token = service.issue(&admin).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.email, admin.email);
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn test_non_admin_cannot_get_token() {
        let service = service();
        let err = service.issue(&user(UserRole::User)).unwrap_err();
        assert_matches!(err, GatherlyError::NotAuthorized);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = service();
        let claims = ScannerClaims {
            sub: Uuid::new_v4(),
            email: "ada@example.com".into(),
            role: UserRole::Admin,
            // Past the default validation leeway
            exp: (Utc::now() - Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-at-least-32-bytes-long!"),
        )
        .unwrap();

        assert_matches!(service.verify(&token), Err(GatherlyError::Token(_)));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = service();
        let token = service.issue(&user(UserRole::Admin)).unwrap();
        let tampered = format!("{}x", token);

        assert!(service.verify(&tampered).is_err());
    }

    #[test]
    fn test_require_admin() {
        assert_matches!(require_admin(None), Err(GatherlyError::NotLoggedIn));

        let member = SessionUser {
            id: Uuid::new_v4(),
            email: "m@example.com".into(),
            role: UserRole::User,
        };
        assert_matches!(
            require_admin(Some(&member)),
            Err(GatherlyError::NotAuthorized)
        );

        let admin = SessionUser {
            id: Uuid::new_v4(),
            email: "a@example.com".into(),
            role: UserRole::Admin,
        };
        assert!(require_admin(Some(&admin)).is_ok());
    }
}
