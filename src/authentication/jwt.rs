use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{
    error::{Error, ErrorKind},
    schema::{Id, User, UserRole},
};

use super::permissions::ActionType;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSessionData {
    pub user_id: Id,
    pub username: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

impl JwtSessionData {
    pub fn new(id: Id, username: String, role: UserRole, lifetime: Duration) -> Self {
        let now = Utc::now();
        let iat = now.timestamp();
        let exp = (now + lifetime).timestamp();

        Self {
            user_id: id,
            username,
            role,
            iat,
            exp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionData {
    pub user_id: Id,
    pub role: UserRole,
}

impl SessionData {
    pub fn authenticate(&self, action: ActionType) -> Result<(), Error> {
        if !action.authenticate(self) {
            return Err(ErrorKind::Permission.default());
        }
        Ok(())
    }
}

impl From<JwtSessionData> for SessionData {
    fn from(value: JwtSessionData) -> Self {
        SessionData {
            user_id: value.user_id,
            role: value.role,
        }
    }
}

/// Signing key and token lifetime for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    key: Hmac<Sha256>,
    lifetime: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], lifetime_hours: i64) -> Result<Self, Error> {
        let key = Hmac::new_from_slice(secret).map_err(|e| {
            log::error!("Unusable session secret: {e}");
            ErrorKind::Internal.default()
        })?;

        Ok(Self {
            key,
            lifetime: Duration::hours(lifetime_hours),
        })
    }

    pub fn issue(&self, user: &User) -> Result<String, Error> {
        let claims =
            JwtSessionData::new(user.id, user.username.to_owned(), user.role, self.lifetime);
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &JwtSessionData) -> Result<String, Error> {
        claims.sign_with_key(&self.key).map_err(|e| {
            log::error!("Failed to sign session token: {e}");
            ErrorKind::Internal.default()
        })
    }

    pub fn verify(&self, token: &str) -> Result<JwtSessionData, Error> {
        let session: JwtSessionData = token
            .verify_with_key(&self.key)
            .map_err(|_| ErrorKind::Unauthenticated.new("Invalid token"))?;

        let now = Utc::now().timestamp();
        if (session.exp - now).is_negative() {
            return Err(ErrorKind::Unauthenticated.new("Token expired"));
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"test-secret", 24).unwrap()
    }

    fn user() -> User {
        User {
            id: 7,
            email: "cook@example.com".to_owned(),
            username: "cook".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Cook".to_owned(),
            password: String::new(),
            role: UserRole::Admin,
        }
    }

    #[test]
    fn issued_tokens_verify() {
        let keys = keys();
        let token = keys.issue(&user()).unwrap();
        let session: SessionData = keys.verify(&token).unwrap().into();
        assert_eq!(session.user_id, 7);
        assert_eq!(session.role, UserRole::Admin);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let keys = keys();
        let mut claims = JwtSessionData::new(7, "cook".to_owned(), UserRole::User, Duration::hours(1));
        claims.exp = Utc::now().timestamp() - 60;
        let token = keys.sign(&claims).unwrap();

        let error = keys.verify(&token).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Unauthenticated);
    }

    #[test]
    fn foreign_signatures_are_rejected() {
        let token = SessionKeys::new(b"another-secret", 24)
            .unwrap()
            .issue(&user())
            .unwrap();
        assert!(keys().verify(&token).is_err());

        let mut tampered = keys().issue(&user()).unwrap();
        tampered.push('x');
        assert!(keys().verify(&tampered).is_err());
    }
}
