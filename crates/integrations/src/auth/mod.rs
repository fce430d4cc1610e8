//! Token verification for the `user token` / `staff token` auth column of
//! spec §6's endpoint table: a symmetric HS256 verify against
//! `JWT_SECRET` — this workspace is not itself an identity provider (spec
//! §1 scopes "full user registration/login flows" out), it only needs to
//! verify tokens someone else issued, and `JWT_SECRET` /
//! `JWT_REFRESH_SECRET` (spec §6's configuration table) are exactly the
//! shared secrets that implies.

use cineslot_types::AppError;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: Option<String>,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn is_staff(&self) -> bool {
        self.role == "staff" || self.role == "admin"
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Verifies bearer tokens against one of two HS256 secrets — the access
/// secret for ordinary requests, the refresh secret for the refresh-token
/// exchange (kept as a distinct verifier so an expired-access-token
/// refresh flow can't be forged with a stolen refresh token signed under
/// a different key).
#[derive(Clone)]
pub struct AuthVerifier {
    access_secret: String,
    refresh_secret: String,
}

impl AuthVerifier {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
        }
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AppError> {
        Self::decode(token, &self.access_secret)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        Self::decode(token, &self.refresh_secret)
    }

    fn decode(token: &str, secret: &str) -> Result<Claims, AppError> {
        let key = DecodingKey::from_secret(secret.as_bytes());
        let validation = Validation::new(jsonwebtoken::Algorithm::HS256);

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, role: &str, exp_offset_secs: i64) -> String {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: Some("user@example.com".to_string()),
            role: role.to_string(),
            iat: 0,
            exp: (chrono::Utc::now().timestamp() + exp_offset_secs) as usize,
        };
        encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_verifies() {
        let verifier = AuthVerifier::new("access-secret", "refresh-secret");
        let t = token("access-secret", "user", 3600);
        let claims = verifier.verify_access_token(&t).unwrap();
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = AuthVerifier::new("access-secret", "refresh-secret");
        let t = token("wrong-secret", "user", 3600);
        assert!(verifier.verify_access_token(&t).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = AuthVerifier::new("access-secret", "refresh-secret");
        let t = token("access-secret", "user", -3600);
        assert!(verifier.verify_access_token(&t).is_err());
    }

    #[test]
    fn access_token_rejected_by_refresh_verifier() {
        let verifier = AuthVerifier::new("access-secret", "refresh-secret");
        let t = token("access-secret", "user", 3600);
        assert!(verifier.verify_refresh_token(&t).is_err());
    }

    #[test]
    fn staff_and_admin_roles_pass_is_staff() {
        let staff = Claims {
            sub: Uuid::new_v4(),
            email: None,
            role: "staff".to_string(),
            iat: 0,
            exp: 0,
        };
        let admin = Claims {
            sub: Uuid::new_v4(),
            email: None,
            role: "admin".to_string(),
            iat: 0,
            exp: 0,
        };
        let user = Claims {
            sub: Uuid::new_v4(),
            email: None,
            role: "user".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(staff.is_staff());
        assert!(admin.is_staff());
        assert!(!user.is_staff());
        assert!(admin.is_admin());
        assert!(!staff.is_admin());
    }
}
