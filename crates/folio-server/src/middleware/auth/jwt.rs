//! Session credential issuing and validation.
//!
//! Credentials are HS256 tokens with a fixed 30-day lifetime. Validation runs
//! with zero leeway and then checks `now < exp` itself, so a credential is
//! dead from its expiry second onward.

use super::revocation::RevocationList;
use super::types::{AuthUser, Claims};
use chrono::Duration;
use folio_common_core::{Timestamp, UserId};
use folio_common_secret::SecretString;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Lifetime of every issued credential.
pub const CREDENTIAL_LIFETIME_DAYS: i64 = 30;

/// Why a presented credential was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Bad signature, structure or subject.
    #[error("malformed credential")]
    Malformed,

    #[error("credential expired")]
    Expired,

    #[error("credential revoked")]
    Revoked,
}

/// A freshly signed credential.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedCredential {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Signs session credentials.
#[derive(Clone)]
pub struct CredentialIssuer {
    key: EncodingKey,
}

impl CredentialIssuer {
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.expose().as_bytes()),
        }
    }

    /// Issue a credential for `user_id` valid from now.
    pub fn issue(&self, user_id: UserId) -> Result<IssuedCredential, jsonwebtoken::errors::Error> {
        self.issue_at(user_id, Timestamp::now())
    }

    /// Issue a credential as if signed at `issued_at`.
    pub fn issue_at(
        &self,
        user_id: UserId,
        issued_at: Timestamp,
    ) -> Result<IssuedCredential, jsonwebtoken::errors::Error> {
        let lifetime = Duration::days(CREDENTIAL_LIFETIME_DAYS);
        let claims = Claims::new(user_id, issued_at.unix(), lifetime.num_seconds());
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.key)?;

        Ok(IssuedCredential {
            token,
            expires_at: issued_at.plus(lifetime),
        })
    }
}

impl std::fmt::Debug for CredentialIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialIssuer").finish_non_exhaustive()
    }
}

/// Verifies session credentials.
#[derive(Clone)]
pub struct CredentialValidator {
    key: DecodingKey,
    validation: Validation,
    revocations: Option<Arc<RevocationList>>,
}

impl CredentialValidator {
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(secret.expose().as_bytes()),
            validation,
            revocations: None,
        }
    }

    /// Reject credentials recorded in `list`.
    pub fn with_revocation(mut self, list: Arc<RevocationList>) -> Self {
        self.revocations = Some(list);
        self
    }

    pub fn revocation_enabled(&self) -> bool {
        self.revocations.is_some()
    }

    /// Check signature, expiry and the deny-list.
    pub fn validate(&self, token: &str) -> Result<Claims, CredentialError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => CredentialError::Expired,
                _ => CredentialError::Malformed,
            })?
            .claims;

        if claims.user_id().is_none() {
            return Err(CredentialError::Malformed);
        }
        if claims.is_expired_at(Timestamp::now().unix()) {
            return Err(CredentialError::Expired);
        }
        if let Some(list) = &self.revocations {
            if list.is_revoked(&claims.jti) {
                return Err(CredentialError::Revoked);
            }
        }

        Ok(claims)
    }

    /// Record the caller's credential as logged out. Returns whether the
    /// deny-list is active.
    pub fn revoke(&self, user: &AuthUser) -> bool {
        match &self.revocations {
            Some(list) => {
                list.revoke(&user.jti, user.expires_at.unix());
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for CredentialValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialValidator")
            .field("revocation", &self.revocation_enabled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("test_secret_key_that_is_32_chars!")
    }

    #[test]
    fn test_issue_validate_roundtrip() {
        let user = UserId::new();
        let issued = CredentialIssuer::new(&secret()).issue(user).unwrap();
        let claims = CredentialValidator::new(&secret())
            .validate(&issued.token)
            .unwrap();

        assert_eq!(claims.user_id(), Some(user));
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
        assert_eq!(issued.expires_at.unix(), claims.exp);
    }

    #[test]
    fn test_expired_is_never_malformed() {
        let issued_at = Timestamp::now().plus(Duration::days(-31));
        let issued = CredentialIssuer::new(&secret())
            .issue_at(UserId::new(), issued_at)
            .unwrap();

        assert_eq!(
            CredentialValidator::new(&secret()).validate(&issued.token),
            Err(CredentialError::Expired)
        );
    }

    #[test]
    fn test_wrong_secret_is_malformed() {
        let issued = CredentialIssuer::new(&secret()).issue(UserId::new()).unwrap();
        let other = SecretString::from("another_secret_key_of_32_chars!!!");

        assert_eq!(
            CredentialValidator::new(&other).validate(&issued.token),
            Err(CredentialError::Malformed)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let validator = CredentialValidator::new(&secret());
        assert_eq!(validator.validate("not.a.jwt"), Err(CredentialError::Malformed));
        assert_eq!(validator.validate(""), Err(CredentialError::Malformed));
    }

    #[test]
    fn test_non_uuid_subject_is_malformed() {
        let mut claims = Claims::new(UserId::new(), Timestamp::now().unix(), 3600);
        claims.sub = "42".into();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret().expose().as_bytes()),
        )
        .unwrap();

        assert_eq!(
            CredentialValidator::new(&secret()).validate(&token),
            Err(CredentialError::Malformed)
        );
    }

    #[test]
    fn test_revoked_after_logout() {
        let list = Arc::new(RevocationList::new());
        let validator = CredentialValidator::new(&secret()).with_revocation(list);
        let issued = CredentialIssuer::new(&secret()).issue(UserId::new()).unwrap();

        let claims = validator.validate(&issued.token).unwrap();
        let user = AuthUser::from_claims(&claims).unwrap();
        assert!(validator.revoke(&user));

        assert_eq!(validator.validate(&issued.token), Err(CredentialError::Revoked));
    }

    #[test]
    fn test_revoke_without_list_is_noop() {
        let validator = CredentialValidator::new(&secret());
        let issued = CredentialIssuer::new(&secret()).issue(UserId::new()).unwrap();
        let claims = validator.validate(&issued.token).unwrap();

        assert!(!validator.revoke(&AuthUser::from_claims(&claims).unwrap()));
        assert!(validator.validate(&issued.token).is_ok());
    }
}
