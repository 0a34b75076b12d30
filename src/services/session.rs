use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::error::{AppError, Result};
use crate::models::session::{SessionClaims, SessionPatch};
use crate::models::upstream::UpstreamUser;

/// Signs and verifies the stateless session tokens.
///
/// Built once at startup from the configured secret and injected through
/// `AppState`. There is no server-side session record: the signed claims
/// are the session, and losing the cookie is the only way to end one early.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    duration_days: i64,
}

impl SessionKeys {
    /// Creates the key pair from the shared secret.
    pub fn new(secret: &[u8], duration_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            duration_days,
        }
    }

    /// Issues a fresh session token for a user who just authenticated.
    ///
    /// # Arguments
    ///
    /// * `user` - The user record returned by the upstream login.
    /// * `access_token` - The upstream bearer credential to carry.
    ///
    /// # Returns
    ///
    /// A `Result` containing the signed token.
    pub fn issue(&self, user: &UpstreamUser, access_token: &str) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            designation: user.designation.clone(),
            profile_image: user.profile_image.clone(),
            is_read_only: user.is_read_only,
            access_token: access_token.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.duration_days)).timestamp(),
        };

        self.sign(&claims)
    }

    /// Re-signs existing claims with a profile patch applied.
    ///
    /// Only fields present in the patch overwrite the stored values. `iat`
    /// and `exp` carry over unchanged: a profile edit updates identity data,
    /// it never extends the authentication window.
    pub fn renew(&self, claims: &SessionClaims, patch: &SessionPatch) -> Result<String> {
        let mut updated = claims.clone();

        if let Some(name) = &patch.name {
            updated.name = name.clone();
        }
        if let Some(email) = &patch.email {
            updated.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            updated.phone = Some(phone.clone());
        }
        if let Some(designation) = &patch.designation {
            updated.designation = Some(designation.clone());
        }
        if let Some(profile_image) = &patch.profile_image {
            updated.profile_image = Some(profile_image.clone());
        }
        if let Some(is_read_only) = patch.is_read_only {
            updated.is_read_only = is_read_only;
        }

        self.sign(&updated)
    }

    /// Verifies a token and returns its claims.
    ///
    /// Any failure (bad signature, expired, malformed) yields `None`; the
    /// caller cannot and should not distinguish why.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }

    fn sign(&self, claims: &SessionClaims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"0123456789abcdef0123456789abcdef", 7)
    }

    fn sample_user() -> UpstreamUser {
        UpstreamUser {
            id: "u-1".to_string(),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: Some("555-0101".to_string()),
            designation: Some("Service Engineer".to_string()),
            profile_image: None,
            is_read_only: false,
        }
    }

    #[test]
    fn issue_then_verify_round_trips_the_claims() {
        let keys = keys();
        let token = keys.issue(&sample_user(), "tok-abc").unwrap();

        let claims = keys.verify(&token).expect("token should verify");
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.email, "asha@example.com");
        assert_eq!(claims.access_token, "tok-abc");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_token_signed_with_other_key() {
        let token = keys().issue(&sample_user(), "tok-abc").unwrap();
        let other = SessionKeys::new(b"ffffffffffffffffffffffffffffffff", 7);

        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = keys();
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: "u-1".to_string(),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
            designation: None,
            profile_image: None,
            is_read_only: false,
            access_token: "tok-abc".to_string(),
            iat: now - 10_000,
            // well past the default validation leeway
            exp: now - 3_600,
        };
        let token = keys.sign(&claims).unwrap();

        assert!(keys.verify(&token).is_none());
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(keys().verify("not-a-token").is_none());
    }

    #[test]
    fn renew_merges_only_present_fields_and_keeps_expiry() {
        let keys = keys();
        let token = keys.issue(&sample_user(), "tok-abc").unwrap();
        let original = keys.verify(&token).unwrap();

        let patch = SessionPatch {
            name: Some("Asha R.".to_string()),
            ..Default::default()
        };
        let renewed = keys.renew(&original, &patch).unwrap();
        let updated = keys.verify(&renewed).unwrap();

        assert_eq!(updated.name, "Asha R.");
        assert_eq!(updated.email, original.email);
        assert_eq!(updated.phone, original.phone);
        assert_eq!(updated.is_read_only, original.is_read_only);
        assert_eq!(updated.access_token, original.access_token);
        assert_eq!(updated.exp, original.exp);
        assert_eq!(updated.iat, original.iat);
    }
}
