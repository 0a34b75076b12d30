use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bearer credential issued by the upstream API at login.
///
/// ⚠️ IMPORTANT: this is the only copy of the upstream credential the
/// browser ever holds, and it only travels inside the signed HttpOnly
/// session cookie. It must never appear in logs or response bodies.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    pub fn new(token: String) -> Self {
        Self(token)
    }

    /// Exposes the raw token for the outbound Authorization header.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// The signed-in user's profile as surfaced to the admin UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// The unique identifier for the user.
    pub user_id: String,
    /// The user's full name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The user's phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// The user's job title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    /// URL of the user's profile picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    /// Whether the user has a read-only account.
    pub is_read_only: bool,
}

/// A request's resolved identity: profile plus the upstream credential.
///
/// Recomputed from the session cookie on every request, never cached.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The signed-in user's profile.
    pub user: SessionUser,
    /// Bearer token for upstream calls made on this user's behalf.
    pub access_token: AccessToken,
}
