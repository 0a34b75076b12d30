use serde::{Deserialize, Serialize};

use crate::models::user::SessionUser;

/// Claims carried inside the signed session token.
///
/// The token is stateless: everything needed to serve a request, including
/// the upstream access token, lives here. Anyone holding the signing key can
/// mint one; nobody else can alter one without breaking the signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The ID of the user this session belongs to.
    pub sub: String,
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
    #[serde(default)]
    pub is_read_only: bool,
    /// The upstream API bearer token. Never leaves the server side.
    pub access_token: String,
    /// The timestamp when the session was created.
    pub iat: i64,
    /// The timestamp when the session expires.
    pub exp: i64,
}

impl SessionClaims {
    /// Projects the claims into the profile surfaced to the UI.
    pub fn user(&self) -> SessionUser {
        SessionUser {
            user_id: self.sub.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            designation: self.designation.clone(),
            profile_image: self.profile_image.clone(),
            is_read_only: self.is_read_only,
        }
    }
}

/// Partial profile update applied to an existing session.
///
/// Only the fields present overwrite the stored claims; everything else,
/// including the expiry, is carried over unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    /// The user's full name.
    pub name: Option<String>,
    /// The user's email address.
    pub email: Option<String>,
    /// The user's phone number.
    pub phone: Option<String>,
    /// The user's job title.
    pub designation: Option<String>,
    /// URL of the user's profile picture.
    pub profile_image: Option<String>,
    /// Whether the user has a read-only account.
    pub is_read_only: Option<bool>,
}
