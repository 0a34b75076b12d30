use serde::{Deserialize, Serialize};

use crate::models::user::SessionUser;

/// Successful login payload from the upstream API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The authenticated user's record.
    pub user: UpstreamUser,
    /// Opaque bearer credential for subsequent upstream calls.
    pub access_token: String,
}

/// A staff user as the upstream API represents one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamUser {
    /// The unique identifier for the user.
    #[serde(alias = "_id")]
    pub id: String,
    /// The user's full name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The user's phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// The user's job title.
    #[serde(default)]
    pub designation: Option<String>,
    /// URL of the user's profile picture.
    #[serde(default)]
    pub profile_image: Option<String>,
    /// Whether the user has a read-only account.
    #[serde(default)]
    pub is_read_only: bool,
}

impl From<&UpstreamUser> for SessionUser {
    fn from(user: &UpstreamUser) -> Self {
        SessionUser {
            user_id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            designation: user.designation.clone(),
            profile_image: user.profile_image.clone(),
            is_read_only: user.is_read_only,
        }
    }
}

/// A client (customer site) record, as the management pages render it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    /// The unique identifier for the client.
    #[serde(rename = "_id")]
    pub id: String,
    /// The client's display name.
    pub name: String,
    /// Contact person at the client site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    /// Contact email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Site address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Machines installed at the site, passed through as-is.
    #[serde(default)]
    pub machines: Vec<sonic_rs::Value>,
}

/// A machine category as listed in the add-machine form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineCategory {
    /// The unique identifier for the category.
    #[serde(rename = "_id")]
    pub id: String,
    /// The category's display name.
    pub name: String,
}
