//! JSON shapes exchanged with the hosted auth service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wishlist_types::User;

#[derive(Debug, Deserialize)]
pub struct RemoteUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl From<RemoteUser> for User {
    fn from(remote: RemoteUser) -> Self {
        User {
            id: remote.id,
            email: remote.email.filter(|e| !e.is_empty()),
            full_name: remote.user_metadata.and_then(|m| m.full_name),
        }
    }
}

/// Admin endpoints wrap the account in `{"user": …}` on some service versions.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AdminUserResponse {
    Wrapped { user: RemoteUser },
    Bare(RemoteUser),
}

impl From<AdminUserResponse> for User {
    fn from(response: AdminUserResponse) -> Self {
        match response {
            AdminUserResponse::Wrapped { user } | AdminUserResponse::Bare(user) => user.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: RemoteUser,
}

#[derive(Debug, Serialize)]
pub struct SignUpBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: UserMetadata,
}

#[derive(Debug, Serialize)]
pub struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct UpdateUserBody {
    pub data: UserMetadata,
}

/// Human-readable message from an error body. The auth and REST services use
/// different field names for it.
pub fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}
