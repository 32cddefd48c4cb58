//! Account records.

use folio_common_core::{Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// A stored profile.
///
/// Carries no password-like field; secrets stay behind the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Profile row written at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIdentity {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
}

const AVATAR_BASE: &str = "https://ui-avatars.com/api/";

impl NewIdentity {
    /// Profile for a freshly signed-up account, with a generated avatar.
    pub fn registered(id: UserId, email: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            email: email.into(),
            avatar_url: Some(generated_avatar(&name)),
            name,
            role: Role::User,
        }
    }
}

fn generated_avatar(name: &str) -> String {
    match url::Url::parse_with_params(AVATAR_BASE, &[("name", name), ("background", "random")]) {
        Ok(url) => url.to_string(),
        Err(_) => AVATAR_BASE.to_string(),
    }
}
