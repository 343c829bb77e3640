use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Locked,
    Unlocked,
    #[serde(other)]
    Unknown,
}

/// Output of `bw status`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VaultStatus {
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub last_sync: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(rename = "status", default)]
    pub auth_state: AuthState,
}

impl VaultStatus {
    pub fn email(&self) -> &str {
        self.user_email.as_deref().unwrap_or_default()
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(from = "u8")]
pub enum ItemKind {
    #[default]
    Login,
    SecureNote,
    Card,
    Identity,
    Other(u8),
}

impl From<u8> for ItemKind {
    fn from(raw: u8) -> Self {
        match raw {
            1 => Self::Login,
            2 => Self::SecureNote,
            3 => Self::Card,
            4 => Self::Identity,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Login => "Login",
            Self::SecureNote => "SecureNote",
            Self::Card => "Card",
            Self::Identity => "Identity",
            Self::Other(_) => "Unknown",
        };
        f.write_str(label)
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LoginUri {
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemLogin {
    #[serde(default)]
    pub uris: Option<Vec<LoginUri>>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_revision_date: Option<DateTime<Utc>>,
}

/// One record from `bw list items`. Identity is `id`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub object: String,
    pub id: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub reprompt: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub login: Option<ItemLogin>,
    #[serde(default)]
    pub revision_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_date: Option<DateTime<Utc>>,
}

impl Item {
    pub fn username(&self) -> &str {
        self.login
            .as_ref()
            .and_then(|l| l.username.as_deref())
            .unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.login
            .as_ref()
            .and_then(|l| l.password.as_deref())
            .unwrap_or_default()
    }

    pub fn notes(&self) -> &str {
        self.notes.as_deref().unwrap_or_default()
    }

    pub fn organization_id(&self) -> &str {
        self.organization_id.as_deref().unwrap_or_default()
    }

    pub fn folder_id(&self) -> &str {
        self.folder_id.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_item_with_nulls() {
        let raw = r#"{
            "object": "item",
            "id": "abc",
            "organizationId": null,
            "folderId": null,
            "type": 2,
            "reprompt": 0,
            "name": "wifi",
            "notes": null,
            "favorite": false,
            "revisionDate": "2023-04-01T10:00:00.000Z",
            "creationDate": "2023-04-01T10:00:00.000Z",
            "deletedDate": null
        }"#;
        let item: Item = serde_json::from_str(raw).unwrap();
        assert_eq!(item.kind, ItemKind::SecureNote);
        assert_eq!(item.username(), "");
        assert_eq!(item.password(), "");
        assert!(item.deleted_date.is_none());
        assert!(item.revision_date.is_some());
    }

    #[test]
    fn unknown_item_type_is_not_fatal() {
        let item: Item = serde_json::from_str(r#"{"id":"x","type":5}"#).unwrap();
        assert_eq!(item.kind, ItemKind::Other(5));
        assert_eq!(item.kind.to_string(), "Unknown");
    }

    #[test]
    fn decodes_status() {
        let raw = r#"{"serverUrl":null,"lastSync":"2023-04-01T10:00:00.000Z",
            "userEmail":"me@example.com","userId":"u1","status":"locked"}"#;
        let status: VaultStatus = serde_json::from_str(raw).unwrap();
        assert_eq!(status.auth_state, AuthState::Locked);
        assert_eq!(status.email(), "me@example.com");
    }

    #[test]
    fn unexpected_status_maps_to_unknown() {
        let status: VaultStatus = serde_json::from_str(r#"{"status":"migrating"}"#).unwrap();
        assert_eq!(status.auth_state, AuthState::Unknown);
    }
}
