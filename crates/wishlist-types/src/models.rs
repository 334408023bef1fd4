use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use uuid::Uuid;

/// An account as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    /// Free-form display name kept in the account metadata.
    pub full_name: Option<String>,
}

impl User {
    /// Name shown to other people: the metadata name, else the mailbox part of the
    /// email address, else a generic greeting.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.full_name.as_deref().map(str::trim) {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        if let Some(local) = self
            .email
            .as_deref()
            .and_then(|email| email.split('@').next())
        {
            if !local.is_empty() {
                return local.to_string();
            }
        }
        "Friend".to_string()
    }
}

/// How much the owner wants a gift, 1 (would be nice) to 5 (dream gift).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(rank: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&rank).then_some(Self(rank))
    }

    pub fn rank(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Would be nice",
            2 => "Like to have",
            3 => "Want",
            4 => "Really want",
            _ => "Dream gift!",
        }
    }

    /// Every rank in ascending order, for building select boxes.
    pub fn all() -> impl Iterator<Item = Priority> {
        (Self::MIN..=Self::MAX).map(Priority)
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(rank: u8) -> Result<Self, Self::Error> {
        Self::new(rank).ok_or_else(|| format!("priority {rank} is outside 1..=5"))
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A gift on somebody's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wish {
    pub id: Uuid,
    /// Owner of the list this wish belongs to.
    pub user_id: Uuid,
    pub name: String,
    pub link: Option<String>,
    pub notes: Option<String>,
    /// Out-of-range ranks from the hosted table read as unset.
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Option<Priority>,
    /// Display name given by whoever reserved the gift.
    #[serde(default)]
    pub reserved_by: Option<String>,
    #[serde(default)]
    pub reserved_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

fn lenient_priority<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Priority>, D::Error> {
    let Some(rank) = Option::<i64>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let priority = u8::try_from(rank).ok().and_then(Priority::new);
    if priority.is_none() {
        warn!("Ignoring out-of-range wish priority {}", rank);
    }
    Ok(priority)
}

impl Wish {
    pub fn is_reserved(&self) -> bool {
        self.reserved_by.is_some() || self.reserved_by_id.is_some()
    }

    pub fn is_reserved_by(&self, user_id: Uuid) -> bool {
        self.reserved_by_id == Some(user_id)
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: Option<&str>, full_name: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.map(str::to_string),
            full_name: full_name.map(str::to_string),
        }
    }

    #[test]
    fn display_name_prefers_full_name() {
        let u = user(Some("santa@northpole.org"), Some("Kris Kringle"));
        assert_eq!(u.display_name(), "Kris Kringle");
    }

    #[test]
    fn display_name_falls_back_to_email_then_friend() {
        assert_eq!(user(Some("elf@northpole.org"), None).display_name(), "elf");
        assert_eq!(user(Some("elf@northpole.org"), Some("  ")).display_name(), "elf");
        assert_eq!(user(Some("@northpole.org"), None).display_name(), "Friend");
        assert_eq!(user(None, None).display_name(), "Friend");
    }

    #[test]
    fn priority_range_is_enforced() {
        assert!(Priority::new(0).is_none());
        assert!(Priority::new(6).is_none());
        assert_eq!(Priority::new(5).map(Priority::label), Some("Dream gift!"));
        assert_eq!(Priority::all().count(), 5);
    }

    #[test]
    fn priority_deserializes_from_integer() {
        let p: Priority = serde_json::from_str("3").unwrap();
        assert_eq!(p.label(), "Want");
        assert!(serde_json::from_str::<Priority>("9").is_err());
        assert_eq!(serde_json::to_string(&p).unwrap(), "3");
    }

    #[test]
    fn wish_parses_row_without_reservation_columns() {
        let json = r#"{
            "id": "6f1c2f43-4b4f-4d47-9d5c-0d4d3e3a6b11",
            "user_id": "0a8a3c1e-2b9a-4f35-8b71-3e2e1f0f9c22",
            "name": "Sled",
            "link": null,
            "notes": "red",
            "priority": 4,
            "created_at": "2025-12-01T10:00:00.123456+00:00"
        }"#;
        let wish: Wish = serde_json::from_str(json).unwrap();
        assert_eq!(wish.priority.map(Priority::rank), Some(4));
        assert!(!wish.is_reserved());
    }

    #[test]
    fn out_of_range_priority_reads_as_unset() {
        let json = r#"[
            {
                "id": "6f1c2f43-4b4f-4d47-9d5c-0d4d3e3a6b11",
                "user_id": "0a8a3c1e-2b9a-4f35-8b71-3e2e1f0f9c22",
                "name": "Sled",
                "link": null,
                "notes": null,
                "priority": 9,
                "created_at": "2025-12-01T10:00:00Z"
            },
            {
                "id": "7f1c2f43-4b4f-4d47-9d5c-0d4d3e3a6b11",
                "user_id": "0a8a3c1e-2b9a-4f35-8b71-3e2e1f0f9c22",
                "name": "Skates",
                "link": null,
                "notes": null,
                "priority": -1,
                "created_at": "2025-12-01T10:00:00Z"
            },
            {
                "id": "8f1c2f43-4b4f-4d47-9d5c-0d4d3e3a6b11",
                "user_id": "0a8a3c1e-2b9a-4f35-8b71-3e2e1f0f9c22",
                "name": "Mittens",
                "link": null,
                "notes": null,
                "priority": null,
                "created_at": "2025-12-01T10:00:00Z"
            }
        ]"#;
        let wishes: Vec<Wish> = serde_json::from_str(json).unwrap();
        assert_eq!(wishes.len(), 3);
        assert!(wishes.iter().all(|w| w.priority.is_none()));
    }
}
