//! Database row types. These map directly to SQLite rows.
//! Distinct from wishlist-types models to keep the DB layer independent.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use wishlist_types::{Priority, User, Wish};

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub created_at: String,
}

impl UserRow {
    pub fn to_user(&self) -> Result<User> {
        Ok(User {
            id: self.id.parse().with_context(|| format!("corrupt user id '{}'", self.id))?,
            email: Some(self.email.clone()),
            full_name: self.full_name.clone(),
        })
    }
}

pub struct WishRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<i64>,
    pub reserved_by: Option<String>,
    pub reserved_by_id: Option<String>,
    pub created_at: String,
}

impl TryFrom<WishRow> for Wish {
    type Error = anyhow::Error;

    fn try_from(row: WishRow) -> Result<Self> {
        let priority = match row.priority {
            Some(rank) => Some(
                u8::try_from(rank)
                    .ok()
                    .and_then(Priority::new)
                    .with_context(|| format!("corrupt priority {} on wish '{}'", rank, row.id))?,
            ),
            None => None,
        };
        let reserved_by_id = match row.reserved_by_id.as_deref() {
            Some(id) => Some(
                id.parse()
                    .with_context(|| format!("corrupt reserved_by_id '{}' on wish '{}'", id, row.id))?,
            ),
            None => None,
        };

        Ok(Wish {
            id: row.id.parse().with_context(|| format!("corrupt wish id '{}'", row.id))?,
            user_id: row
                .user_id
                .parse()
                .with_context(|| format!("corrupt user_id '{}' on wish '{}'", row.user_id, row.id))?,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map(|ts| ts.with_timezone(&Utc))
                .with_context(|| format!("corrupt created_at '{}' on wish '{}'", row.created_at, row.id))?,
            name: row.name,
            link: row.link,
            notes: row.notes,
            priority,
            reserved_by: row.reserved_by,
            reserved_by_id,
        })
    }
}
