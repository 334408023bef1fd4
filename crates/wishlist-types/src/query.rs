//! Row filters and write payloads for the `wishes` table.
//!
//! Both backends translate these into a single statement: PostgREST query
//! parameters for the hosted service, a `WHERE` clause for the local store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Priority;

/// Fields the owner of a wish controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishDetails {
    pub name: String,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWish {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub details: WishDetails,
}

/// Change applied by a conditional update.
#[derive(Debug, Clone, PartialEq)]
pub enum WishPatch {
    Details(WishDetails),
    Reserve { reserved_by: String, reserved_by_id: Uuid },
    Release,
}

impl WishPatch {
    /// Column/value pairs written by this patch.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Details(details) => serde_json::json!({
                "name": details.name,
                "link": details.link,
                "notes": details.notes,
                "priority": details.priority,
            }),
            Self::Reserve {
                reserved_by,
                reserved_by_id,
            } => serde_json::json!({
                "reserved_by": reserved_by,
                "reserved_by_id": reserved_by_id,
            }),
            Self::Release => serde_json::json!({
                "reserved_by": null,
                "reserved_by_id": null,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReserverFilter {
    #[default]
    Any,
    /// Nobody has claimed the wish yet.
    Unreserved,
    HeldBy(Uuid),
}

/// Conjunction of equality filters over the `wishes` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WishFilter {
    pub id: Option<Uuid>,
    pub owner: Option<Uuid>,
    pub not_owner: Option<Uuid>,
    pub reserver: ReserverFilter,
}

impl WishFilter {
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_owner(owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    pub fn owned_by(mut self, owner: Uuid) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn not_owned_by(mut self, user: Uuid) -> Self {
        self.not_owner = Some(user);
        self
    }

    pub fn unreserved(mut self) -> Self {
        self.reserver = ReserverFilter::Unreserved;
        self
    }

    pub fn reserved_by(mut self, user: Uuid) -> Self {
        self.reserver = ReserverFilter::HeldBy(user);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_combines_conditions() {
        let id = Uuid::new_v4();
        let me = Uuid::new_v4();
        let filter = WishFilter::by_id(id).not_owned_by(me).unreserved();
        assert_eq!(filter.id, Some(id));
        assert_eq!(filter.not_owner, Some(me));
        assert_eq!(filter.owner, None);
        assert_eq!(filter.reserver, ReserverFilter::Unreserved);
    }

    #[test]
    fn release_clears_both_reservation_columns() {
        let json = WishPatch::Release.to_json();
        assert!(json["reserved_by"].is_null());
        assert!(json["reserved_by_id"].is_null());
        assert_eq!(json.as_object().map(|o| o.len()), Some(2));
    }

    #[test]
    fn details_patch_does_not_touch_reservation() {
        let patch = WishPatch::Details(WishDetails {
            name: "Scarf".into(),
            link: None,
            notes: None,
            priority: Priority::new(2),
        });
        let json = patch.to_json();
        assert_eq!(json["priority"], 2);
        assert!(json.get("reserved_by").is_none());
    }
}
