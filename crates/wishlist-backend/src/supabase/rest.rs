//! PostgREST query encoding for the `wishes` table.

use wishlist_types::{ReserverFilter, WishFilter};

pub const WISHES_TABLE: &str = "rest/v1/wishes";
pub const NEWEST_FIRST: &str = "created_at.desc";

/// Horizontal filters, ANDed together by the service.
pub fn filter_params(filter: &WishFilter) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();

    if let Some(id) = filter.id {
        params.push(("id", format!("eq.{id}")));
    }
    if let Some(owner) = filter.owner {
        params.push(("user_id", format!("eq.{owner}")));
    }
    if let Some(user) = filter.not_owner {
        params.push(("user_id", format!("neq.{user}")));
    }
    match filter.reserver {
        ReserverFilter::Any => {}
        ReserverFilter::Unreserved => {
            params.push(("reserved_by_id", "is.null".to_string()));
            params.push(("reserved_by", "is.null".to_string()));
        }
        ReserverFilter::HeldBy(user) => {
            params.push(("reserved_by_id", format!("eq.{user}")));
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    #[test]
    fn reserve_filter_encoding() {
        let id = Uuid::nil();
        let me = Uuid::from_u128(7);
        let params = filter_params(&WishFilter::by_id(id).not_owned_by(me).unreserved());
        assert_eq!(
            params,
            vec![
                ("id", format!("eq.{id}")),
                ("user_id", format!("neq.{me}")),
                ("reserved_by_id", "is.null".to_string()),
                ("reserved_by", "is.null".to_string()),
            ]
        );
    }

    #[test]
    fn release_filter_encoding() {
        let id = Uuid::nil();
        let me = Uuid::from_u128(7);
        let params = filter_params(&WishFilter::by_id(id).reserved_by(me));
        assert_eq!(params[1], ("reserved_by_id", format!("eq.{me}")));
        assert!(filter_params(&WishFilter::default()).is_empty());
    }
}
