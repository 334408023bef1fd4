use tracing::{info, warn};
use uuid::Uuid;

use wishlist_backend::Backend;
use wishlist_types::api::ReserveForm;
use wishlist_types::{WishFilter, WishPatch};

use super::{ActionError, ActionResult, WISH_NOT_FOUND};
use crate::middleware::Session;

pub const ALREADY_RESERVED: &str = "This gift has already been reserved";
pub const OWN_WISH: &str = "You cannot reserve your own wish";
pub const NOT_RESERVER: &str = "Only the person who reserved this gift can remove the reservation";

/// Claim a gift on someone else's list.
///
/// The claim is a single conditional update (on `list_owner`'s list, not mine,
/// not yet reserved), so of two concurrent attempts exactly one gets the row
/// back. When nothing matched, the row is read again only to say why.
pub async fn reserve_wish(
    backend: &dyn Backend,
    session: Option<&Session>,
    wish_id: Uuid,
    form: &ReserveForm,
    list_owner: Uuid,
) -> ActionResult {
    let session = session.ok_or(ActionError::NotAuthenticated)?;
    let name = form.reserved_by.trim();
    if name.is_empty() {
        return Err(ActionError::Invalid("Please enter your name".into()));
    }

    let me = session.user.id;
    let filter = WishFilter::by_id(wish_id)
        .owned_by(list_owner)
        .not_owned_by(me)
        .unreserved();
    let patch = WishPatch::Reserve {
        reserved_by: name.to_string(),
        reserved_by_id: me,
    };
    let reserved = backend
        .update_wishes(&session.access_token, &filter, &patch)
        .await?;
    if !reserved.is_empty() {
        info!("User {} reserved wish {} on list {}", me, wish_id, list_owner);
        return Ok(Some(format!("Reserved as {name}")));
    }

    let current = backend
        .select_wishes(&session.access_token, &WishFilter::by_id(wish_id))
        .await?;
    let reason = match current.first() {
        None => WISH_NOT_FOUND,
        Some(wish) if !wish.is_owned_by(list_owner) => WISH_NOT_FOUND,
        Some(wish) if wish.is_owned_by(me) => OWN_WISH,
        Some(_) => ALREADY_RESERVED,
    };
    warn!("User {} could not reserve wish {}: {}", me, wish_id, reason);
    Err(ActionError::Rejected(reason.into()))
}

pub async fn unreserve_wish(
    backend: &dyn Backend,
    session: Option<&Session>,
    wish_id: Uuid,
    list_owner: Uuid,
) -> ActionResult {
    let session = session.ok_or(ActionError::NotAuthenticated)?;
    let me = session.user.id;

    let filter = WishFilter::by_id(wish_id)
        .owned_by(list_owner)
        .reserved_by(me);
    let released = backend
        .update_wishes(&session.access_token, &filter, &WishPatch::Release)
        .await?;
    if released.is_empty() {
        warn!("User {} may not release wish {}", me, wish_id);
        return Err(ActionError::Rejected(NOT_RESERVER.into()));
    }

    info!("User {} released wish {} on list {}", me, wish_id, list_owner);
    Ok(Some("Reservation removed".into()))
}
