use tracing::{info, warn};
use uuid::Uuid;

use wishlist_backend::Backend;
use wishlist_types::api::WishForm;
use wishlist_types::{NewWish, WishFilter, WishPatch};

use super::{ActionError, ActionResult, WISH_NOT_FOUND};
use crate::middleware::Session;

pub async fn add_wish(backend: &dyn Backend, session: Option<&Session>, form: &WishForm) -> ActionResult {
    let session = session.ok_or(ActionError::NotAuthenticated)?;
    let details = form.validate().map_err(ActionError::Invalid)?;

    let wish = backend
        .insert_wish(
            &session.access_token,
            &NewWish {
                user_id: session.user.id,
                details,
            },
        )
        .await?;
    info!("User {} added wish {}", session.user.id, wish.id);

    Ok(Some("Wish added".into()))
}

/// Only rows owned by the caller are touched, so a foreign id reads as missing.
pub async fn update_wish(
    backend: &dyn Backend,
    session: Option<&Session>,
    wish_id: Uuid,
    form: &WishForm,
) -> ActionResult {
    let session = session.ok_or(ActionError::NotAuthenticated)?;
    let details = form.validate().map_err(ActionError::Invalid)?;

    let filter = WishFilter::by_id(wish_id).owned_by(session.user.id);
    let updated = backend
        .update_wishes(&session.access_token, &filter, &WishPatch::Details(details))
        .await?;
    if updated.is_empty() {
        warn!("User {} cannot edit wish {}", session.user.id, wish_id);
        return Err(ActionError::Rejected(WISH_NOT_FOUND.into()));
    }

    Ok(Some("Wish updated".into()))
}

pub async fn delete_wish(backend: &dyn Backend, session: Option<&Session>, wish_id: Uuid) -> ActionResult {
    let session = session.ok_or(ActionError::NotAuthenticated)?;

    let filter = WishFilter::by_id(wish_id).owned_by(session.user.id);
    let deleted = backend
        .delete_wishes(&session.access_token, &filter)
        .await?;
    if deleted.is_empty() {
        warn!("User {} cannot delete wish {}", session.user.id, wish_id);
        return Err(ActionError::Rejected(WISH_NOT_FOUND.into()));
    }

    info!("User {} deleted wish {}", session.user.id, wish_id);
    Ok(Some("Wish deleted".into()))
}
