use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use uuid::Uuid;

use wishlist_types::api::ReserveForm;

use super::{flash, parse_wish_id};
use crate::actions;
use crate::error::PageError;
use crate::middleware::MaybeSession;
use crate::state::AppState;

/// A list that cannot exist is a 404; a bad wish id is reported on the list.
fn list_target(owner_id: &str) -> Result<(Uuid, String), PageError> {
    let owner_id = Uuid::parse_str(owner_id).map_err(|_| PageError::NotFound)?;
    Ok((owner_id, format!("/list/{owner_id}")))
}

pub async fn reserve(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path((owner_id, wish_id)): Path<(String, String)>,
    Form(form): Form<ReserveForm>,
) -> Result<Redirect, PageError> {
    let (owner_id, list) = list_target(&owner_id)?;
    let result = match parse_wish_id(&wish_id) {
        Ok(wish_id) => {
            actions::reserve::reserve_wish(
                state.backend.as_ref(),
                session.as_ref(),
                wish_id,
                &form,
                owner_id,
            )
            .await
        }
        Err(e) => Err(e),
    };
    Ok(flash(&list, result))
}

pub async fn unreserve(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path((owner_id, wish_id)): Path<(String, String)>,
) -> Result<Redirect, PageError> {
    let (owner_id, list) = list_target(&owner_id)?;
    let result = match parse_wish_id(&wish_id) {
        Ok(wish_id) => {
            actions::reserve::unreserve_wish(state.backend.as_ref(), session.as_ref(), wish_id, owner_id)
                .await
        }
        Err(e) => Err(e),
    };
    Ok(flash(&list, result))
}
