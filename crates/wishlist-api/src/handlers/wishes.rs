use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};

use wishlist_types::api::WishForm;

use super::{flash, parse_wish_id, with_query};
use crate::actions;
use crate::middleware::MaybeSession;
use crate::state::AppState;

const DASHBOARD: &str = "/dashboard";

pub async fn add(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Form(form): Form<WishForm>,
) -> Redirect {
    let result = actions::wishes::add_wish(state.backend.as_ref(), session.as_ref(), &form).await;
    flash(DASHBOARD, result)
}

pub async fn update(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(wish_id): Path<String>,
    Form(form): Form<WishForm>,
) -> Redirect {
    let wish_id = match parse_wish_id(&wish_id) {
        Ok(id) => id,
        Err(e) => return flash(DASHBOARD, Err(e)),
    };
    let result =
        actions::wishes::update_wish(state.backend.as_ref(), session.as_ref(), wish_id, &form).await;

    // Keep the edit form open so the input can be fixed.
    if let Err(actions::ActionError::Invalid(message)) = &result {
        let id = wish_id.to_string();
        return Redirect::to(&with_query(
            DASHBOARD,
            &[("edit", id.as_str()), ("error", message.as_str())],
        ));
    }
    flash(DASHBOARD, result)
}

pub async fn delete(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(wish_id): Path<String>,
) -> Redirect {
    let result = match parse_wish_id(&wish_id) {
        Ok(id) => actions::wishes::delete_wish(state.backend.as_ref(), session.as_ref(), id).await,
        Err(e) => Err(e),
    };
    flash(DASHBOARD, result)
}
