use axum::{Form, extract::State, response::Redirect};

use wishlist_types::api::ProfileForm;

use super::flash;
use crate::actions;
use crate::middleware::MaybeSession;
use crate::state::AppState;

pub async fn update(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Form(form): Form<ProfileForm>,
) -> Redirect {
    let result =
        actions::profile::update_profile_name(state.backend.as_ref(), session.as_ref(), &form).await;
    flash("/dashboard", result)
}
