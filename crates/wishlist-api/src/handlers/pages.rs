use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use wishlist_types::WishFilter;
use wishlist_types::api::{DEFAULT_NEXT, PageQuery};

use crate::error::PageError;
use crate::middleware::{MaybeSession, RequireSession, login_redirect};
use crate::state::AppState;
use crate::templates::{
    DashboardTemplate, HomeTemplate, ListTemplate, NotFoundTemplate, WishView, priority_options,
    wish_count,
};

pub async fn home(MaybeSession(session): MaybeSession) -> Response {
    match session {
        Some(_) => Redirect::to(DEFAULT_NEXT).into_response(),
        None => HomeTemplate.into_response(),
    }
}

pub async fn dashboard(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Query(query): Query<PageQuery>,
) -> Result<DashboardTemplate, PageError> {
    let user = &session.user;
    let wishes = state
        .backend
        .select_wishes(&session.access_token, &WishFilter::by_owner(user.id))
        .await?;
    let editing = query.edit.as_deref().and_then(|id| Uuid::parse_str(id).ok());

    Ok(DashboardTemplate {
        display_name: user.display_name(),
        full_name: user.full_name.clone().unwrap_or_default(),
        wish_count: wish_count(wishes.len()),
        share_url: state.share_url(user.id),
        wishes: wishes
            .iter()
            .map(|wish| WishView::for_owner(wish, editing))
            .collect(),
        priorities: priority_options(),
        notice: query.notice,
        error: query.error,
    })
}

/// Somebody's shared list. Viewers must be signed in so that reservations
/// can be tied to an account.
pub async fn list(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(owner_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, PageError> {
    let owner_id = Uuid::parse_str(&owner_id).map_err(|_| PageError::NotFound)?;
    let Some(session) = session else {
        return Ok(Redirect::to(&login_redirect(&format!("/list/{owner_id}"))).into_response());
    };

    let owner = state
        .backend
        .admin_get_user(owner_id)
        .await?
        .ok_or(PageError::NotFound)?;
    let wishes = state
        .backend
        .select_wishes(&session.access_token, &WishFilter::by_owner(owner_id))
        .await?;

    let viewer = session.user.id;
    let own_list = owner_id == viewer;
    let (reserved, available): (Vec<_>, Vec<_>) = wishes.iter().partition(|w| w.is_reserved());

    let page = if own_list {
        let available: Vec<WishView> = available
            .into_iter()
            .map(|wish| WishView::for_owner(wish, None))
            .collect();
        ListTemplate {
            heading: "Your Christmas List".into(),
            owner_id: owner_id.to_string(),
            own_list,
            viewer_name: session.user.display_name(),
            empty_message: available
                .is_empty()
                .then(|| "All your wishes have been reserved! 🎉".to_string()),
            available,
            reserved: Vec::new(),
            notice: query.notice,
            error: query.error,
        }
    } else {
        let available: Vec<WishView> = available
            .into_iter()
            .map(|wish| WishView::for_guest(wish, viewer))
            .collect();
        let reserved: Vec<WishView> = reserved
            .into_iter()
            .map(|wish| WishView::for_guest(wish, viewer))
            .collect();
        ListTemplate {
            heading: format!("{}'s List", owner.display_name()),
            owner_id: owner_id.to_string(),
            own_list,
            viewer_name: session.user.display_name(),
            empty_message: (available.is_empty() && reserved.is_empty())
                .then(|| "This wishlist is empty or all items have been reserved!".to_string()),
            available,
            reserved,
            notice: query.notice,
            error: query.error,
        }
    };

    Ok(page.into_response())
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NotFoundTemplate)
}

pub async fn health() -> &'static str {
    "ok"
}
