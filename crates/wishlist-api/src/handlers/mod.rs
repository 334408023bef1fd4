//! Route handlers. Pages render templates; form posts run an action and
//! redirect back with the outcome in the query string.

pub mod auth;
pub mod pages;
pub mod profile;
pub mod reserve;
pub mod wishes;

use axum::response::Redirect;
use tracing::{debug, error, warn};
use url::form_urlencoded;
use uuid::Uuid;

use wishlist_backend::BackendError;

use crate::actions::{ActionError, ActionResult, WISH_NOT_FOUND};
use crate::middleware::login_redirect;

/// `path` with the given query parameters appended.
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{path}?{query}")
}

/// Post/redirect/get: back to `path` with a notice or an error banner.
/// Anonymous submissions go to the login page instead.
pub fn flash(path: &str, result: ActionResult) -> Redirect {
    match result {
        Ok(Some(notice)) => Redirect::to(&with_query(path, &[("notice", notice.as_str())])),
        Ok(None) => Redirect::to(path),
        Err(ActionError::NotAuthenticated) => Redirect::to(&login_redirect(path)),
        Err(e) => {
            log_action_error(&e);
            let message = e.to_string();
            Redirect::to(&with_query(path, &[("error", message.as_str())]))
        }
    }
}

/// Wish ids come from the path as text so a mangled link still gets a banner.
pub fn parse_wish_id(raw: &str) -> Result<Uuid, ActionError> {
    Uuid::parse_str(raw).map_err(|_| ActionError::Rejected(WISH_NOT_FOUND.into()))
}

pub fn log_action_error(e: &ActionError) {
    match e {
        ActionError::Backend(BackendError::Service { status, message }) => {
            warn!("Backend refused action ({}): {}", status, message)
        }
        ActionError::Backend(e) => error!("Action failed: {}", e),
        other => debug!("Action rejected: {}", other),
    }
}
