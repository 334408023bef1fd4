use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use wishlist_backend::BackendError;

use crate::templates::{ErrorTemplate, NotFoundTemplate};

/// Failure while rendering a page, as opposed to a rejected form.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("page not found")]
    NotFound,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound => (StatusCode::NOT_FOUND, NotFoundTemplate).into_response(),
            PageError::Backend(e) => {
                error!("Failed to render page: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorTemplate).into_response()
            }
        }
    }
}
