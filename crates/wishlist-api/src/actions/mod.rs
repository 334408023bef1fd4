//! Form handlers. Each one validates its input, makes one call to the backend
//! and reports back a notice for the next page.

pub mod auth;
pub mod profile;
pub mod reserve;
pub mod wishes;

use wishlist_backend::BackendError;

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The submitted form did not pass validation.
    #[error("{0}")]
    Invalid(String),

    /// The form was fine but the write was refused.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub const WISH_NOT_FOUND: &str = "Wish not found";

/// Notice to flash on success.
pub type ActionResult = Result<Option<String>, ActionError>;
