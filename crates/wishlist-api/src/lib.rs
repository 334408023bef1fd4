//! Web front end for the holiday wishlist: server-rendered pages, form
//! actions and cookie sessions on top of a [`wishlist_backend::Backend`].

pub mod actions;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod templates;

pub use router::create_router;
pub use state::{AppState, AppStateInner};
