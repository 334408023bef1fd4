pub mod api;
pub mod models;
pub mod query;

pub use models::{Priority, User, Wish};
pub use query::{NewWish, ReserverFilter, WishDetails, WishFilter, WishPatch};
