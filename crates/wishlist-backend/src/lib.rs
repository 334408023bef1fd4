//! Access to the hosted auth/data service.
//!
//! Everything the application persists goes through [`Backend`]: accounts,
//! sessions and the `wishes` table. [`SupabaseBackend`] talks to the hosted
//! service over REST; [`LocalBackend`] emulates it on an embedded SQLite file for
//! development and tests.

pub mod error;
pub mod local;
pub mod supabase;

use async_trait::async_trait;
use uuid::Uuid;
use wishlist_types::{NewWish, User, Wish, WishFilter, WishPatch};

pub use error::BackendError;
pub use local::LocalBackend;
pub use supabase::{SupabaseBackend, SupabaseConfig};

/// Tokens handed out by a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    /// Where the confirmation email should send the user back to.
    pub redirect_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The account exists but the email address still has to be confirmed.
    ConfirmationRequired,
    SignedIn(AuthSession),
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn sign_up(&self, req: &SignUpRequest) -> Result<SignUpOutcome, BackendError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    /// `Ok(None)` when the token is expired or otherwise not accepted.
    async fn get_user(&self, access_token: &str) -> Result<Option<User>, BackendError>;

    async fn update_full_name(
        &self,
        access_token: &str,
        full_name: &str,
    ) -> Result<User, BackendError>;

    /// Privileged lookup of any account, regardless of who is asking.
    async fn admin_get_user(&self, user_id: Uuid) -> Result<Option<User>, BackendError>;

    /// Matching rows, newest first.
    async fn select_wishes(
        &self,
        access_token: &str,
        filter: &WishFilter,
    ) -> Result<Vec<Wish>, BackendError>;

    async fn insert_wish(&self, access_token: &str, wish: &NewWish) -> Result<Wish, BackendError>;

    /// Applies `patch` to every row matching `filter` and returns those rows.
    async fn update_wishes(
        &self,
        access_token: &str,
        filter: &WishFilter,
        patch: &WishPatch,
    ) -> Result<Vec<Wish>, BackendError>;

    async fn delete_wishes(
        &self,
        access_token: &str,
        filter: &WishFilter,
    ) -> Result<Vec<Wish>, BackendError>;
}
