use std::sync::Arc;

use uuid::Uuid;
use wishlist_backend::Backend;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub backend: Arc<dyn Backend>,
    /// Public base URL, without a trailing slash.
    pub site_url: String,
    /// Mark session cookies `Secure`.
    pub secure_cookies: bool,
}

impl AppStateInner {
    pub fn new(backend: Arc<dyn Backend>, site_url: &str, secure_cookies: bool) -> Self {
        Self {
            backend,
            site_url: site_url.trim_end_matches('/').to_string(),
            secure_cookies,
        }
    }

    /// Link a list owner hands out to family and friends.
    pub fn share_url(&self, user_id: Uuid) -> String {
        format!("{}/list/{}", self.site_url, user_id)
    }
}
