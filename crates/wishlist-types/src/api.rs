use serde::Deserialize;
use url::Url;

use crate::models::Priority;
use crate::query::WishDetails;

/// Where to land after signing in when nothing else was requested.
pub const DEFAULT_NEXT: &str = "/dashboard";

/// Placeholder origin used to resolve `next` the way a browser would.
const SAME_SITE: &str = "http://wishlist.invalid/";

/// Keep post-login redirects on this site.
///
/// `next` must be an absolute path without whitespace or control characters that
/// still resolves to this origin. The result is the normalized, percent-encoded
/// path and query.
pub fn sanitize_next(next: Option<&str>) -> String {
    next.map(str::trim)
        .filter(|path| path.starts_with('/'))
        .filter(|path| !path.chars().any(|c| c.is_control() || c.is_whitespace()))
        .and_then(|path| {
            let base = Url::parse(SAME_SITE).ok()?;
            let target = base.join(path).ok()?;
            if target.origin() != base.origin() {
                return None;
            }
            Some(match target.query() {
                Some(query) => format!("{}?{}", target.path(), query),
                None => target.path().to_string(),
            })
        })
        .unwrap_or_else(|| DEFAULT_NEXT.to_string())
}

// -- Auth --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub name: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

// -- Profile --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub full_name: String,
}

// -- Wishes --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WishForm {
    pub name: String,
    pub link: String,
    pub notes: String,
    pub priority: String,
}

impl WishForm {
    pub fn validate(&self) -> Result<WishDetails, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Gift name is required".into());
        }

        let link = non_empty(&self.link);
        if let Some(link) = &link {
            let scheme_ok = Url::parse(link)
                .map(|url| matches!(url.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !scheme_ok {
                return Err("Product link must start with http:// or https://".into());
            }
        }

        let priority = match self.priority.trim() {
            "" => None,
            raw => Some(
                raw.parse::<u8>()
                    .ok()
                    .and_then(Priority::new)
                    .ok_or_else(|| "Priority must be between 1 and 5".to_string())?,
            ),
        };

        Ok(WishDetails {
            name: name.to_string(),
            link,
            notes: non_empty(&self.notes),
            priority,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReserveForm {
    pub reserved_by: String,
}

/// Optional query parameters carried by every page.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
    pub next: Option<String>,
    /// Wish whose inline edit form is open on the dashboard.
    pub edit: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
