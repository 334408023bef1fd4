//! Askama templates and the view models they render.
//!
//! Templates only see plain strings and flags; everything that needs a decision
//! (who may see a reservation, which wish is being edited) is settled here.

use askama::Template;
use askama_web::WebTemplate;
use uuid::Uuid;

use wishlist_types::{Priority, Wish};

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub next: String,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "signup.html")]
pub struct SignUpTemplate {
    pub next: String,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub display_name: String,
    /// Current metadata name, prefilled in the rename form.
    pub full_name: String,
    pub wish_count: String,
    pub share_url: String,
    pub wishes: Vec<WishView>,
    pub priorities: Vec<PriorityOption>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "list.html")]
pub struct ListTemplate {
    pub heading: String,
    pub owner_id: String,
    pub own_list: bool,
    /// Default name on reserve forms.
    pub viewer_name: String,
    pub available: Vec<WishView>,
    pub reserved: Vec<WishView>,
    pub empty_message: Option<String>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate;

pub struct WishView {
    pub id: String,
    pub name: String,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub priority_badge: Option<String>,
    /// 0 when unset.
    pub priority_rank: u8,
    pub reserved_by: Option<String>,
    /// The viewer holds the reservation and may release it.
    pub reserved_by_viewer: bool,
    /// Render the inline edit form instead of the card.
    pub editing: bool,
}

impl WishView {
    /// Card for the owner's own dashboard. Reservation details stay out.
    pub fn for_owner(wish: &Wish, editing: Option<Uuid>) -> Self {
        Self {
            reserved_by: None,
            reserved_by_viewer: false,
            editing: editing == Some(wish.id),
            ..Self::base(wish)
        }
    }

    /// Card on somebody else's list.
    pub fn for_guest(wish: &Wish, viewer: Uuid) -> Self {
        Self {
            reserved_by: wish
                .reserved_by
                .clone()
                .or_else(|| wish.is_reserved().then(|| "Someone".to_string())),
            reserved_by_viewer: wish.is_reserved_by(viewer),
            ..Self::base(wish)
        }
    }

    fn base(wish: &Wish) -> Self {
        Self {
            id: wish.id.to_string(),
            name: wish.name.clone(),
            link: wish.link.clone(),
            notes: wish.notes.clone(),
            priority_badge: wish.priority.map(priority_badge),
            priority_rank: wish.priority.map(Priority::rank).unwrap_or(0),
            reserved_by: None,
            reserved_by_viewer: false,
            editing: false,
        }
    }
}

pub struct PriorityOption {
    pub rank: u8,
    pub label: &'static str,
}

pub fn priority_options() -> Vec<PriorityOption> {
    Priority::all()
        .map(|p| PriorityOption {
            rank: p.rank(),
            label: p.label(),
        })
        .collect()
}

pub fn priority_badge(priority: Priority) -> String {
    format!("⭐ {}", priority.label())
}

pub fn wish_count(count: usize) -> String {
    match count {
        1 => "1 wish".to_string(),
        n => format!("{n} wishes"),
    }
}
