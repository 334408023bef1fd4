use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, error};
use url::form_urlencoded;

use wishlist_backend::AuthSession;
use wishlist_types::User;

use crate::state::AppState;

pub const ACCESS_COOKIE: &str = "wishlist-access-token";
pub const REFRESH_COOKIE: &str = "wishlist-refresh-token";

/// The signed-in user behind the current request.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
}

impl From<AuthSession> for Session {
    fn from(auth: AuthSession) -> Self {
        Session {
            user: auth.user,
            access_token: auth.access_token,
        }
    }
}

/// Resolve the session cookies into a [`Session`] request extension.
///
/// An expired access token is traded for a new pair using the refresh token.
/// When neither works the request goes on anonymously and the stale cookies are
/// dropped.
pub async fn load_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let (session, renewed) = resolve(&state, jar).await;
    if let Some(session) = session {
        req.extensions_mut().insert(session);
    }

    let response = next.run(req).await;

    // A handler that signs in or out owns the cookies on its response.
    match renewed {
        Some(jar) if !response.headers().contains_key(header::SET_COOKIE) => {
            (jar, response).into_response()
        }
        _ => response,
    }
}

async fn resolve(state: &AppState, jar: CookieJar) -> (Option<Session>, Option<CookieJar>) {
    let access = jar.get(ACCESS_COOKIE).map(|c| c.value().to_string());
    let refresh = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    if access.is_none() && refresh.is_none() {
        return (None, None);
    }

    if let Some(token) = access {
        match state.backend.get_user(&token).await {
            Ok(Some(user)) => {
                return (
                    Some(Session {
                        user,
                        access_token: token,
                    }),
                    None,
                );
            }
            Ok(None) => debug!("Access token rejected"),
            Err(e) => {
                error!("Failed to load session: {}", e);
                return (None, None);
            }
        }
    }

    if let Some(token) = refresh {
        match state.backend.refresh_session(&token).await {
            Ok(auth) => {
                debug!("Refreshed session for {}", auth.user.id);
                let jar = set_session_cookies(jar, &auth, state.secure_cookies);
                return (Some(auth.into()), Some(jar));
            }
            Err(e) => debug!("Session refresh failed: {}", e),
        }
    }

    (None, Some(clear_session_cookies(jar)))
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .permanent()
        .build()
}

pub fn set_session_cookies(jar: CookieJar, auth: &AuthSession, secure: bool) -> CookieJar {
    jar.add(session_cookie(ACCESS_COOKIE, auth.access_token.clone(), secure))
        .add(session_cookie(REFRESH_COOKIE, auth.refresh_token.clone(), secure))
}

pub fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_COOKIE).path("/"))
}

/// Login page that returns to `path` afterwards.
pub fn login_redirect(path: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", path)
        .finish();
    format!("/login?{query}")
}

/// The session, if the request has one.
pub struct MaybeSession(pub Option<Session>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(parts.extensions.get::<Session>().cloned()))
    }
}

/// The session; anonymous visitors are sent to log in first.
pub struct RequireSession(pub Session);

impl<S: Send + Sync> FromRequestParts<S> for RequireSession {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(RequireSession)
            .ok_or_else(|| Redirect::to(&login_redirect(parts.uri.path())))
    }
}
