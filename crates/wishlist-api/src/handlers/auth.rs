use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use wishlist_backend::SignUpOutcome;
use wishlist_types::api::{PageQuery, SignInForm, SignUpForm, sanitize_next};

use super::{log_action_error, with_query};
use crate::actions::{self, auth::CONFIRM_EMAIL_NOTICE};
use crate::middleware::{MaybeSession, clear_session_cookies, set_session_cookies};
use crate::state::AppState;
use crate::templates::{LoginTemplate, SignUpTemplate};

pub async fn login_page(MaybeSession(session): MaybeSession, Query(query): Query<PageQuery>) -> Response {
    let next = sanitize_next(query.next.as_deref());
    if session.is_some() {
        return Redirect::to(&next).into_response();
    }

    LoginTemplate {
        next,
        notice: query.notice,
        error: query.error,
    }
    .into_response()
}

pub async fn login(State(state): State<AppState>, jar: CookieJar, Form(form): Form<SignInForm>) -> Response {
    let next = sanitize_next(form.next.as_deref());

    match actions::auth::sign_in(state.backend.as_ref(), &form).await {
        Ok(auth) => (
            set_session_cookies(jar, &auth, state.secure_cookies),
            Redirect::to(&next),
        )
            .into_response(),
        Err(e) => {
            log_action_error(&e);
            let message = e.to_string();
            Redirect::to(&with_query("/login", &[("error", message.as_str()), ("next", next.as_str())]))
                .into_response()
        }
    }
}

pub async fn signup_page(MaybeSession(session): MaybeSession, Query(query): Query<PageQuery>) -> Response {
    let next = sanitize_next(query.next.as_deref());
    if session.is_some() {
        return Redirect::to(&next).into_response();
    }

    SignUpTemplate {
        next,
        notice: query.notice,
        error: query.error,
    }
    .into_response()
}

pub async fn signup(State(state): State<AppState>, jar: CookieJar, Form(form): Form<SignUpForm>) -> Response {
    let next = sanitize_next(form.next.as_deref());

    match actions::auth::sign_up(state.backend.as_ref(), &form, &state.site_url).await {
        Ok(SignUpOutcome::SignedIn(auth)) => (
            set_session_cookies(jar, &auth, state.secure_cookies),
            Redirect::to(&next),
        )
            .into_response(),
        Ok(SignUpOutcome::ConfirmationRequired) => Redirect::to(&with_query(
            "/signup",
            &[("notice", CONFIRM_EMAIL_NOTICE), ("next", next.as_str())],
        ))
        .into_response(),
        Err(e) => {
            log_action_error(&e);
            let message = e.to_string();
            Redirect::to(&with_query("/signup", &[("error", message.as_str()), ("next", next.as_str())]))
                .into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>, MaybeSession(session): MaybeSession, jar: CookieJar) -> impl IntoResponse {
    let token = session.as_ref().map(|s| s.access_token.as_str());
    actions::auth::sign_out(state.backend.as_ref(), token).await;

    (clear_session_cookies(jar), Redirect::to("/login"))
}
