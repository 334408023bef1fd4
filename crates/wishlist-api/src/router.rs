use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, pages, profile, reserve, wishes};
use crate::middleware::load_session;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/dashboard", get(pages::dashboard))
        .route("/profile", post(profile::update))
        .route("/wishes", post(wishes::add))
        .route("/wishes/{id}", post(wishes::update))
        .route("/wishes/{id}/delete", post(wishes::delete))
        .route("/list/{user_id}", get(pages::list))
        .route("/list/{user_id}/wishes/{id}/reserve", post(reserve::reserve))
        .route("/list/{user_id}/wishes/{id}/unreserve", post(reserve::unreserve))
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), load_session))
        .route("/health", get(pages::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
