use tracing::{info, warn};
use url::form_urlencoded;

use wishlist_backend::{AuthSession, Backend, SignUpOutcome, SignUpRequest};
use wishlist_types::api::{SignInForm, SignUpForm, sanitize_next};

use super::ActionError;

pub const CONFIRM_EMAIL_NOTICE: &str = "Check your email to confirm your account!";

/// Create an account. Confirmation links bring the user back to the login page,
/// which then continues to `next`.
pub async fn sign_up(
    backend: &dyn Backend,
    form: &SignUpForm,
    site_url: &str,
) -> Result<SignUpOutcome, ActionError> {
    let next = sanitize_next(form.next.as_deref());
    let name = form.name.trim();
    let redirect_to = format!(
        "{}/login?{}",
        site_url.trim_end_matches('/'),
        form_urlencoded::Serializer::new(String::new())
            .append_pair("next", &next)
            .finish()
    );

    let req = SignUpRequest {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        full_name: (!name.is_empty()).then(|| name.to_string()),
        redirect_to: Some(redirect_to),
    };

    let outcome = backend.sign_up(&req).await?;
    info!("Signed up {}", req.email);
    Ok(outcome)
}

pub async fn sign_in(backend: &dyn Backend, form: &SignInForm) -> Result<AuthSession, ActionError> {
    let session = backend.sign_in(form.email.trim(), &form.password).await?;
    info!("User {} signed in", session.user.id);
    Ok(session)
}

/// Revoke the session remotely. Failures are only logged: the caller drops the
/// cookies either way.
pub async fn sign_out(backend: &dyn Backend, access_token: Option<&str>) {
    let Some(token) = access_token else { return };
    if let Err(e) = backend.sign_out(token).await {
        warn!("Remote sign-out failed: {}", e);
    }
}
