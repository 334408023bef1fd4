use tracing::info;

use wishlist_backend::Backend;
use wishlist_types::api::ProfileForm;

use super::{ActionError, ActionResult};
use crate::middleware::Session;

pub async fn update_profile_name(
    backend: &dyn Backend,
    session: Option<&Session>,
    form: &ProfileForm,
) -> ActionResult {
    let session = session.ok_or(ActionError::NotAuthenticated)?;
    let full_name = form.full_name.trim();

    let user = backend
        .update_full_name(&session.access_token, full_name)
        .await?;
    info!("User {} is now called {:?}", user.id, user.full_name);

    Ok(Some("Name updated".into()))
}
