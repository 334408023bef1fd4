//! Client for the hosted Supabase project (GoTrue auth + PostgREST).

pub mod rest;
pub mod wire;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use wishlist_types::{NewWish, User, Wish, WishFilter, WishPatch};

use crate::{AuthSession, Backend, BackendError, SignUpOutcome, SignUpRequest};
use rest::{NEWEST_FIRST, WISHES_TABLE, filter_params};
use wire::{
    AdminUserResponse, PasswordGrant, RefreshGrant, RemoteUser, SignUpBody, TokenResponse,
    UpdateUserBody, UserMetadata,
};

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    /// Public project key; row policies apply.
    pub anon_key: String,
    /// Bypasses row policies. Only used for account lookups.
    pub service_role_key: Option<String>,
}

pub struct SupabaseBackend {
    http: Client,
    base: Url,
    anon_key: String,
    service_role_key: Option<String>,
}

impl SupabaseBackend {
    pub fn new(config: SupabaseConfig) -> Self {
        let mut base = config.url;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Self {
            http: Client::new(),
            base,
            anon_key: config.anon_key,
            service_role_key: config.service_role_key,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|e| BackendError::Config(format!("invalid endpoint {path}: {e}")))
    }

    /// Request signed with the project key, acting as `bearer`.
    fn request(&self, method: Method, path: &str, bearer: &str) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .http
            .request(method, self.endpoint(path)?)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(bearer))
    }

    fn admin_request(&self, method: Method, path: &str) -> Result<RequestBuilder, BackendError> {
        let key = self.service_role_key.as_deref().ok_or_else(|| {
            BackendError::Config("SUPABASE_SERVICE_ROLE_KEY is required to look up list owners".into())
        })?;

        Ok(self
            .http
            .request(method, self.endpoint(path)?)
            .header("apikey", key)
            .bearer_auth(key))
    }

    fn wishes(&self, method: Method, access_token: &str, filter: &WishFilter) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .request(method, WISHES_TABLE, access_token)?
            .query(&filter_params(filter))
            .header("Prefer", "return=representation"))
    }

    async fn token_grant<B: serde::Serialize + ?Sized>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<AuthSession, BackendError> {
        let builder = self
            .request(Method::POST, "auth/v1/token", &self.anon_key)?
            .query(&[("grant_type", grant_type)])
            .json(body);
        let tokens: TokenResponse = send(builder).await?;
        Ok(tokens.into())
    }
}

impl From<TokenResponse> for AuthSession {
    fn from(tokens: TokenResponse) -> Self {
        AuthSession {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user: tokens.user.into(),
        }
    }
}

/// Send and fail on any non-2xx status, keeping the service's own message.
async fn checked(builder: RequestBuilder) -> Result<reqwest::Response, BackendError> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!("Backend returned {}: {}", status, body);
    let message = wire::error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
    Err(BackendError::service(status.as_u16(), message))
}

/// Sign-up answers with a full session when the account is usable right away,
/// and with the bare account while email confirmation is pending.
fn sign_up_outcome(response: serde_json::Value) -> Result<SignUpOutcome, BackendError> {
    if response.get("access_token").and_then(|t| t.as_str()).is_none() {
        return Ok(SignUpOutcome::ConfirmationRequired);
    }

    let tokens: TokenResponse = serde_json::from_value(response)
        .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
    Ok(SignUpOutcome::SignedIn(tokens.into()))
}

async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, BackendError> {
    let text = checked(builder).await?.text().await?;
    serde_json::from_str(&text).map_err(|e| BackendError::InvalidResponse(format!("{e}: {text}")))
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn sign_up(&self, req: &SignUpRequest) -> Result<SignUpOutcome, BackendError> {
        let mut builder = self.request(Method::POST, "auth/v1/signup", &self.anon_key)?;
        if let Some(redirect) = &req.redirect_to {
            builder = builder.query(&[("redirect_to", redirect.as_str())]);
        }
        let body = SignUpBody {
            email: req.email.trim(),
            password: &req.password,
            data: UserMetadata {
                full_name: req.full_name.clone(),
            },
        };

        sign_up_outcome(send(builder.json(&body)).await?)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        self.token_grant(
            "password",
            &PasswordGrant {
                email: email.trim(),
                password,
            },
        )
        .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        self.token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        checked(self.request(Method::POST, "auth/v1/logout", access_token)?).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>, BackendError> {
        match send::<RemoteUser>(self.request(Method::GET, "auth/v1/user", access_token)?).await {
            Ok(user) => Ok(Some(user.into())),
            Err(e) if e.is_unauthorized() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn update_full_name(
        &self,
        access_token: &str,
        full_name: &str,
    ) -> Result<User, BackendError> {
        let body = UpdateUserBody {
            data: UserMetadata {
                full_name: Some(full_name.to_string()),
            },
        };
        let builder = self
            .request(Method::PUT, "auth/v1/user", access_token)?
            .json(&body);
        let user: RemoteUser = send(builder).await?;
        Ok(user.into())
    }

    async fn admin_get_user(&self, user_id: Uuid) -> Result<Option<User>, BackendError> {
        let builder = self.admin_request(Method::GET, &format!("auth/v1/admin/users/{user_id}"))?;
        match send::<AdminUserResponse>(builder).await {
            Ok(user) => Ok(Some(user.into())),
            Err(e) if e.status() == Some(404) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn select_wishes(
        &self,
        access_token: &str,
        filter: &WishFilter,
    ) -> Result<Vec<Wish>, BackendError> {
        let builder = self
            .request(Method::GET, WISHES_TABLE, access_token)?
            .query(&[("select", "*")])
            .query(&filter_params(filter))
            .query(&[("order", NEWEST_FIRST)]);
        send(builder).await
    }

    async fn insert_wish(&self, access_token: &str, wish: &NewWish) -> Result<Wish, BackendError> {
        let builder = self
            .request(Method::POST, WISHES_TABLE, access_token)?
            .header("Prefer", "return=representation")
            .json(wish);
        let mut rows: Vec<Wish> = send(builder).await?;
        rows.pop()
            .ok_or_else(|| BackendError::InvalidResponse("insert returned no rows".into()))
    }

    async fn update_wishes(
        &self,
        access_token: &str,
        filter: &WishFilter,
        patch: &WishPatch,
    ) -> Result<Vec<Wish>, BackendError> {
        let builder = self
            .wishes(Method::PATCH, access_token, filter)?
            .json(&patch.to_json());
        send(builder).await
    }

    async fn delete_wishes(
        &self,
        access_token: &str,
        filter: &WishFilter,
    ) -> Result<Vec<Wish>, BackendError> {
        send(self.wishes(Method::DELETE, access_token, filter)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(url: &str, service_role_key: Option<&str>) -> SupabaseBackend {
        SupabaseBackend::new(SupabaseConfig {
            url: Url::parse(url).unwrap(),
            anon_key: "anon".into(),
            service_role_key: service_role_key.map(str::to_string),
        })
    }

    #[test]
    fn endpoints_are_joined_under_the_project_url() {
        let plain = backend("https://abc.supabase.co", None);
        assert_eq!(
            plain.endpoint("auth/v1/signup").unwrap().as_str(),
            "https://abc.supabase.co/auth/v1/signup"
        );

        let proxied = backend("https://proxy.example/supabase", None);
        assert_eq!(
            proxied.endpoint(WISHES_TABLE).unwrap().as_str(),
            "https://proxy.example/supabase/rest/v1/wishes"
        );
    }

    #[test]
    fn sign_up_without_session_awaits_confirmation() {
        let pending = serde_json::json!({
            "id": "0a8a3c1e-2b9a-4f35-8b71-3e2e1f0f9c22",
            "email": "elf@northpole.org",
            "confirmation_sent_at": "2025-12-01T10:00:00Z",
            "user_metadata": {"full_name": "Buddy"}
        });
        assert_eq!(sign_up_outcome(pending).unwrap(), SignUpOutcome::ConfirmationRequired);
    }

    #[test]
    fn sign_up_with_session_signs_in() {
        let confirmed = serde_json::json!({
            "access_token": "access",
            "token_type": "bearer",
            "refresh_token": "refresh",
            "user": {
                "id": "0a8a3c1e-2b9a-4f35-8b71-3e2e1f0f9c22",
                "email": "elf@northpole.org",
                "user_metadata": {"full_name": "Buddy"}
            }
        });
        match sign_up_outcome(confirmed).unwrap() {
            SignUpOutcome::SignedIn(session) => {
                assert_eq!(session.access_token, "access");
                assert_eq!(session.refresh_token, "refresh");
                assert_eq!(session.user.display_name(), "Buddy");
            }
            other => panic!("expected a session, got {other:?}"),
        }

        let truncated = serde_json::json!({"access_token": "access"});
        assert!(matches!(
            sign_up_outcome(truncated),
            Err(BackendError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn owner_lookup_needs_the_service_key() {
        let err = backend("https://abc.supabase.co", None)
            .admin_get_user(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Config(_)));
    }
}
