use std::sync::Arc;

use anyhow::anyhow;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use wishlist_db::Database;
use wishlist_types::{NewWish, User, Wish, WishFilter, WishPatch};

use crate::{AuthSession, Backend, BackendError, SignUpOutcome, SignUpRequest};

const ACCESS_TOKEN_SECS: i64 = 60 * 60;
const REFRESH_TOKEN_SECS: i64 = 30 * 24 * 60 * 60;
const MIN_PASSWORD_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "Invalid login credentials";
const INVALID_JWT: &str = "Invalid JWT";
const INVALID_REFRESH: &str = "Invalid Refresh Token";
const ROW_POLICY_VIOLATION: &str = "new row violates row-level security policy for table \"wishes\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub typ: TokenKind,
    pub exp: usize,
}

/// The hosted service's contract, served from a local SQLite database.
///
/// Sessions are stateless HS256 tokens. Row access mirrors the hosted policies:
/// every table call needs a valid access token, owners alone may insert, edit or
/// delete their rows, and anyone signed in may write the reservation columns.
pub struct LocalBackend {
    db: Arc<Database>,
    jwt_secret: String,
}

impl LocalBackend {
    pub fn new(db: Database, jwt_secret: impl Into<String>) -> Self {
        Self {
            db: Arc::new(db),
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Run blocking DB work off the async runtime.
    async fn blocking<F, T>(&self, f: F) -> Result<T, BackendError>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                BackendError::Storage(anyhow!("storage task failed: {}", e))
            })?
            .map_err(BackendError::from)
    }

    fn create_token(&self, user_id: Uuid, email: &str, typ: TokenKind) -> anyhow::Result<String> {
        let ttl = match typ {
            TokenKind::Access => ACCESS_TOKEN_SECS,
            TokenKind::Refresh => REFRESH_TOKEN_SECS,
        };
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            typ,
            exp: (Utc::now().timestamp() + ttl) as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    fn decode_token(&self, token: &str, expected: TokenKind) -> Option<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| debug!("Rejected token: {}", e))
        .ok()?;

        (data.claims.typ == expected).then_some(data.claims)
    }

    fn issue_session(&self, user: User) -> Result<AuthSession, BackendError> {
        let email = user.email.clone().unwrap_or_default();
        Ok(AuthSession {
            access_token: self.create_token(user.id, &email, TokenKind::Access)?,
            refresh_token: self.create_token(user.id, &email, TokenKind::Refresh)?,
            user,
        })
    }

    /// Identity behind an access token, as the row policies see it.
    fn caller(&self, access_token: &str) -> Result<Uuid, BackendError> {
        self.decode_token(access_token, TokenKind::Access)
            .map(|claims| claims.sub)
            .ok_or_else(|| BackendError::service(401, INVALID_JWT))
    }

    async fn load_user(&self, user_id: Uuid) -> Result<Option<User>, BackendError> {
        self.blocking(move |db| {
            db.get_user_by_id(&user_id.to_string())?
                .map(|row| row.to_user())
                .transpose()
        })
        .await
    }
}

/// Owner-only writes: narrow the caller's filter to their own rows. `None` when
/// the filter already names somebody else, so nothing can match.
fn scope_to_owner(filter: &WishFilter, caller: Uuid) -> Option<WishFilter> {
    match filter.owner {
        Some(owner) if owner != caller => None,
        _ => Some(filter.owned_by(caller)),
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn sign_up(&self, req: &SignUpRequest) -> Result<SignUpOutcome, BackendError> {
        let email = req.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(BackendError::service(
                400,
                "Unable to validate email address: invalid format",
            ));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BackendError::service(
                422,
                format!("Password should be at least {MIN_PASSWORD_LEN} characters."),
            ));
        }

        let password = req.password.clone();
        let full_name = req.full_name.clone().filter(|n| !n.trim().is_empty());
        let user_id = Uuid::new_v4();

        let created = self
            .blocking(move |db| {
                if db.get_user_by_email(&email)?.is_some() {
                    return Ok(None);
                }

                // Hash password with Argon2id
                let salt = SaltString::generate(&mut OsRng);
                let password_hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| anyhow!("password hashing failed: {}", e))?
                    .to_string();

                db.create_user(&user_id.to_string(), &email, &password_hash, full_name.as_deref())?;
                Ok(Some(User {
                    id: user_id,
                    email: Some(email),
                    full_name,
                }))
            })
            .await?;

        let user = created.ok_or_else(|| BackendError::service(422, "User already registered"))?;
        info!("Registered local account {}", user.id);

        // Local accounts need no email confirmation.
        Ok(SignUpOutcome::SignedIn(self.issue_session(user)?))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let email = email.trim().to_string();
        let password = password.to_string();

        let user = self
            .blocking(move |db| {
                let Some(row) = db.get_user_by_email(&email)? else {
                    return Ok(None);
                };

                let parsed_hash = PasswordHash::new(&row.password)
                    .map_err(|e| anyhow!("corrupt password hash for {}: {}", row.id, e))?;
                if Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_err()
                {
                    return Ok(None);
                }

                row.to_user().map(Some)
            })
            .await?
            .ok_or_else(|| BackendError::service(400, INVALID_CREDENTIALS))?;

        self.issue_session(user)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        let claims = self
            .decode_token(refresh_token, TokenKind::Refresh)
            .ok_or_else(|| BackendError::service(401, INVALID_REFRESH))?;

        let user = self
            .load_user(claims.sub)
            .await?
            .ok_or_else(|| BackendError::service(401, INVALID_REFRESH))?;

        self.issue_session(user)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let user_id = self.caller(access_token)?;
        // Tokens are stateless; they simply age out.
        debug!("Local sign-out for {}", user_id);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>, BackendError> {
        match self.decode_token(access_token, TokenKind::Access) {
            Some(claims) => self.load_user(claims.sub).await,
            None => Ok(None),
        }
    }

    async fn update_full_name(
        &self,
        access_token: &str,
        full_name: &str,
    ) -> Result<User, BackendError> {
        let user_id = self.caller(access_token)?;
        let full_name = full_name.to_string();

        self.blocking(move |db| {
            db.set_full_name(&user_id.to_string(), &full_name)?
                .map(|row| row.to_user())
                .transpose()
        })
        .await?
        .ok_or_else(|| BackendError::service(404, "User not found"))
    }

    async fn admin_get_user(&self, user_id: Uuid) -> Result<Option<User>, BackendError> {
        self.load_user(user_id).await
    }

    async fn select_wishes(
        &self,
        access_token: &str,
        filter: &WishFilter,
    ) -> Result<Vec<Wish>, BackendError> {
        self.caller(access_token)?;
        let filter = *filter;
        self.blocking(move |db| db.select_wishes(&filter)).await
    }

    async fn insert_wish(&self, access_token: &str, wish: &NewWish) -> Result<Wish, BackendError> {
        let caller = self.caller(access_token)?;
        if wish.user_id != caller {
            return Err(BackendError::service(403, ROW_POLICY_VIOLATION));
        }

        let wish = wish.clone();
        self.blocking(move |db| db.insert_wish(Uuid::new_v4(), &wish, Utc::now()))
            .await
    }

    async fn update_wishes(
        &self,
        access_token: &str,
        filter: &WishFilter,
        patch: &WishPatch,
    ) -> Result<Vec<Wish>, BackendError> {
        let caller = self.caller(access_token)?;

        let filter = match patch {
            WishPatch::Details(_) => match scope_to_owner(filter, caller) {
                Some(filter) => filter,
                None => return Ok(Vec::new()),
            },
            WishPatch::Reserve { reserved_by_id, .. } if *reserved_by_id != caller => {
                return Err(BackendError::service(403, ROW_POLICY_VIOLATION));
            }
            WishPatch::Reserve { .. } | WishPatch::Release => *filter,
        };

        let patch = patch.clone();
        self.blocking(move |db| db.update_wishes(&filter, &patch)).await
    }

    async fn delete_wishes(
        &self,
        access_token: &str,
        filter: &WishFilter,
    ) -> Result<Vec<Wish>, BackendError> {
        let caller = self.caller(access_token)?;
        let Some(filter) = scope_to_owner(filter, caller) else {
            return Ok(Vec::new());
        };

        self.blocking(move |db| db.delete_wishes(&filter)).await
    }
}
