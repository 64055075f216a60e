use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::database::Store;
use crate::error::{AppError, Result};
use crate::models::{Identity, Recipe, Role, User, UserBrief};
use crate::utils::{generate_token, hash_password, verify_password};

const MIN_PASSWORD_CHARS: usize = 6;
const MAX_NAME_CHARS: usize = 200;

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    /// Unix timestamp, seconds.
    pub expires_at: i64,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserBrief,
    pub recipes: Vec<Recipe>,
}

fn issue_session(config: &Config, user: User) -> Result<Session> {
    let (token, expires_at) = generate_token(user.id, config)
        .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))?;
    Ok(Session {
        token,
        expires_at,
        user,
    })
}

fn hash(password: &str) -> Result<String> {
    hash_password(password).map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
}

fn validate_name(name: Option<String>) -> Result<Option<String>> {
    let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    if name.as_ref().is_some_and(|n| n.chars().count() > MAX_NAME_CHARS) {
        return Err(AppError::InvalidArgument(format!(
            "name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(name)
}

pub async fn register(
    store: &dyn Store,
    config: &Config,
    email: &str,
    password: &str,
    name: Option<String>,
) -> Result<Session> {
    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidArgument("a valid email is required".into()));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::InvalidArgument(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    let name = validate_name(name)?;

    let user = User {
        id: Uuid::new_v4(),
        email,
        password_hash: hash(password)?,
        name,
        image: None,
        role: Role::User,
        disabled: false,
        created_at: Utc::now(),
    };
    store.insert_user(&user).await?;

    tracing::info!("User registered: {}", user.id);
    issue_session(config, user)
}

pub async fn login(store: &dyn Store, config: &Config, email: &str, password: &str) -> Result<Session> {
    let invalid = || AppError::Unauthorized("invalid email or password".into());

    let user = store
        .find_user_by_email(&normalize_email(email))
        .await?
        .ok_or_else(invalid)?;
    let matches = verify_password(password, &user.password_hash).unwrap_or(false);
    if !matches {
        tracing::warn!("Failed login for user {}", user.id);
        return Err(invalid());
    }
    if user.disabled {
        return Err(AppError::Forbidden("account is disabled".into()));
    }

    tracing::info!("User logged in: {}", user.id);
    issue_session(config, user)
}

pub async fn current_user(store: &dyn Store, caller: &Identity) -> Result<User> {
    store
        .find_user(caller.id)
        .await?
        .ok_or(AppError::NotFound("user"))
}

/// `None` leaves the name as it is; a blank name clears it.
pub async fn update_profile(
    store: &dyn Store,
    caller: &Identity,
    name: Option<String>,
) -> Result<User> {
    caller.ensure_active()?;
    let Some(name) = name else {
        return current_user(store, caller).await;
    };
    let name = validate_name(Some(name))?;
    store
        .update_user_name(caller.id, name)
        .await?
        .ok_or(AppError::NotFound("user"))
}

pub async fn get_user_profile(store: &dyn Store, user_id: Uuid) -> Result<UserProfile> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    let recipes = store.list_public_by_user(user_id).await?;
    Ok(UserProfile {
        user: user.brief(),
        recipes,
    })
}

/// Makes sure an enabled admin account with this email and password exists.
pub async fn ensure_admin_account(store: &dyn Store, email: &str, password: &str) -> Result<User> {
    let email = normalize_email(email);
    let password_hash = hash(password)?;

    if let Some(existing) = store.find_user_by_email(&email).await? {
        store.promote_to_admin(existing.id, &password_hash).await?;
        tracing::info!("Admin account ensured for existing user {}", existing.id);
        return store
            .find_user(existing.id)
            .await?
            .ok_or(AppError::NotFound("user"));
    }

    let user = User {
        id: Uuid::new_v4(),
        email,
        password_hash,
        name: Some("Admin".into()),
        image: None,
        role: Role::Admin,
        disabled: false,
        created_at: Utc::now(),
    };
    store.insert_user(&user).await?;
    tracing::info!("Admin account created: {}", user.id);
    Ok(user)
}
