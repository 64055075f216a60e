use uuid::Uuid;

use crate::database::Store;
use crate::error::{AppError, Result};
use crate::models::{AdminCommentView, AdminRecipeSummary, Identity, Role, UserSummary};

const RECENT_COMMENT_LIMIT: i64 = 200;

// Admins may act on themselves and on regular users, never on other admins.
async fn ensure_manageable(store: &dyn Store, caller: &Identity, user_id: Uuid) -> Result<()> {
    let target = store
        .find_user(user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    if target.role == Role::Admin && target.id != caller.id {
        return Err(AppError::Forbidden("cannot modify another admin".into()));
    }
    Ok(())
}

pub async fn list_users(store: &dyn Store, caller: &Identity) -> Result<Vec<UserSummary>> {
    caller.ensure_admin()?;
    store.list_users().await
}

pub async fn set_user_disabled(
    store: &dyn Store,
    caller: &Identity,
    user_id: Uuid,
    disabled: bool,
) -> Result<()> {
    caller.ensure_admin()?;
    ensure_manageable(store, caller, user_id).await?;
    store.set_user_disabled(user_id, disabled).await?;
    tracing::info!("Admin {} set disabled={} on user {}", caller.id, disabled, user_id);
    Ok(())
}

pub async fn delete_user(store: &dyn Store, caller: &Identity, user_id: Uuid) -> Result<()> {
    caller.ensure_admin()?;
    ensure_manageable(store, caller, user_id).await?;
    store.delete_user(user_id).await?;
    tracing::info!("Admin {} deleted user {}", caller.id, user_id);
    Ok(())
}

pub async fn list_all_recipes(
    store: &dyn Store,
    caller: &Identity,
) -> Result<Vec<AdminRecipeSummary>> {
    caller.ensure_admin()?;
    store.list_all_recipes().await
}

pub async fn delete_recipe(store: &dyn Store, caller: &Identity, recipe_id: Uuid) -> Result<()> {
    caller.ensure_admin()?;
    if !store.delete_recipe(recipe_id).await? {
        return Err(AppError::NotFound("recipe"));
    }
    tracing::info!("Admin {} deleted recipe {}", caller.id, recipe_id);
    Ok(())
}

pub async fn list_recent_comments(
    store: &dyn Store,
    caller: &Identity,
) -> Result<Vec<AdminCommentView>> {
    caller.ensure_admin()?;
    store.list_recent_comments(RECENT_COMMENT_LIMIT).await
}

pub async fn delete_comment(store: &dyn Store, caller: &Identity, comment_id: Uuid) -> Result<()> {
    caller.ensure_admin()?;
    if !store.delete_comment(comment_id).await? {
        return Err(AppError::NotFound("comment"));
    }
    tracing::info!("Admin {} deleted comment {}", caller.id, comment_id);
    Ok(())
}
