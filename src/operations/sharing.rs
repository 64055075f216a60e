use chrono::Utc;
use uuid::Uuid;

use super::account::normalize_email;
use super::load_visible;
use crate::database::Store;
use crate::error::{AppError, Result};
use crate::models::{Identity, RecipeShare, ShareEntry, VisibleRecipe};

async fn load_owned(
    store: &dyn Store,
    caller: &Identity,
    recipe_id: Uuid,
) -> Result<VisibleRecipe> {
    let visible = load_visible(store, caller, recipe_id).await?;
    visible.ensure_owner(caller.id)?;
    Ok(visible)
}

/// Grants `target_email` access to the recipe. Granting again only updates
/// `can_edit`.
pub async fn grant_share(
    store: &dyn Store,
    caller: &Identity,
    recipe_id: Uuid,
    target_email: &str,
    can_edit: bool,
) -> Result<RecipeShare> {
    caller.ensure_active()?;
    load_owned(store, caller, recipe_id).await?;

    let target = store
        .find_user_by_email(&normalize_email(target_email))
        .await?
        .ok_or(AppError::NotFound("user"))?;
    if target.id == caller.id {
        return Err(AppError::InvalidArgument(
            "cannot share a recipe with yourself".into(),
        ));
    }

    let share = store
        .upsert_share(&RecipeShare {
            id: Uuid::new_v4(),
            recipe_id,
            owner_id: caller.id,
            shared_with_id: target.id,
            can_edit,
            created_at: Utc::now(),
        })
        .await?;

    tracing::info!(
        "Recipe {} shared with {} (can_edit: {})",
        recipe_id,
        target.id,
        share.can_edit
    );
    Ok(share)
}

/// Removing a grant that does not exist is a no-op.
pub async fn revoke_share(
    store: &dyn Store,
    caller: &Identity,
    recipe_id: Uuid,
    target_user_id: Uuid,
) -> Result<()> {
    caller.ensure_active()?;
    load_owned(store, caller, recipe_id).await?;

    store.delete_share(recipe_id, target_user_id).await?;
    tracing::info!("Recipe {} unshared from {}", recipe_id, target_user_id);
    Ok(())
}

pub async fn list_shares(
    store: &dyn Store,
    caller: &Identity,
    recipe_id: Uuid,
) -> Result<Vec<ShareEntry>> {
    load_owned(store, caller, recipe_id).await?;
    store.list_shares(recipe_id).await
}
