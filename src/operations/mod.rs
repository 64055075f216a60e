//! Application operations. Each takes the store and the resolved caller
//! explicitly; none of them reads request state.

pub mod account;
pub mod admin;
pub mod engagement;
pub mod friend;
pub mod notification;
pub mod recipe;
pub mod sharing;

use uuid::Uuid;

use crate::database::Store;
use crate::error::{AppError, Result};
use crate::models::{Identity, VisibleRecipe};

/// Loads a recipe through the visibility filter. Missing and private look
/// the same to the caller.
pub(crate) async fn load_visible(
    store: &dyn Store,
    caller: &Identity,
    recipe_id: Uuid,
) -> Result<VisibleRecipe> {
    store
        .find_visible_recipe(recipe_id, caller.id)
        .await?
        .ok_or(AppError::NotFound("recipe"))
}
